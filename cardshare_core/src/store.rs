use crate::game::{Game, GameKey};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::sync::Arc;

/// 共享的游戏实例。每局游戏一把锁，所有读-改-写操作都在锁内完成
pub type SharedGame = Arc<Mutex<Game>>;

/// 存活游戏的存储接口
///
/// 默认实现只保存在进程内存中，可以替换为其他存储。
pub trait GameStore: Send + Sync {
    fn get(&self, key: &str) -> Option<SharedGame>;

    /// 以游戏自身的ID存入。ID已被占用时不覆盖，并把游戏原样返回
    fn insert_new(&self, game: Game) -> Result<SharedGame, Game>;

    fn delete(&self, key: &str) -> Option<SharedGame>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn keys(&self) -> Vec<GameKey>;
}

#[derive(Debug, Default)]
pub struct MemoryGameStore {
    games: DashMap<GameKey, SharedGame>,
}

impl MemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl GameStore for MemoryGameStore {
    fn get(&self, key: &str) -> Option<SharedGame> {
        self.games.get(key).map(|g| g.value().clone())
    }

    fn insert_new(&self, game: Game) -> Result<SharedGame, Game> {
        match self.games.entry(game.key().to_string()) {
            Entry::Occupied(_) => Err(game),
            Entry::Vacant(entry) => {
                let shared = Arc::new(Mutex::new(game));
                entry.insert(shared.clone());
                Ok(shared)
            }
        }
    }

    fn delete(&self, key: &str) -> Option<SharedGame> {
        self.games.remove(key).map(|(_, g)| g)
    }

    fn contains(&self, key: &str) -> bool {
        self.games.contains_key(key)
    }

    fn keys(&self) -> Vec<GameKey> {
        self.games.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_delete() {
        let store = MemoryGameStore::new();
        let shared = store.insert_new(Game::with_key("ABCDE".to_string(), 4)).unwrap();
        assert!(store.contains("ABCDE"));
        assert!(Arc::ptr_eq(&shared, &store.get("ABCDE").unwrap()));
        assert_eq!(store.keys(), vec!["ABCDE".to_string()]);

        assert!(store.delete("ABCDE").is_some());
        assert!(!store.contains("ABCDE"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_occupied_key_is_rejected() {
        let store = MemoryGameStore::new();
        store.insert_new(Game::with_key("ABCDE".to_string(), 4)).unwrap();
        let rejected = store.insert_new(Game::with_key("ABCDE".to_string(), 6)).unwrap_err();
        assert_eq!(rejected.max_players, 6);
        assert_eq!(store.get("ABCDE").unwrap().lock().max_players, 4);
        assert_eq!(store.len(), 1);
    }
}
