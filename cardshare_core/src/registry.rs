use crate::catan;
use crate::error::{CardShareError, Result};
use crate::game::Game;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// 创建游戏时的设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    pub max_players: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings { max_players: 4 }
    }
}

/// 游戏构造函数：根据设置创建一局已定义好牌堆的游戏
pub type GameConstructor = fn(&GameSettings) -> Game;

/// 游戏类型注册表 (GameRegistry)
///
/// 把游戏类型名映射到构造函数，新的游戏类型只需在启动时注册即可。
#[derive(Debug, Clone, Default)]
pub struct GameRegistry {
    game_types: HashMap<String, GameConstructor>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册所有内置的游戏类型
    pub fn with_builtin_games() -> Self {
        let mut registry = Self::new();
        registry.register(catan::GAME_TYPE_CATAN, catan::new_game);
        registry
    }

    /// 注册一个游戏类型，同名注册以最后一次为准
    pub fn register(&mut self, game_type: &str, constructor: GameConstructor) {
        debug!("注册游戏类型 {}", game_type);
        self.game_types.insert(game_type.to_string(), constructor);
    }

    pub fn create(&self, game_type: &str, settings: &GameSettings) -> Result<Game> {
        let constructor = self
            .game_types
            .get(game_type)
            .ok_or_else(|| CardShareError::UnknownGameType(game_type.to_string()))?;
        Ok(constructor(settings))
    }

    pub fn contains(&self, game_type: &str) -> bool {
        self.game_types.contains_key(game_type)
    }

    /// 已注册的游戏类型（按名字排序）
    pub fn game_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.game_types.keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::ResourceDeck;

    fn tiny_game(settings: &GameSettings) -> Game {
        let mut game = Game::new(settings.max_players);
        game.add_deck("Wood", ResourceDeck::new("Wood"));
        game
    }

    fn other_tiny_game(settings: &GameSettings) -> Game {
        let mut game = Game::new(settings.max_players);
        game.add_deck("Gold", ResourceDeck::new("Gold"));
        game
    }

    #[test]
    fn test_create_unknown_type() {
        let registry = GameRegistry::new();
        let err = registry.create("Chess", &GameSettings::default()).unwrap_err();
        assert_eq!(err, CardShareError::UnknownGameType("Chess".to_string()));
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = GameRegistry::new();
        registry.register("Tiny", tiny_game);
        let game = registry.create("Tiny", &GameSettings { max_players: 3 }).unwrap();
        assert_eq!(game.max_players, 3);
        assert!(game.deck("Wood").is_some());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = GameRegistry::new();
        registry.register("Tiny", tiny_game);
        registry.register("Tiny", other_tiny_game);
        let game = registry.create("Tiny", &GameSettings::default()).unwrap();
        assert!(game.deck("Wood").is_none());
        assert!(game.deck("Gold").is_some());
        assert_eq!(registry.game_types(), vec!["Tiny".to_string()]);
    }

    #[test]
    fn test_builtin_games() {
        let registry = GameRegistry::with_builtin_games();
        assert!(registry.contains(catan::GAME_TYPE_CATAN));
        assert_eq!(registry.game_types(), vec!["Catan".to_string()]);
    }
}
