use crate::card::{Card, CardId};
use crate::error::{CardShareError, Result};
use crate::game::{GameKey, generate_key, GAME_KEY_LENGTH};
use crate::message::PlayerView;
use crate::registry::{GameRegistry, GameSettings};
use crate::store::{GameStore, MemoryGameStore, SharedGame};
use tracing::info;

/// 大厅 (Lobby)
///
/// 请求处理层调用核心库的入口。负责请求参数的校验（玩家名、游戏ID、重名等），
/// 然后在对应游戏的锁内完成一次完整的操作。
pub struct Lobby<S: GameStore = MemoryGameStore> {
    registry: GameRegistry,
    store: S,
}

impl Lobby<MemoryGameStore> {
    /// 使用内置游戏类型和内存存储
    pub fn new() -> Self {
        Self::with_store(GameRegistry::with_builtin_games(), MemoryGameStore::new())
    }
}

impl Default for Lobby<MemoryGameStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GameStore> Lobby<S> {
    pub fn with_store(registry: GameRegistry, store: S) -> Self {
        Lobby { registry, store }
    }

    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn game_types(&self) -> Vec<String> {
        self.registry.game_types()
    }

    /// 创建一局游戏，并让创建者作为第一个玩家加入、成为房主
    pub fn create_game(&self, game_type: &str, owner_name: &str, settings: &GameSettings) -> Result<GameKey> {
        if settings.max_players < 2 {
            return Err(CardShareError::InvalidMaxPlayers);
        }
        if owner_name.is_empty() {
            return Err(CardShareError::MissingPlayerName);
        }

        let mut game = self.registry.create(game_type, settings)?;
        game.add_player(owner_name);
        game.set_owner(owner_name);

        // 生成的ID可能与现存的游戏冲突，冲突时重新生成
        let shared = loop {
            match self.store.insert_new(game) {
                Ok(shared) => break shared,
                Err(rejected) => game = rejected.rekeyed(generate_key(GAME_KEY_LENGTH)),
            }
        };

        let key = shared.lock().key().to_string();
        info!("玩家 {} 创建了 {} 游戏 {}", owner_name, game_type, key);
        Ok(key)
    }

    /// 加入一局已存在的游戏。游戏ID不区分大小写
    pub fn join_game(&self, game_key: &str, player_name: &str) -> Result<()> {
        if game_key.is_empty() {
            return Err(CardShareError::InvalidKey(game_key.to_string()));
        }
        if player_name.is_empty() {
            return Err(CardShareError::MissingPlayerName);
        }
        let shared = self.game(game_key)?;
        let mut game = shared.lock();
        if game.has_player(player_name) {
            return Err(CardShareError::DuplicatePlayerName {
                game_key: game.key().to_string(),
                player_name: player_name.to_string(),
            });
        }
        game.add_player(player_name);
        info!("玩家 {} 加入了游戏 {}", player_name, game.key());
        Ok(())
    }

    /// 以已存在的玩家身份重新进入游戏，返回该玩家当前的视图（手牌保持不变）。
    /// 同一名字是否已有在线连接由请求处理层判断
    pub fn rejoin_game(&self, game_key: &str, player_name: &str) -> Result<PlayerView> {
        if game_key.is_empty() {
            return Err(CardShareError::InvalidKey(game_key.to_string()));
        }
        if player_name.is_empty() {
            return Err(CardShareError::MissingPlayerName);
        }
        let view = self.player_view(game_key, player_name)?;
        info!("玩家 {} 重新进入了游戏 {}", player_name, view.game_key);
        Ok(view)
    }

    /// 执行卡牌动作。只有游戏ID会被校验，其余的失败都是空操作
    pub fn perform_card_action(
        &self,
        game_key: &str,
        player_name: &str,
        target_player: &str,
        card_id: &CardId,
        action: &str,
    ) -> Result<()> {
        self.game(game_key)?.lock().card_action(player_name, target_player, card_id, action);
        Ok(())
    }

    /// 查询玩家列表（按加入顺序），可以排除一个玩家
    pub fn query_players(&self, game_key: &str, exclude_player: Option<&str>) -> Result<Vec<String>> {
        let shared = self.game(game_key)?;
        let game = shared.lock();
        Ok(game
            .player_names()
            .filter(|name| Some(*name) != exclude_player)
            .map(str::to_string)
            .collect())
    }

    /// 为玩家抽牌，`hand_name` 为空时放入与牌堆同名的手牌组。
    /// 牌堆不存在时返回 `UnknownDeck`，牌堆抽空时返回 `EmptyDeck`
    pub fn draw_for_player(
        &self,
        game_key: &str,
        player_name: &str,
        deck_name: &str,
        hand_name: Option<&str>,
    ) -> Result<Card> {
        let shared = self.game(game_key)?;
        let mut game = shared.lock();
        if game.deck(deck_name).is_none() {
            return Err(CardShareError::UnknownDeck(deck_name.to_string()));
        }
        game.player_draw_card(player_name, deck_name, hand_name)
            .ok_or(CardShareError::EmptyDeck)
    }

    pub fn random_card(&self, game_key: &str, player_name: &str, filter: &str) -> Result<Option<Card>> {
        Ok(self.game(game_key)?.lock().random_card(player_name, filter))
    }

    pub fn player_view(&self, game_key: &str, player_name: &str) -> Result<PlayerView> {
        self.game(game_key)?
            .lock()
            .player_view(player_name)
            .ok_or_else(|| CardShareError::UnknownPlayer(player_name.to_string()))
    }

    /// 移除一局游戏
    pub fn close_game(&self, game_key: &str) -> bool {
        let removed = self.store.delete(&normalize_key(game_key)).is_some();
        if removed {
            info!("游戏 {} 已被移除", game_key);
        }
        removed
    }

    fn game(&self, game_key: &str) -> Result<SharedGame> {
        self.store
            .get(&normalize_key(game_key))
            .ok_or_else(|| CardShareError::InvalidKey(game_key.to_string()))
    }
}

fn normalize_key(game_key: &str) -> GameKey {
    game_key.trim().to_ascii_uppercase()
}
