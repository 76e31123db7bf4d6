use crate::card::{Card, CardId};
use crate::game::GameKey;
use crate::registry::GameSettings;
use serde::{Deserialize, Serialize};

// --- 客户端 -> 服务器 的消息 ---
// 这些是客户端可以发送给服务器的指令或动作。

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ClientMessage {
    // --- 大厅消息 ---
    /// 查询可创建的游戏类型
    ListGameTypes,
    /// 创建一局新游戏，创建者成为第一个玩家和房主
    CreateGame { game_type: String, player_name: String, settings: GameSettings },
    /// 通过游戏ID加入一局已存在的游戏
    JoinGame { game_key: GameKey, player_name: String },
    /// 断线后以原来的名字回到游戏，取回自己的手牌
    Rejoin { game_key: GameKey, player_name: String },

    // --- 游戏内消息 ---
    /// 从牌堆抽一张牌，`hand_name` 为空时放入与牌堆同名的手牌组
    DrawCard { deck_name: String, hand_name: Option<String> },
    /// 对自己手中的一张牌执行动作 ("discard" / "trade")
    CardAction { card_id: CardId, action: String, target_player: Option<String> },
    /// 查询本局的玩家列表
    QueryPlayers { exclude_player: Option<String> },
    /// 按过滤条件从自己手中随机选一张牌
    RandomCard { filter: String },
    /// 获取自己的手牌视图
    GetHand,
}

// --- 服务器 -> 客户端 的消息 ---

#[derive(Serialize, Deserialize, Debug, Clone)]
pub enum ServerMessage {
    GameTypes { game_types: Vec<String> },

    /// 成功加入或创建游戏后，私密地发给该玩家
    GameJoined {
        game_key: GameKey,
        player_name: String,
        view: PlayerView,
    },

    /// 刚抽到的牌
    CardDrawn { card: Card },

    Players { players: Vec<String> },

    /// 玩家自己的手牌视图
    HandView(PlayerView),

    RandomCard { card: Option<Card> },

    Info { message: String },
    Error { message: String },
}

/// 发给单个玩家的游戏视图，不包含其他玩家的手牌
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub game_key: GameKey,
    pub player_name: String,
    pub is_owner: bool,
    pub max_players: usize,
    pub players: Vec<String>,
    pub decks: Vec<DeckSummary>,
    pub hands: Vec<HandView>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DeckSummary {
    pub name: String,
    pub size: usize,
    pub unlimited: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HandView {
    pub name: String,
    pub cards: Vec<Card>,
}
