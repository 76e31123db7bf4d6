use thiserror::Error;

/// 核心库的错误类型
///
/// 牌局中的查找失败（牌堆不存在、卡牌不存在等）通常以 `None` 或空操作的方式处理，
/// 只有配置错误和大厅层面的校验失败才会返回这里的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardShareError {
    #[error("未定义的卡牌类型: {0}")]
    UnknownCardType(String),

    #[error("无法识别的游戏类型: {0}")]
    UnknownGameType(String),

    #[error("牌堆不存在: {0}")]
    UnknownDeck(String),

    #[error("牌堆已空")]
    EmptyDeck,

    #[error("玩家不存在: {0}")]
    UnknownPlayer(String),

    #[error("最大玩家人数无效，至少需要 2 人")]
    InvalidMaxPlayers,

    #[error("请输入玩家名称")]
    MissingPlayerName,

    #[error("无效的游戏ID: {0}")]
    InvalidKey(String),

    #[error("玩家 {player_name} 已存在于游戏 {game_key} 中")]
    DuplicatePlayerName { game_key: String, player_name: String },
}

pub type Result<T> = std::result::Result<T, CardShareError>;
