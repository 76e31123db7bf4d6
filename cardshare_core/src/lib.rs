//! # 共享卡牌核心逻辑库
//!
//! 这个 `core` crate 包含了卡牌定义、牌堆（构建、洗牌、抽牌）、
//! 玩家手牌、卡牌动作（弃牌、交易）、游戏类型注册表，
//! 以及客户端-服务器通信消息的定义。
//! 它与具体实现（如网络服务器、客户端UI）解耦，可以被任何上层应用复用。

mod card;
pub mod catan;
mod deck;
mod error;
mod game;
mod lobby;
mod message;
mod player;
mod registry;
mod store;

pub use card::*;

pub use deck::*;

pub use error::*;

pub use game::*;

pub use lobby::*;

pub use message::*;

pub use player::*;

pub use registry::*;

pub use store::*;
