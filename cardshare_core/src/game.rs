use crate::card::{Card, CardId};
use crate::deck::Deck;
use crate::message::{DeckSummary, HandView, PlayerView};
use crate::player::PlayerData;
use rand::Rng;
use rand::prelude::IndexedRandom;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub type GameKey = String;

/// 游戏ID的长度
pub const GAME_KEY_LENGTH: usize = 5;

/// 卡牌动作 (CardAction)
///
/// 基础版本只提供弃牌和交易两种动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    Discard,
    Trade,
}

impl FromStr for CardAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discard" => Ok(CardAction::Discard),
            "trade" => Ok(CardAction::Trade),
            _ => Err(()),
        }
    }
}

impl fmt::Display for CardAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            CardAction::Discard => "discard",
            CardAction::Trade => "trade",
        })
    }
}

/// 游戏 (Game)
///
/// 一局游戏持有若干命名牌堆和若干玩家，是所有卡牌操作的入口。
/// 具体的游戏类型（例如 Catan）只负责在创建时定义牌堆。
///
/// 牌局中的查找失败（牌堆不存在、玩家不存在、卡牌不存在）都不会报错，
/// 而是返回 `None` 或什么都不做，避免客户端状态过期时打断游戏。
#[derive(Debug, Clone)]
pub struct Game {
    key: GameKey,
    pub owner: Option<String>,
    pub max_players: usize,
    decks: HashMap<String, Deck>,
    // 牌堆的添加顺序，玩家加入时按这个顺序创建手牌组
    deck_order: Vec<String>,
    players: HashMap<String, PlayerData>,
    // 玩家的加入顺序
    player_order: Vec<String>,
}

impl Game {
    pub fn new(max_players: usize) -> Self {
        Self::with_key(generate_key(GAME_KEY_LENGTH), max_players)
    }

    pub fn with_key(key: GameKey, max_players: usize) -> Self {
        Game {
            key,
            owner: None,
            max_players,
            decks: HashMap::new(),
            deck_order: Vec::new(),
            players: HashMap::new(),
            player_order: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// 换一个游戏ID，只在游戏存入存储之前使用
    pub(crate) fn rekeyed(mut self, key: GameKey) -> Self {
        self.key = key;
        self
    }

    /// 添加一个牌堆。应在玩家加入之前调用，玩家加入时只会为已有的牌堆创建手牌组
    pub fn add_deck(&mut self, name: &str, deck: impl Into<Deck>) {
        if self.decks.insert(name.to_string(), deck.into()).is_none() {
            self.deck_order.push(name.to_string());
        }
    }

    /// 添加一个玩家，并为当前每个牌堆创建同名的空手牌组
    ///
    /// 这里不检查重名，重名检查由调用方（大厅）负责。
    pub fn add_player(&mut self, player_name: &str) {
        let mut player = PlayerData::new(player_name);
        for deck_name in &self.deck_order {
            player.add_hand(deck_name);
        }
        if self.players.insert(player_name.to_string(), player).is_none() {
            self.player_order.push(player_name.to_string());
        }
    }

    /// 设置房主，不检查该玩家是否存在
    pub fn set_owner(&mut self, player_name: &str) {
        self.owner = Some(player_name.to_string());
    }

    pub fn is_owner(&self, player_name: &str) -> bool {
        self.owner.as_deref() == Some(player_name)
    }

    /// 直接从牌堆抽一张牌，不归属于任何玩家
    pub fn draw_card(&mut self, deck_name: &str) -> Option<Card> {
        self.decks.get_mut(deck_name)?.draw()
    }

    /// 为玩家抽一张牌并放入其手牌组
    ///
    /// `dest_hand` 为 None 时使用牌堆名作为手牌组名。
    /// 牌堆为空时返回 None，玩家手牌不变。
    pub fn player_draw_card(&mut self, player_name: &str, source_deck: &str, dest_hand: Option<&str>) -> Option<Card> {
        if !self.players.contains_key(player_name) {
            return None;
        }
        let card = self.draw_card(source_deck)?;
        let dest_hand = dest_hand.unwrap_or(source_deck);
        if let Some(player) = self.players.get_mut(player_name) {
            player.add_card_to_hand(dest_hand, card.clone());
        }
        debug!("游戏 {}: 玩家 {} 从 {} 抽到 {}", self.key, player_name, source_deck, card);
        Some(card)
    }

    /// 按动作字符串执行卡牌动作，无法识别的动作直接忽略
    pub fn card_action(&mut self, player_name: &str, target_player: &str, card_id: &CardId, action: &str) {
        if let Ok(action) = action.parse::<CardAction>() {
            self.perform_card_action(player_name, target_player, card_id, action);
        }
    }

    /// 执行卡牌动作
    ///
    /// - `Discard`: 从执行者的手牌中移除该卡。
    /// - `Trade`: 把该卡从执行者转移到目标玩家的同名手牌组。
    ///
    /// 执行者不存在、卡牌不存在或目标玩家不存在时，什么都不做。
    /// 把卡牌交易给自己也是空操作，卡牌留在原来的手牌组里。
    pub fn perform_card_action(&mut self, player_name: &str, target_player: &str, card_id: &CardId, action: CardAction) {
        if !self.players.contains_key(player_name) {
            return;
        }

        match action {
            CardAction::Discard => {
                if let Some(player) = self.players.get_mut(player_name) {
                    player.remove_card_by_id(card_id);
                }
                debug!("游戏 {}: 玩家 {} 弃掉了 {}", self.key, player_name, card_id);
            }
            CardAction::Trade => {
                if player_name == target_player || !self.players.contains_key(target_player) {
                    return;
                }
                let Some((hand, card)) = self.players
                    .get(player_name)
                    .and_then(|p| p.find_card(card_id))
                    .map(|(h, c)| (h.to_string(), c.clone()))
                else {
                    return;
                };
                if let Some(target) = self.players.get_mut(target_player) {
                    target.add_card_to_hand(&hand, card);
                }
                if let Some(player) = self.players.get_mut(player_name) {
                    player.remove_card_by_id(card_id);
                }
                debug!("游戏 {}: 玩家 {} 把 {} 交给了 {}", self.key, player_name, card_id, target_player);
            }
        }
    }

    /// 在玩家的手牌中按过滤条件随机选一张牌
    ///
    /// 过滤条件以 `;` 分隔，格式见 `PlayerData::get_cards`。
    pub fn random_card(&self, player_name: &str, filter: &str) -> Option<Card> {
        let player = self.players.get(player_name)?;
        let filters: Vec<&str> = filter.split(';').collect();
        let cards = player.get_cards(&filters);
        let mut rng = rand::rng();
        cards.choose(&mut rng).cloned()
    }

    pub fn player(&self, player_name: &str) -> Option<&PlayerData> {
        self.players.get(player_name)
    }

    pub fn player_mut(&mut self, player_name: &str) -> Option<&mut PlayerData> {
        self.players.get_mut(player_name)
    }

    pub fn has_player(&self, player_name: &str) -> bool {
        self.players.contains_key(player_name)
    }

    /// 按加入顺序返回玩家名
    pub fn player_names(&self) -> impl Iterator<Item = &str> {
        self.player_order.iter().map(String::as_str)
    }

    pub fn player_count(&self) -> usize {
        self.player_order.len()
    }

    pub fn deck(&self, deck_name: &str) -> Option<&Deck> {
        self.decks.get(deck_name)
    }

    pub fn deck_mut(&mut self, deck_name: &str) -> Option<&mut Deck> {
        self.decks.get_mut(deck_name)
    }

    /// 按添加顺序返回牌堆名
    pub fn deck_names(&self) -> impl Iterator<Item = &str> {
        self.deck_order.iter().map(String::as_str)
    }

    /// 生成发给某个玩家的视图：只包含该玩家自己的手牌
    pub fn player_view(&self, player_name: &str) -> Option<PlayerView> {
        let player = self.players.get(player_name)?;
        Some(PlayerView {
            game_key: self.key.clone(),
            player_name: player.name.clone(),
            is_owner: self.is_owner(player_name),
            max_players: self.max_players,
            players: self.player_order.clone(),
            decks: self.deck_order
                .iter()
                .filter_map(|name| self.decks.get(name).map(|deck| DeckSummary {
                    name: name.clone(),
                    size: deck.size(),
                    unlimited: deck.is_unlimited(),
                }))
                .collect(),
            hands: player
                .hands()
                .map(|(name, cards)| HandView { name: name.to_string(), cards: cards.to_vec() })
                .collect(),
        })
    }
}

/// 随机生成一个由大写字母组成的游戏ID，方便玩家之间分享
pub fn generate_key(length: usize) -> GameKey {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(rng.random_range(b'A'..=b'Z')))
        .collect()
}

// --- 单元测试 ---
