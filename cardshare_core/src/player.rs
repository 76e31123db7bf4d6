use crate::card::{Card, CardId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 玩家数据 (PlayerData)
///
/// 保存一个玩家持有的所有卡牌，按"手牌组"(hand) 分类，例如 `Wood`、`Development`。
/// - `hand_names` 记录所有手牌组的名字，只追加不重复，同时决定了遍历顺序。
/// - `hand_cards` 中每个名字都有对应的（可能为空的）卡牌列表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerData {
    pub name: String,
    hand_names: Vec<String>,
    hand_cards: HashMap<String, Vec<Card>>,
}

impl PlayerData {
    pub fn new(name: &str) -> Self {
        PlayerData {
            name: name.to_string(),
            hand_names: Vec::new(),
            hand_cards: HashMap::new(),
        }
    }

    /// 注册一个手牌组
    ///
    /// 注意：如果该手牌组已经存在，它的卡牌会被清空。
    pub fn add_hand(&mut self, hand_name: &str) {
        if !self.hand_names.iter().any(|h| h == hand_name) {
            self.hand_names.push(hand_name.to_string());
        }
        self.hand_cards.insert(hand_name.to_string(), Vec::new());
    }

    /// 向手牌组中加入一张牌，手牌组不存在时自动创建
    pub fn add_card_to_hand(&mut self, hand_name: &str, card: Card) {
        if !self.hand_cards.contains_key(hand_name) {
            self.add_hand(hand_name);
        }
        if let Some(cards) = self.hand_cards.get_mut(hand_name) {
            cards.push(card);
        }
    }

    /// 按 id 查找卡牌，返回 (手牌组名, 卡牌)
    pub fn find_card(&self, card_id: &CardId) -> Option<(&str, &Card)> {
        self.hands().find_map(|(hand_name, cards)| {
            cards.iter().find(|c| c.has_id(card_id)).map(|c| (hand_name, c))
        })
    }

    /// 按过滤条件获取卡牌
    ///
    /// 过滤条件的格式为 `key=value`，目前只支持 `hand`：
    /// `hand=-Wood` 表示排除 `Wood` 手牌组。无法识别的条件会被忽略。
    pub fn get_cards<S: AsRef<str>>(&self, filters: &[S]) -> Vec<Card> {
        let mut excluded: Vec<&str> = Vec::new();
        for filter in filters {
            if let Some(("hand", value)) = filter.as_ref().split_once('=') {
                if let Some(hand_name) = value.strip_prefix('-') {
                    excluded.push(hand_name);
                }
            }
        }

        self.hands()
            .filter(|(hand_name, _)| !excluded.contains(hand_name))
            .flat_map(|(_, cards)| cards.iter().cloned())
            .collect()
    }

    /// 从所有手牌组中移除该 id 的所有卡牌（即使 id 意外重复也会全部移除）
    pub fn remove_card_by_id(&mut self, card_id: &CardId) {
        for cards in self.hand_cards.values_mut() {
            cards.retain(|c| !c.has_id(card_id));
        }
    }

    /// 清空所有手牌，保留手牌组的名字
    pub fn reset(&mut self) {
        for cards in self.hand_cards.values_mut() {
            cards.clear();
        }
    }

    pub fn hand_names(&self) -> &[String] {
        &self.hand_names
    }

    pub fn hand(&self, hand_name: &str) -> Option<&[Card]> {
        self.hand_cards.get(hand_name).map(Vec::as_slice)
    }

    /// 按 `hand_names` 的顺序遍历所有手牌组
    pub fn hands(&self) -> impl Iterator<Item = (&str, &[Card])> {
        self.hand_names.iter().map(|name| {
            let cards = self.hand_cards.get(name).map_or(&[][..], Vec::as_slice);
            (name.as_str(), cards)
        })
    }

    pub fn card_count(&self) -> usize {
        self.hand_cards.values().map(Vec::len).sum()
    }
}

// --- 单元测试 ---
