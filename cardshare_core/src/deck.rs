use crate::card::Card;
use crate::error::{CardShareError, Result};
use rand::prelude::SliceRandom;
use std::collections::BTreeMap;

/// 无限资源牌堆报告的大小，只是一个"足够大"的标记值
pub const UNLIMITED_DECK_SIZE: usize = 9999;

/// 有限牌堆 (FiniteDeck)
///
/// `card_types` 和 `type_counts` 描述了牌堆"应该包含哪些牌、各多少张"，
/// `pool` 则是 `build` 之后真正实例化出来的牌。
/// 不变量：`type_counts` 中的每个名字都必须在 `card_types` 中定义过。
#[derive(Debug, Clone, Default)]
pub struct FiniteDeck {
    card_types: BTreeMap<String, Card>,
    type_counts: BTreeMap<String, usize>,
    pool: Vec<Card>,
}

impl FiniteDeck {
    pub fn new() -> Self {
        Self::default()
    }

    /// 定义（或覆盖）一种卡牌的原型，不影响数量设置
    pub fn define_card_type(&mut self, name: &str, description: &str) {
        self.card_types.insert(name.to_string(), Card::prototype(name, description));
    }

    /// 设置某种卡牌的数量（覆盖而不是累加）
    ///
    /// 卡牌类型必须先用 `define_card_type` 定义，否则返回 `UnknownCardType`。
    /// 这里只修改定义，卡牌要到 `build` 时才会实例化。
    pub fn set_count(&mut self, name: &str, count: usize) -> Result<()> {
        if !self.card_types.contains_key(name) {
            return Err(CardShareError::UnknownCardType(name.to_string()));
        }
        self.type_counts.insert(name.to_string(), count);
        Ok(())
    }

    /// 丢弃当前牌池，按定义重新实例化所有卡牌（未洗牌）
    pub fn build(&mut self) {
        self.pool = Vec::with_capacity(self.total_count());
        for (name, &count) in &self.type_counts {
            // set_count 保证了 name 一定存在于 card_types 中
            if let Some(proto) = self.card_types.get(name) {
                self.pool.extend((0..count).map(|_| proto.instantiate()));
            }
        }
    }

    /// 对当前牌池做一次均匀随机排列
    pub fn shuffle(&mut self) {
        let mut rng = rand::rng();
        self.pool.shuffle(&mut rng);
    }

    /// 重新生成一副洗好的牌：build + shuffle
    pub fn reset(&mut self) {
        self.build();
        self.shuffle();
    }

    /// 从牌池顶部取出一张牌，牌池为空时返回 None
    pub fn draw(&mut self) -> Option<Card> {
        self.pool.pop()
    }

    pub fn size(&self) -> usize {
        self.pool.len()
    }

    /// 按当前定义，一副完整的牌应有的张数
    pub fn total_count(&self) -> usize {
        self.type_counts.values().sum()
    }

    pub fn card_types(&self) -> impl Iterator<Item = &Card> {
        self.card_types.values()
    }
}

/// 无限资源牌堆 (ResourceDeck)
///
/// 只有一种资源卡，不维护牌池，每次抽牌都直接生成一张新的实例卡。
#[derive(Debug, Clone)]
pub struct ResourceDeck {
    resource: Card,
}

impl ResourceDeck {
    pub fn new(resource_name: &str) -> Self {
        ResourceDeck {
            resource: Card::prototype(resource_name, format!("A unit of {} resource", resource_name)),
        }
    }

    pub fn resource_name(&self) -> &str {
        &self.resource.name
    }

    pub fn draw(&mut self) -> Option<Card> {
        Some(self.resource.instantiate())
    }
}

/// 牌堆 (Deck)
///
/// 两种牌堆共享同一组操作：build / shuffle / reset / draw / size。
/// 对于资源牌堆，build、shuffle、reset 都是空操作。
#[derive(Debug, Clone)]
pub enum Deck {
    Finite(FiniteDeck),
    Resource(ResourceDeck),
}

impl Deck {
    pub fn build(&mut self) {
        if let Deck::Finite(deck) = self {
            deck.build();
        }
    }

    pub fn shuffle(&mut self) {
        if let Deck::Finite(deck) = self {
            deck.shuffle();
        }
    }

    pub fn reset(&mut self) {
        if let Deck::Finite(deck) = self {
            deck.reset();
        }
    }

    pub fn draw(&mut self) -> Option<Card> {
        match self {
            Deck::Finite(deck) => deck.draw(),
            Deck::Resource(deck) => deck.draw(),
        }
    }

    /// 剩余张数。资源牌堆返回 `UNLIMITED_DECK_SIZE`，并不是精确值
    pub fn size(&self) -> usize {
        match self {
            Deck::Finite(deck) => deck.size(),
            Deck::Resource(_) => UNLIMITED_DECK_SIZE,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Deck::Resource(_))
    }
}

impl From<FiniteDeck> for Deck {
    fn from(deck: FiniteDeck) -> Self {
        Deck::Finite(deck)
    }
}

impl From<ResourceDeck> for Deck {
    fn from(deck: ResourceDeck) -> Self {
        Deck::Resource(deck)
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardId;
    use std::collections::{HashMap, HashSet};

    // 辅助函数：A x3, B x2, C x1
    fn setup_small_deck() -> FiniteDeck {
        let mut deck = FiniteDeck::new();
        deck.define_card_type("A", "card a");
        deck.define_card_type("B", "card b");
        deck.define_card_type("C", "card c");
        deck.set_count("A", 3).unwrap();
        deck.set_count("B", 2).unwrap();
        deck.set_count("C", 1).unwrap();
        deck
    }

    #[test]
    fn test_set_count_unknown_type_fails() {
        let mut deck = FiniteDeck::new();
        assert_eq!(
            deck.set_count("Ghost", 3),
            Err(CardShareError::UnknownCardType("Ghost".to_string()))
        );
    }

    #[test]
    fn test_set_count_overwrites() {
        let mut deck = setup_small_deck();
        deck.set_count("A", 10).unwrap();
        deck.build();
        assert_eq!(deck.size(), 10 + 2 + 1);
    }

    #[test]
    fn test_redefine_card_type_keeps_count() {
        let mut deck = setup_small_deck();
        deck.define_card_type("A", "new description");
        deck.build();
        assert_eq!(deck.size(), 6);
        let a_cards: Vec<_> = deck.pool.iter().filter(|c| c.name == "A").collect();
        assert_eq!(a_cards.len(), 3);
        assert!(a_cards.iter().all(|c| c.description == "new description"));
    }

    #[test]
    fn test_build_and_draw_out() {
        let mut deck = setup_small_deck();
        deck.build();
        assert_eq!(deck.size(), 6);
        assert!(deck.pool.iter().all(Card::is_instance));

        let mut drawn = Vec::new();
        while let Some(card) = deck.draw() {
            drawn.push(card);
        }
        assert_eq!(drawn.len(), 6);
        assert_eq!(deck.size(), 0);
        assert!(deck.draw().is_none());

        let ids: HashSet<CardId> = drawn.iter().filter_map(|c| c.id).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_build_discards_previous_pool() {
        let mut deck = setup_small_deck();
        deck.build();
        deck.draw();
        deck.draw();
        let old_ids: HashSet<CardId> = deck.pool.iter().filter_map(|c| c.id).collect();
        deck.build();
        assert_eq!(deck.size(), 6);
        assert!(deck.pool.iter().all(|c| !old_ids.contains(&c.id.unwrap())));
    }

    #[test]
    fn test_reset_keeps_composition() {
        let mut deck = setup_small_deck();
        for _ in 0..5 {
            deck.reset();
            assert_eq!(deck.size(), deck.total_count());
            let mut counts: HashMap<String, usize> = HashMap::new();
            for card in &deck.pool {
                *counts.entry(card.name.clone()).or_insert(0) += 1;
            }
            assert_eq!(counts["A"], 3);
            assert_eq!(counts["B"], 2);
            assert_eq!(counts["C"], 1);
        }
    }

    #[test]
    fn test_reset_order_is_random() {
        // 统计第一张抽到的牌是 C 的频率：期望为 1/6
        let mut deck = setup_small_deck();
        let rounds = 6000;
        let mut c_first = 0;
        for _ in 0..rounds {
            deck.reset();
            if deck.draw().map_or(false, |c| c.name == "C") {
                c_first += 1;
            }
        }
        // 期望 1000，给出宽松的范围
        assert!(c_first > 700 && c_first < 1300, "c_first = {}", c_first);
    }

    #[test]
    fn test_resource_deck_is_unlimited() {
        let mut deck = Deck::from(ResourceDeck::new("Wood"));
        let mut ids = HashSet::new();
        for _ in 0..10_000 {
            let card = deck.draw().expect("资源牌堆永远不会抽空");
            assert_eq!(card.name, "Wood");
            assert_eq!(card.description, "A unit of Wood resource");
            ids.insert(card.id.unwrap());
        }
        assert_eq!(ids.len(), 10_000);
        assert_eq!(deck.size(), UNLIMITED_DECK_SIZE);
        deck.reset();
        assert_eq!(deck.size(), UNLIMITED_DECK_SIZE);
        assert!(deck.is_unlimited());
    }

    #[test]
    fn test_deck_enum_dispatch() {
        let mut deck = Deck::from(setup_small_deck());
        assert_eq!(deck.size(), 0);
        deck.reset();
        assert_eq!(deck.size(), 6);
        assert!(deck.draw().is_some());
        assert_eq!(deck.size(), 5);
        assert!(!deck.is_unlimited());
    }
}
