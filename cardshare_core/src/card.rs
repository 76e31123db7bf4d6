use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type CardId = Uuid;

// --- 核心数据结构定义 ---

/// 卡牌 (Card)
///
/// 原型卡 (prototype) 与实例卡 (instance) 结构相同，区别只在于是否有 id：
/// - 原型卡没有 id，只作为模板，保存在牌堆的定义中。
/// - 实例卡由原型卡 `instantiate` 得到，拥有全局唯一的 id。
///
/// 只有实例卡会被玩家持有或从牌堆中抽出。
#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: Option<CardId>,
    pub name: String,
    pub description: String,
}

impl Card {
    /// 定义一张原型卡
    pub fn prototype(name: impl Into<String>, description: impl Into<String>) -> Card {
        Card {
            id: None,
            name: name.into(),
            description: description.into(),
        }
    }

    /// 由当前卡牌生成一张新的实例卡，id 为随机生成的 128 位 UUID v4
    pub fn instantiate(&self) -> Card {
        Card {
            id: Some(Uuid::new_v4()),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }

    pub fn is_instance(&self) -> bool {
        self.id.is_some()
    }

    /// 判断这张卡是否是给定 id 的实例
    pub fn has_id(&self, card_id: &CardId) -> bool {
        self.id.as_ref() == Some(card_id)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} [{}]", self.name, id),
            None => write!(f, "{}", self.name),
        }
    }
}

// --- 单元测试 ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prototype_has_no_id() {
        let card = Card::prototype("Knight", "Move the robber.");
        assert!(!card.is_instance());
        assert_eq!(card.name, "Knight");
        assert_eq!(card.description, "Move the robber.");
    }

    #[test]
    fn test_instantiate_copies_name_and_description() {
        let proto = Card::prototype("Monopoly", "Announce 1 type of resource.");
        let card = proto.instantiate();
        assert!(card.is_instance());
        assert_eq!(card.name, proto.name);
        assert_eq!(card.description, proto.description);
        // 原型本身不受影响
        assert!(!proto.is_instance());
    }

    #[test]
    fn test_instances_have_unique_ids() {
        let proto = Card::prototype("Wood", "A unit of Wood resource");
        let ids: HashSet<CardId> = (0..1000).filter_map(|_| proto.instantiate().id).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_has_id() {
        let card = Card::prototype("Wheat", "").instantiate();
        let id = card.id.unwrap();
        assert!(card.has_id(&id));
        assert!(!card.has_id(&Uuid::new_v4()));
        assert!(!Card::prototype("Wheat", "").has_id(&id));
    }
}
