//! 卡坦岛 (Settlers of Catan)
//!
//! 一个发展卡牌堆（玩家私有的手牌）加上五个资源牌堆。
//! 卡牌描述来自 Mayfair Games 出版的实体卡牌。

use crate::deck::{FiniteDeck, ResourceDeck};
use crate::game::Game;
use crate::registry::GameSettings;

pub const GAME_TYPE_CATAN: &str = "Catan";

pub const DECK_DEVELOPMENT: &str = "Development";
pub const DECK_CLAY: &str = "Clay";
pub const DECK_ROCK: &str = "Rock";
pub const DECK_WHEAT: &str = "Wheat";
pub const DECK_WOOD: &str = "Wood";
pub const DECK_WOOL: &str = "Wool";

pub const RESOURCE_DECKS: [&str; 5] = [DECK_CLAY, DECK_ROCK, DECK_WHEAT, DECK_WOOD, DECK_WOOL];

pub const KNIGHT: &str = "Knight";
pub const YEAR_OF_PLENTY: &str = "Year Of Plenty";
pub const ROAD_BUILDING: &str = "Road Building";
pub const MONOPOLY: &str = "Monopoly";
pub const VICTORY_POINT: &str = "Victory Point";

// 发展卡数量表：(卡名, 2-4 人, 5-6 人)
const DEVELOPMENT_COUNTS: [(&str, usize, usize); 5] = [
    (KNIGHT, 14, 20),
    (YEAR_OF_PLENTY, 2, 3),
    (ROAD_BUILDING, 2, 3),
    (MONOPOLY, 2, 3),
    (VICTORY_POINT, 5, 5),
];

/// 创建发展卡牌堆，人数超过 4 人时使用 5-6 人的数量表。返回的牌堆已洗好
pub fn development_deck(max_players: usize) -> FiniteDeck {
    let mut deck = FiniteDeck::new();
    deck.define_card_type(
        KNIGHT,
        "Move the robber. Steal 1 resource card from the owner of an adjacent settlement or city.",
    );
    deck.define_card_type(
        YEAR_OF_PLENTY,
        "Take any 2 resources from the bank. Add them to your hand. They can be 2 of the same resource \
         or two different resources.",
    );
    deck.define_card_type(ROAD_BUILDING, "Place 2 new roads as if you had just built them.");
    deck.define_card_type(
        MONOPOLY,
        "When you play this card, announce 1 type of resource. All other players must give you all \
         their resources of that type.",
    );
    deck.define_card_type(VICTORY_POINT, "Play to increase your victory point score by 1.");

    let large = max_players > 4;
    for (name, small_count, large_count) in DEVELOPMENT_COUNTS {
        let count = if large { large_count } else { small_count };
        deck.set_count(name, count).expect("发展卡类型已在上面定义");
    }

    deck.reset();
    deck
}

/// 卡坦岛的游戏构造函数
pub fn new_game(settings: &GameSettings) -> Game {
    let mut game = Game::new(settings.max_players);
    game.add_deck(DECK_DEVELOPMENT, development_deck(settings.max_players));
    for resource in RESOURCE_DECKS {
        game.add_deck(resource, ResourceDeck::new(resource));
    }
    game
}
