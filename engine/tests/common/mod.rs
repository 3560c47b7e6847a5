#![allow(dead_code)]

use engine::content::ContentCatalog;
use engine::encounter::{Encounter, EncounterTier, Reward};
use engine::{
    index_by_id, Actor, CombatConfig, CombatSession, Element, Inventory, Item, Skill, Stats,
    StatusTag, TargetMode,
};

pub const SEED: u64 = 42;

#[allow(clippy::too_many_arguments)]
pub fn stats(
    max_hp: i32,
    max_sp: i32,
    strength: i32,
    magic: i32,
    defense: i32,
    resistance: i32,
    agility: i32,
    luck: i32,
) -> Stats {
    Stats {
        max_hp,
        max_sp,
        strength,
        magic,
        defense,
        resistance,
        agility,
        luck,
    }
}

pub fn actor(id: &str, name: &str, stats: Stats) -> Actor {
    Actor {
        id: id.into(),
        name: name.into(),
        stats,
        skills: vec![],
        weaknesses: vec![],
        resistances: vec![],
    }
}

pub fn skill(
    id: &str,
    cost_sp: i32,
    element: Element,
    power: f64,
    target: TargetMode,
    applies: Vec<StatusTag>,
) -> Skill {
    Skill {
        id: id.into(),
        name: id.into(),
        cost_sp,
        element,
        power,
        target,
        applies,
    }
}

pub fn item(id: &str, heal_hp: i32, heal_sp: i32) -> Item {
    Item {
        id: id.into(),
        name: id.into(),
        heal_hp,
        heal_sp,
    }
}

pub fn encounter(enemies: Vec<Actor>) -> Encounter {
    Encounter {
        id: "test_grounds".into(),
        name: "Test Grounds".into(),
        tier: EncounterTier::Normal,
        enemies,
        reward: Some(Reward {
            shards: 1,
            items: vec![],
        }),
        flag_weaknesses: vec![],
    }
}

pub fn content(skills: Vec<Skill>, items: Vec<Item>) -> ContentCatalog {
    ContentCatalog {
        skills: index_by_id(skills, |s| s.id.as_str()),
        items: index_by_id(items, |i| i.id.as_str()),
        ..ContentCatalog::default()
    }
}

pub fn session(
    party: Vec<Actor>,
    enemies: Vec<Actor>,
    content: &ContentCatalog,
    inventory: Inventory,
) -> CombatSession {
    CombatSession::new(
        &party,
        &encounter(enemies),
        content,
        inventory,
        SEED,
        CombatConfig::default(),
    )
    .expect("session builds")
}

/// Ally "Dreamer": str 20, def 5, max HP 50, agility 10 so it always opens.
pub fn dreamer() -> Actor {
    actor("dreamer", "Dreamer", stats(50, 20, 20, 10, 5, 5, 10, 5))
}

/// Enemy "Nightmare": def 8, max HP 40, weak to physical, agility 1.
pub fn nightmare() -> Actor {
    let mut a = actor("nightmare", "Nightmare", stats(40, 0, 10, 5, 8, 5, 1, 1));
    a.weaknesses = vec![Element::Physical];
    a
}
