use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod api;
pub mod combat;
pub mod config;
pub mod content;
pub mod encounter;
pub mod error;
pub mod life;
pub mod status;

pub use combat::ai::{autopilot_action, choose_action};
pub use combat::queue::{build_turn_order, initiative_hash, preview};
pub use combat::resolver::{resolve, Resolution, ResolveContext};
pub use combat::session::{CombatSession, Phase};
pub use combat::{ActionKind, CombatAction, CombatEvent, CombatState, Combatant, Telemetry};
pub use config::{CombatConfig, ScalingConfig};
pub use encounter::{scale_encounter, Encounter, EncounterResolution, EncounterTier, Reward};
pub use error::ContentError;
pub use status::{add_status, has_status, is_alive, remove_status, StatusTag};

pub type CombatantId = String;

/// Item id → quantity. Slots are kept at zero rather than removed once emptied.
pub type Inventory = IndexMap<String, u32>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Ally => Side::Enemy,
            Side::Enemy => Side::Ally,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Physical,
    Fire,
    Ice,
    Thunder,
    Wind,
    Psy,
    Light,
    Dark,
}

impl Element {
    /// Physical hits scale off strength vs defense, everything else off magic vs resistance.
    pub fn is_physical(self) -> bool {
        matches!(self, Element::Physical)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: i32,
    pub max_sp: i32,
    pub strength: i32,
    pub magic: i32,
    pub defense: i32,
    pub resistance: i32,
    pub agility: i32,
    pub luck: i32,
}

/// Immutable stat/skill template. Combat clones it into each combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub stats: Stats,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<Element>,
    #[serde(default)]
    pub resistances: Vec<Element>,
}

impl Actor {
    pub fn is_weak_to(&self, element: Element) -> bool {
        self.weaknesses.contains(&element)
    }

    pub fn resists(&self, element: Element) -> bool {
        self.resistances.contains(&element)
    }

    pub fn knows_skill(&self, skill_id: &str) -> bool {
        self.skills.iter().any(|s| s == skill_id)
    }

    /// Offense/defense pair used by the damage formula for this element.
    pub fn offense_for(&self, element: Element) -> i32 {
        if element.is_physical() {
            self.stats.strength
        } else {
            self.stats.magic
        }
    }

    pub fn defense_for(&self, element: Element) -> i32 {
        if element.is_physical() {
            self.stats.defense
        } else {
            self.stats.resistance
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    One,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub cost_sp: i32,
    pub element: Element,
    pub power: f64,
    pub target: TargetMode,
    #[serde(default)]
    pub applies: Vec<StatusTag>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub heal_hp: i32,
    #[serde(default)]
    pub heal_sp: i32,
}

pub type SkillCatalog = IndexMap<String, Skill>;
pub type ItemCatalog = IndexMap<String, Item>;

/// Keys a list of catalog entries by id; later duplicates win.
pub fn index_by_id<T>(entries: Vec<T>, id: impl Fn(&T) -> &str) -> IndexMap<String, T> {
    entries
        .into_iter()
        .map(|e| (id(&e).to_string(), e))
        .collect()
}
