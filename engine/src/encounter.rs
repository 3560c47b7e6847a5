//! Encounter definitions and meta-progression scaling.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScalingConfig;
use crate::{Actor, Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterTier {
    #[default]
    Normal,
    Boss,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardItem {
    pub id: String,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reward {
    #[serde(default)]
    pub shards: u32,
    #[serde(default)]
    pub items: Vec<RewardItem>,
}

/// A boss gains `element` as a weakness once the story flag `flag` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagWeakness {
    pub flag: String,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encounter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tier: EncounterTier,
    pub enemies: Vec<Actor>,
    #[serde(default)]
    pub reward: Option<Reward>,
    #[serde(default)]
    pub flag_weaknesses: Vec<FlagWeakness>,
}

/// Handed back to the caller once a session ends, for permanent progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterResolution {
    pub encounter_id: String,
    pub victory: bool,
    pub messages: Vec<String>,
    /// Empty on defeat.
    pub rewards: Reward,
}

/// Scale with the default growth curve.
pub fn scale_encounter(encounter: &Encounter, shards: u32, flags: &BTreeSet<String>) -> Encounter {
    scale_encounter_with(encounter, shards, flags, &ScalingConfig::default())
}

/// Returns a deep copy of `encounter` tuned to the player's progress; the template is untouched.
///
/// Max HP, strength and magic grow by `1 + shards * growth_per_shard` (each floored at 1).
/// Boss encounters also lose one resistance per `boss_shard_step` shards and pick up any
/// flag-keyed weakness whose story flag is set.
pub fn scale_encounter_with(
    encounter: &Encounter,
    shards: u32,
    flags: &BTreeSet<String>,
    cfg: &ScalingConfig,
) -> Encounter {
    let mut scaled = encounter.clone();
    let mult = 1.0 + f64::from(shards) * cfg.growth_per_shard;
    let grow = |v: i32| ((f64::from(v) * mult).round() as i32).max(1);

    let is_boss = encounter.tier == EncounterTier::Boss;
    let strip = if is_boss && cfg.boss_shard_step > 0 {
        (shards / cfg.boss_shard_step) as usize
    } else {
        0
    };
    let gained: Vec<Element> = if is_boss {
        encounter
            .flag_weaknesses
            .iter()
            .filter(|fw| flags.contains(&fw.flag))
            .map(|fw| fw.element)
            .collect()
    } else {
        Vec::new()
    };

    for enemy in &mut scaled.enemies {
        enemy.stats.max_hp = grow(enemy.stats.max_hp);
        enemy.stats.strength = grow(enemy.stats.strength);
        enemy.stats.magic = grow(enemy.stats.magic);

        let n = strip.min(enemy.resistances.len());
        enemy.resistances.drain(..n);

        for element in &gained {
            if !enemy.weaknesses.contains(element) {
                enemy.weaknesses.push(*element);
            }
            enemy.resistances.retain(|r| r != element);
        }
    }

    debug!(
        encounter = %encounter.id,
        shards,
        mult,
        stripped = strip,
        gained = ?gained,
        "encounter scaled"
    );
    scaled
}
