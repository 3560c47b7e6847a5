use serde::{Deserialize, Serialize};

use crate::combat::Combatant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTag {
    /// Incoming damage ×1.3.
    Vulnerable,
    /// Outgoing damage ×0.8.
    Weakened,
    /// Incoming damage ×0.5 for exactly one hit; also lapses when the owner's next turn starts.
    Guarded,
}

impl StatusTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTag::Vulnerable => "vulnerable",
            StatusTag::Weakened => "weakened",
            StatusTag::Guarded => "guarded",
        }
    }
}

pub const WEAKENED_OUTGOING: f64 = 0.8;
pub const VULNERABLE_INCOMING: f64 = 1.3;
pub const GUARDED_INCOMING: f64 = 0.5;

pub fn has_status(combatant: &Combatant, tag: StatusTag) -> bool {
    combatant.statuses.contains(&tag)
}

/// Returns true if the tag was newly added. Adding an existing tag is a no-op.
pub fn add_status(combatant: &mut Combatant, tag: StatusTag) -> bool {
    combatant.statuses.insert(tag)
}

/// Returns true if the tag was present. Removing an absent tag is a no-op.
pub fn remove_status(combatant: &mut Combatant, tag: StatusTag) -> bool {
    combatant.statuses.remove(&tag)
}

pub fn is_alive(combatant: &Combatant) -> bool {
    combatant.hp > 0
}

/// Scales outgoing damage by the attacker's own statuses.
pub fn apply_outgoing(attacker: &Combatant, amount: f64) -> f64 {
    if has_status(attacker, StatusTag::Weakened) {
        amount * WEAKENED_OUTGOING
    } else {
        amount
    }
}

/// Scales incoming damage by the target's statuses, vulnerable first, then guarded.
pub fn apply_incoming(target: &Combatant, amount: f64) -> f64 {
    let mut x = amount;
    if has_status(target, StatusTag::Vulnerable) {
        x *= VULNERABLE_INCOMING;
    }
    if has_status(target, StatusTag::Guarded) {
        x *= GUARDED_INCOMING;
    }
    x
}
