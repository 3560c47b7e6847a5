use serde::{Deserialize, Serialize};

use crate::{CombatantId, Element, Side, StatusTag};

/// Everything the resolver did (or refused to do) in one call, in order.
/// Failures are events too; the resolver never returns an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
        order: Vec<CombatantId>,
    },
    TurnStarted {
        combatant: CombatantId,
        round: u32,
    },
    SkillUsed {
        source: CombatantId,
        skill: String,
        sp_cost: i32,
        sp_left: i32,
    },
    Damaged {
        source: CombatantId,
        target: CombatantId,
        element: Element,
        amount: i32,
        hp_left: i32,
        weakness: bool,
        resisted: bool,
    },
    Defeated {
        target: CombatantId,
    },
    StatusApplied {
        target: CombatantId,
        status: StatusTag,
    },
    StatusCleared {
        target: CombatantId,
        status: StatusTag,
    },
    Guarding {
        combatant: CombatantId,
    },
    ItemUsed {
        source: CombatantId,
        item: String,
        target: CombatantId,
        remaining: u32,
    },
    Healed {
        target: CombatantId,
        hp: i32,
        sp: i32,
    },
    ExtraTurn {
        combatant: CombatantId,
    },
    TurnEnded {
        combatant: CombatantId,
    },
    NoSp {
        source: CombatantId,
        skill: String,
        cost: i32,
        available: i32,
    },
    OutOfStock {
        source: CombatantId,
        item: String,
    },
    Invalid {
        source: CombatantId,
        reason: InvalidReason,
    },
    CombatEnded {
        winner: Side,
    },
}

impl CombatEvent {
    /// True for the events that report a refused action.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CombatEvent::NoSp { .. } | CombatEvent::OutOfStock { .. } | CombatEvent::Invalid { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum InvalidReason {
    NotActive,
    UnknownTarget { target: Option<CombatantId> },
    TargetDefeated { target: CombatantId },
    TargetNotOpponent { target: CombatantId },
    TargetNotAlly { target: CombatantId },
    UnknownSkill { skill: String },
    SkillNotKnown { skill: String },
    NoTargets,
    UnknownItem { item: String },
}
