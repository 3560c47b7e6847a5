//! Runtime combat: the state snapshot, the action/event vocabulary, and the
//! queue → resolver → session pipeline built on top of them.

use std::collections::{BTreeSet, VecDeque};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::CombatConfig;
use crate::{Actor, CombatantId, Side};

pub mod actions;
pub mod ai;
pub mod events;
pub mod queue;
pub mod resolver;
pub mod session;
pub mod turns;

pub use actions::{ActionKind, CombatAction};
pub use events::{CombatEvent, InvalidReason};

/// One runtime participant. Wraps a cloned `Actor` with mutable HP/SP/status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub side: Side,
    pub actor: Actor,
    pub hp: i32,
    pub sp: i32,
    #[serde(default)]
    pub statuses: BTreeSet<crate::StatusTag>,
    pub alive: bool,
}

impl Combatant {
    /// Fresh combatant at full HP/SP.
    pub fn new(id: impl Into<CombatantId>, side: Side, actor: Actor) -> Self {
        let hp = actor.stats.max_hp.max(0);
        let sp = actor.stats.max_sp.max(0);
        Self {
            id: id.into(),
            side,
            actor,
            hp,
            sp,
            statuses: BTreeSet::new(),
            alive: hp > 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.actor.name
    }

    /// HP as a fraction of max, used for "weakest target" comparisons.
    pub fn hp_ratio(&self) -> f64 {
        if self.actor.stats.max_hp <= 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.actor.stats.max_hp)
        }
    }
}

/// Post-match diagnostics. Monotone counters with no effect on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub turns_taken: u32,
    pub weakness_hits: u32,
    pub guards_used: u32,
    pub extra_turns: u32,
    pub target_cancels: u32,
}

/// Complete, serializable snapshot of one encounter attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Arena keyed by combatant id; insertion order is roster order (allies first).
    pub combatants: IndexMap<CombatantId, Combatant>,
    /// Upcoming turns this round. `queue[0]` is the active combatant.
    pub queue: Vec<CombatantId>,
    pub active: Option<CombatantId>,
    pub round: u32,
    /// Fixed at session creation; feeds the initiative tie-break.
    pub seed: u64,
    pub ended: bool,
    pub winner: Option<Side>,
    /// Whether each combatant may still earn a weakness extra turn this round.
    pub extra_turn_ready: IndexMap<CombatantId, bool>,
    pub pending_extra_turn: Option<CombatantId>,
    pub telemetry: Telemetry,
    pub log: VecDeque<String>,
    #[serde(default)]
    pub config: CombatConfig,
}

impl CombatState {
    pub fn get(&self, id: &str) -> Option<&Combatant> {
        self.combatants.get(id)
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.active.as_deref().and_then(|id| self.combatants.get(id))
    }

    pub fn living(&self, side: Side) -> impl Iterator<Item = &Combatant> + '_ {
        self.combatants
            .values()
            .filter(move |c| c.side == side && c.alive && c.hp > 0)
    }

    pub fn is_wiped(&self, side: Side) -> bool {
        self.living(side).next().is_none()
    }

    /// Append to the message log, dropping the oldest lines past `config.log_limit`.
    pub fn push_log(&mut self, line: String) {
        self.log.push_back(line);
        while self.log.len() > self.config.log_limit {
            self.log.pop_front();
        }
    }
}
