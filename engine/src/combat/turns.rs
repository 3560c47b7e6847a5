use tracing::debug;

use crate::combat::queue::build_turn_order;
use crate::combat::{CombatEvent, CombatState};
use crate::status::{is_alive, remove_status, StatusTag};
use crate::{CombatantId, Side};

/// Events and log lines accumulated while resolving one action.
#[derive(Debug, Default)]
pub(crate) struct Exchange {
    pub events: Vec<CombatEvent>,
    pub lines: Vec<String>,
}

impl Exchange {
    pub fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn log(&mut self, line: String) {
        self.lines.push(line);
    }
}

fn name_of(state: &CombatState, id: &str) -> String {
    state
        .get(id)
        .map(|c| c.actor.name.clone())
        .unwrap_or_else(|| id.to_string())
}

fn is_ready(state: &CombatState, id: &str) -> bool {
    state.get(id).is_some_and(|c| c.alive && is_alive(c))
}

/// Set up round 1 and activate its first combatant.
pub(crate) fn begin(state: &mut CombatState, ex: &mut Exchange) {
    state.round = 1;
    start_round(state, ex);
    match state.queue.first().cloned() {
        Some(first) => start_turn(state, first, ex),
        None => state.active = None,
    }
}

/// Restore every living combatant's extra-turn eligibility and rebuild the queue.
fn start_round(state: &mut CombatState, ex: &mut Exchange) {
    let flags: Vec<(CombatantId, bool)> = state
        .combatants
        .values()
        .map(|c| (c.id.clone(), c.alive && is_alive(c)))
        .collect();
    state.extra_turn_ready = flags.into_iter().collect();
    state.pending_extra_turn = None;

    state.queue = build_turn_order(state.combatants.values(), state.round, state.seed);
    let names: Vec<String> = state.queue.iter().map(|id| name_of(state, id)).collect();
    debug!(round = state.round, order = ?state.queue, "round started");
    ex.log(format!("[ROUND] {} → {}", state.round, names.join(", ")));
    ex.emit(CombatEvent::RoundStarted {
        round: state.round,
        order: state.queue.clone(),
    });
}

/// Make `id` active. A guard lapses when its owner's turn begins.
fn start_turn(state: &mut CombatState, id: CombatantId, ex: &mut Exchange) {
    if let Some(c) = state.combatants.get_mut(&id) {
        if remove_status(c, StatusTag::Guarded) {
            ex.log(format!("[COND][{}] guard lapses", c.actor.name));
            ex.emit(CombatEvent::StatusCleared {
                target: id.clone(),
                status: StatusTag::Guarded,
            });
        }
    }
    ex.log(format!("[TURN][{}] round {}", name_of(state, &id), state.round));
    ex.emit(CombatEvent::TurnStarted {
        combatant: id.clone(),
        round: state.round,
    });
    state.active = Some(id);
}

/// Consume `acting`'s turn and activate whoever goes next.
///
/// A pending extra turn for a living combatant takes priority; otherwise the next
/// living id is popped off the queue, and an empty queue starts a new round.
pub(crate) fn advance_turn(state: &mut CombatState, acting: &str, ex: &mut Exchange) {
    state.queue.retain(|id| id != acting);
    ex.emit(CombatEvent::TurnEnded {
        combatant: acting.to_string(),
    });

    if let Some(id) = state.pending_extra_turn.take() {
        if is_ready(state, &id) {
            state.queue.insert(0, id.clone());
            start_turn(state, id, ex);
            return;
        }
    }

    let alive: Vec<CombatantId> = state
        .queue
        .iter()
        .filter(|id| is_ready(state, id))
        .cloned()
        .collect();
    state.queue = alive;

    if state.queue.is_empty() {
        state.round += 1;
        start_round(state, ex);
    }

    match state.queue.first().cloned() {
        Some(next) => start_turn(state, next, ex),
        None => {
            debug!(round = state.round, "no combatant left to activate");
            state.active = None;
        }
    }
}

/// Drop a defeated combatant from every turn-related slot.
pub(crate) fn forget_defeated(state: &mut CombatState, id: &str) {
    state.queue.retain(|q| q != id);
    if let Some(flag) = state.extra_turn_ready.get_mut(id) {
        *flag = false;
    }
    if state.pending_extra_turn.as_deref() == Some(id) {
        state.pending_extra_turn = None;
    }
}

/// Enemy wipe is checked before ally wipe. Returns true once the session has ended.
pub(crate) fn check_outcome(state: &mut CombatState, ex: &mut Exchange) -> bool {
    if state.ended {
        return true;
    }
    let winner = if state.is_wiped(Side::Enemy) {
        Side::Ally
    } else if state.is_wiped(Side::Ally) {
        Side::Enemy
    } else {
        return false;
    };

    state.ended = true;
    state.winner = Some(winner);
    state.pending_extra_turn = None;
    ex.log(format!(
        "[END] winner={} round={}",
        match winner {
            Side::Ally => "ally",
            Side::Enemy => "enemy",
        },
        state.round
    ));
    ex.emit(CombatEvent::CombatEnded { winner });
    true
}
