//! Enemy turn heuristic.
//!
//! No look-ahead and no memory; the same state always yields the same action.

use tracing::debug;

use crate::combat::{CombatAction, CombatState, Combatant};
use crate::status::is_alive;
use crate::{Side, Skill, SkillCatalog, TargetMode};

/// Action for the active combatant if it is a living enemy, else `None`.
pub fn choose_action(state: &CombatState, skills: &SkillCatalog) -> Option<CombatAction> {
    let actor = state.active_combatant()?;
    if state.ended || actor.side != Side::Enemy || !is_alive(actor) {
        return None;
    }
    Some(plan_turn(state, actor, skills))
}

/// Same heuristic for whichever side is active. Drives allies in unattended simulations.
pub fn autopilot_action(state: &CombatState, skills: &SkillCatalog) -> Option<CombatAction> {
    let actor = state.active_combatant()?;
    if state.ended || !is_alive(actor) {
        return None;
    }
    Some(plan_turn(state, actor, skills))
}

/// Single-target skill on the weakest opponent, else an all-target skill,
/// else a plain attack, else `end` when nobody is left to hit.
fn plan_turn(state: &CombatState, actor: &Combatant, skills: &SkillCatalog) -> CombatAction {
    let opponents: Vec<&Combatant> = state.living(actor.side.opponent()).collect();
    let Some(weakest) = weakest(&opponents) else {
        return CombatAction::end(actor.id.clone());
    };

    let affordable: Vec<&Skill> = actor
        .actor
        .skills
        .iter()
        .filter_map(|id| skills.get(id))
        .filter(|s| s.cost_sp <= actor.sp)
        .collect();

    let action = if let Some(s) = affordable.iter().find(|s| s.target == TargetMode::One) {
        CombatAction::skill(actor.id.clone(), s.id.clone(), vec![weakest.id.clone()])
    } else if let Some(s) = affordable.iter().find(|s| s.target == TargetMode::All) {
        let targets = opponents.iter().map(|c| c.id.clone()).collect();
        CombatAction::skill(actor.id.clone(), s.id.clone(), targets)
    } else {
        CombatAction::attack(actor.id.clone(), weakest.id.clone())
    };
    debug!(actor = %actor.id, ?action, "ai planned");
    action
}

/// Lowest HP percentage; ties keep roster order.
fn weakest<'a>(candidates: &[&'a Combatant]) -> Option<&'a Combatant> {
    let mut best: Option<&'a Combatant> = None;
    for c in candidates {
        best = match best {
            // a.hp / a.max < b.hp / b.max, cross-multiplied to stay in integers
            Some(b)
                if i64::from(c.hp) * i64::from(b.actor.stats.max_hp)
                    >= i64::from(b.hp) * i64::from(c.actor.stats.max_hp) =>
            {
                Some(b)
            }
            _ => Some(*c),
        };
    }
    best
}
