//! The action resolver: one state + one action in, next state + events out.
//!
//! `resolve` is pure with respect to its arguments. It clones what it needs and
//! never panics for any `CombatAction` value; refusals come back as events with
//! the state, HP/SP and inventory untouched and the turn not consumed.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::combat::turns::{advance_turn, check_outcome, forget_defeated, Exchange};
use crate::combat::{ActionKind, CombatAction, CombatEvent, CombatState, Combatant, InvalidReason};
use crate::life::{apply_damage, heal_hp, restore_sp, spend_sp};
use crate::status::{add_status, apply_incoming, apply_outgoing, has_status, is_alive, StatusTag};
use crate::{CombatantId, Element, Inventory, ItemCatalog, Skill, SkillCatalog, TargetMode};

pub const OFFENSE_SCALE: f64 = 1.4;
pub const DEFENSE_SCALE: f64 = 0.8;
pub const BASE_DAMAGE_FLOOR: f64 = 4.0;
pub const WEAKNESS_MULTIPLIER: f64 = 1.4;
pub const RESISTANCE_MULTIPLIER: f64 = 0.7;

/// Read-only lookups plus the caller's current inventory.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub skills: &'a SkillCatalog,
    pub items: &'a ItemCatalog,
    pub inventory: &'a Inventory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub state: CombatState,
    pub events: Vec<CombatEvent>,
    pub inventory: Inventory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    pub amount: i32,
    pub weakness: bool,
    pub resisted: bool,
}

/// Damage for one hit, before it is applied.
///
/// `base = max(4, round(off * 1.4 - def * 0.8))`, scaled by the skill's power, then
/// weakened → vulnerable → guarded → weakness → resistance, floored at 1.
pub fn compute_damage(
    attacker: &Combatant,
    target: &Combatant,
    element: Element,
    power: Option<f64>,
) -> DamageRoll {
    let off = f64::from(attacker.actor.offense_for(element));
    let def = f64::from(target.actor.defense_for(element));
    let mut base = (off * OFFENSE_SCALE - def * DEFENSE_SCALE)
        .round()
        .max(BASE_DAMAGE_FLOOR);
    if let Some(power) = power {
        base = (base * power).round();
    }

    let weakness = target.actor.is_weak_to(element);
    let resisted = target.actor.resists(element);

    let mut x = apply_outgoing(attacker, base);
    x = apply_incoming(target, x);
    if weakness {
        x *= WEAKNESS_MULTIPLIER;
    }
    if resisted {
        x *= RESISTANCE_MULTIPLIER;
    }
    let amount = (x.round() as i32).max(1);
    trace!(off, def, base, amount, weakness, resisted, "damage computed");
    DamageRoll {
        amount,
        weakness,
        resisted,
    }
}

pub fn resolve(state: &CombatState, action: &CombatAction, ctx: &ResolveContext<'_>) -> Resolution {
    let unchanged = || Resolution {
        state: state.clone(),
        events: Vec::new(),
        inventory: ctx.inventory.clone(),
    };

    if state.ended {
        debug!(source = %action.source, "action after combat ended ignored");
        return unchanged();
    }
    let Some(source) = state.get(&action.source) else {
        debug!(source = %action.source, "unknown source ignored");
        return unchanged();
    };
    if !source.alive || !is_alive(source) {
        debug!(source = %action.source, "defeated source ignored");
        return unchanged();
    }
    if state.active.as_deref() != Some(action.source.as_str()) {
        return refuse(
            state,
            ctx,
            CombatEvent::Invalid {
                source: action.source.clone(),
                reason: InvalidReason::NotActive,
            },
        );
    }

    let mut next = state.clone();
    let mut inventory = ctx.inventory.clone();
    let mut ex = Exchange::default();
    let source_id = action.source.as_str();

    debug!(source = source_id, action = ?action.kind, round = state.round, "resolving action");
    let outcome = match &action.kind {
        ActionKind::Attack { target } => attack(&mut next, source_id, target, &mut ex),
        ActionKind::Skill { skill_id, targets } => {
            cast(&mut next, source_id, skill_id, targets, ctx.skills, &mut ex)
        }
        ActionKind::Guard => {
            guard(&mut next, source_id, &mut ex);
            Ok(())
        }
        ActionKind::Item { item_id, target } => use_item(
            &mut next,
            &mut inventory,
            source_id,
            item_id,
            target,
            ctx.items,
            &mut ex,
        ),
        ActionKind::End => {
            ex.log(format!("[TURN][{}] ends turn", source.actor.name));
            Ok(())
        }
    };

    if let Err(event) = outcome {
        return refuse(state, ctx, event);
    }

    next.telemetry.turns_taken += 1;
    if !check_outcome(&mut next, &mut ex) {
        advance_turn(&mut next, source_id, &mut ex);
    }

    for line in ex.lines {
        next.push_log(line);
    }
    Resolution {
        state: next,
        events: ex.events,
        inventory,
    }
}

fn refuse(state: &CombatState, ctx: &ResolveContext<'_>, event: CombatEvent) -> Resolution {
    debug!(?event, "action refused");
    let mut next = state.clone();
    next.push_log(describe_refusal(state, &event));
    Resolution {
        state: next,
        events: vec![event],
        inventory: ctx.inventory.clone(),
    }
}

fn describe_refusal(state: &CombatState, event: &CombatEvent) -> String {
    let name = |id: &str| {
        state
            .get(id)
            .map(|c| c.actor.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    match event {
        CombatEvent::NoSp {
            source,
            skill,
            cost,
            available,
        } => format!(
            "[FAIL][{}] not enough SP for {} ({} < {})",
            name(source),
            skill,
            available,
            cost
        ),
        CombatEvent::OutOfStock { source, item } => {
            format!("[FAIL][{}] no {} left", name(source), item)
        }
        CombatEvent::Invalid { source, reason } => {
            format!("[FAIL][{}] {:?}", name(source), reason)
        }
        other => format!("[FAIL] {:?}", other),
    }
}

/// The target must exist, be alive, and stand on the other side.
fn opponent_target(
    state: &CombatState,
    source_id: &str,
    target_id: &str,
) -> Result<CombatantId, CombatEvent> {
    let invalid = |reason| CombatEvent::Invalid {
        source: source_id.to_string(),
        reason,
    };
    let Some(source) = state.get(source_id) else {
        return Err(invalid(InvalidReason::NoTargets));
    };
    let Some(target) = state.get(target_id) else {
        return Err(invalid(InvalidReason::UnknownTarget {
            target: Some(target_id.to_string()),
        }));
    };
    if target.side == source.side {
        return Err(invalid(InvalidReason::TargetNotOpponent {
            target: target_id.to_string(),
        }));
    }
    if !target.alive || !is_alive(target) {
        return Err(invalid(InvalidReason::TargetDefeated {
            target: target_id.to_string(),
        }));
    }
    Ok(target.id.clone())
}

fn attack(
    state: &mut CombatState,
    source_id: &str,
    target_id: &str,
    ex: &mut Exchange,
) -> Result<(), CombatEvent> {
    let target = opponent_target(state, source_id, target_id)?;
    let weakness = strike(state, source_id, &target, Element::Physical, None, ex);
    if weakness {
        grant_extra_turn(state, source_id, ex);
    }
    Ok(())
}

fn cast(
    state: &mut CombatState,
    source_id: &str,
    skill_id: &str,
    targets: &[CombatantId],
    skills: &SkillCatalog,
    ex: &mut Exchange,
) -> Result<(), CombatEvent> {
    let invalid = |reason| CombatEvent::Invalid {
        source: source_id.to_string(),
        reason,
    };
    let Some(skill) = skills.get(skill_id) else {
        return Err(invalid(InvalidReason::UnknownSkill {
            skill: skill_id.to_string(),
        }));
    };
    let Some(source) = state.get(source_id) else {
        return Err(invalid(InvalidReason::NoTargets));
    };
    if !source.actor.knows_skill(skill_id) {
        return Err(invalid(InvalidReason::SkillNotKnown {
            skill: skill_id.to_string(),
        }));
    }
    if source.sp < skill.cost_sp {
        return Err(CombatEvent::NoSp {
            source: source_id.to_string(),
            skill: skill_id.to_string(),
            cost: skill.cost_sp,
            available: source.sp,
        });
    }

    let hit_list: Vec<CombatantId> = match skill.target {
        TargetMode::One => {
            let Some(first) = targets.first() else {
                return Err(invalid(InvalidReason::UnknownTarget { target: None }));
            };
            vec![opponent_target(state, source_id, first)?]
        }
        TargetMode::All => {
            let opponents: Vec<CombatantId> = state
                .living(source.side.opponent())
                .map(|c| c.id.clone())
                .collect();
            if opponents.is_empty() {
                return Err(invalid(InvalidReason::NoTargets));
            }
            opponents
        }
    };

    pay_for_skill(state, source_id, skill, ex);

    let mut weakness = false;
    for target in &hit_list {
        weakness |= strike(state, source_id, target, skill.element, Some(skill), ex);
    }
    if weakness {
        grant_extra_turn(state, source_id, ex);
    }
    Ok(())
}

/// SP is deducted once per cast, however many targets it hits.
fn pay_for_skill(state: &mut CombatState, source_id: &str, skill: &Skill, ex: &mut Exchange) {
    let Some(source) = state.combatants.get_mut(source_id) else {
        return;
    };
    if spend_sp(source, skill.cost_sp) {
        ex.log(format!(
            "[SKILL][{}] {} (−{} SP, {} left)",
            source.actor.name, skill.name, skill.cost_sp, source.sp
        ));
        ex.emit(CombatEvent::SkillUsed {
            source: source_id.to_string(),
            skill: skill.id.clone(),
            sp_cost: skill.cost_sp,
            sp_left: source.sp,
        });
    }
}

/// Land one hit. Returns true if it struck an elemental weakness.
fn strike(
    state: &mut CombatState,
    source_id: &str,
    target_id: &str,
    element: Element,
    skill: Option<&Skill>,
    ex: &mut Exchange,
) -> bool {
    let roll = match (state.get(source_id), state.get(target_id)) {
        (Some(a), Some(t)) if t.alive && is_alive(t) => {
            compute_damage(a, t, element, skill.map(|s| s.power))
        }
        _ => return false,
    };

    let Some(target) = state.combatants.get_mut(target_id) else {
        return false;
    };
    let was_guarded = has_status(target, StatusTag::Guarded);
    let dropped = apply_damage(target, roll.amount, |line| ex.log(line));
    let hp_left = target.hp;

    ex.emit(CombatEvent::Damaged {
        source: source_id.to_string(),
        target: target_id.to_string(),
        element,
        amount: roll.amount,
        hp_left,
        weakness: roll.weakness,
        resisted: roll.resisted,
    });
    if was_guarded {
        ex.emit(CombatEvent::StatusCleared {
            target: target_id.to_string(),
            status: StatusTag::Guarded,
        });
    }

    if dropped {
        ex.emit(CombatEvent::Defeated {
            target: target_id.to_string(),
        });
    } else if let Some(skill) = skill {
        for tag in &skill.applies {
            if add_status(target, *tag) {
                ex.log(format!("[COND][{}] gains {}", target.actor.name, tag.as_str()));
                ex.emit(CombatEvent::StatusApplied {
                    target: target_id.to_string(),
                    status: *tag,
                });
            }
        }
    }

    if dropped {
        forget_defeated(state, target_id);
    }
    if roll.weakness {
        state.telemetry.weakness_hits += 1;
    }
    roll.weakness
}

/// Grant at most one extra action per combatant per round.
fn grant_extra_turn(state: &mut CombatState, source_id: &str, ex: &mut Exchange) {
    let ready = state
        .extra_turn_ready
        .get(source_id)
        .copied()
        .unwrap_or(false);
    if !ready {
        trace!(source = source_id, "extra turn already used this round");
        return;
    }
    state
        .extra_turn_ready
        .insert(source_id.to_string(), false);
    state.pending_extra_turn = Some(source_id.to_string());
    state.telemetry.extra_turns += 1;

    let name = state
        .get(source_id)
        .map(|c| c.actor.name.clone())
        .unwrap_or_default();
    ex.log(format!("[TURN][{}] weakness struck → extra turn", name));
    ex.emit(CombatEvent::ExtraTurn {
        combatant: source_id.to_string(),
    });
}

fn guard(state: &mut CombatState, source_id: &str, ex: &mut Exchange) {
    let Some(source) = state.combatants.get_mut(source_id) else {
        return;
    };
    ex.log(format!("[GUARD][{}] braces for the next hit", source.actor.name));
    ex.emit(CombatEvent::Guarding {
        combatant: source_id.to_string(),
    });
    if add_status(source, StatusTag::Guarded) {
        ex.emit(CombatEvent::StatusApplied {
            target: source_id.to_string(),
            status: StatusTag::Guarded,
        });
    }
    state.telemetry.guards_used += 1;
}

fn use_item(
    state: &mut CombatState,
    inventory: &mut Inventory,
    source_id: &str,
    item_id: &str,
    target_id: &str,
    items: &ItemCatalog,
    ex: &mut Exchange,
) -> Result<(), CombatEvent> {
    let invalid = |reason| CombatEvent::Invalid {
        source: source_id.to_string(),
        reason,
    };
    let Some(item) = items.get(item_id) else {
        return Err(invalid(InvalidReason::UnknownItem {
            item: item_id.to_string(),
        }));
    };
    let (Some(source), Some(target)) = (state.get(source_id), state.get(target_id)) else {
        return Err(invalid(InvalidReason::UnknownTarget {
            target: Some(target_id.to_string()),
        }));
    };
    if target.side != source.side {
        return Err(invalid(InvalidReason::TargetNotAlly {
            target: target_id.to_string(),
        }));
    }
    if !target.alive || !is_alive(target) {
        return Err(invalid(InvalidReason::TargetDefeated {
            target: target_id.to_string(),
        }));
    }
    let source_name = source.actor.name.clone();
    let target_name = target.actor.name.clone();

    let remaining = match inventory.get_mut(item_id) {
        Some(qty) if *qty > 0 => {
            *qty -= 1;
            *qty
        }
        _ => {
            return Err(CombatEvent::OutOfStock {
                source: source_id.to_string(),
                item: item_id.to_string(),
            });
        }
    };

    ex.log(format!(
        "[ITEM][{}] uses {} on {} ({} left)",
        source_name, item.name, target_name, remaining
    ));
    ex.emit(CombatEvent::ItemUsed {
        source: source_id.to_string(),
        item: item_id.to_string(),
        target: target_id.to_string(),
        remaining,
    });

    let Some(target) = state.combatants.get_mut(target_id) else {
        return Ok(());
    };
    let hp = heal_hp(target, item.heal_hp, |line| ex.log(line));
    let sp = restore_sp(target, item.heal_sp, |line| ex.log(line));
    ex.emit(CombatEvent::Healed {
        target: target_id.to_string(),
        hp,
        sp,
    });
    Ok(())
}
