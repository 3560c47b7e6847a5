use crate::combat::Combatant;
use crate::status::{remove_status, StatusTag};

/// Apply damage and handle the drop-to-0 transition. Returns true if the combatant dropped to 0 this call.
///
/// A hit always spends the target's guard, whether or not the guard reduced this particular hit.
pub fn apply_damage(combatant: &mut Combatant, dmg: i32, mut log: impl FnMut(String)) -> bool {
    if !combatant.alive {
        return false;
    }

    let before = combatant.hp;
    combatant.hp = (combatant.hp - dmg.max(0)).max(0);
    log(format!(
        "[DMG][{}] {} → {} (−{})",
        combatant.actor.name, before, combatant.hp, dmg
    ));

    if remove_status(combatant, StatusTag::Guarded) {
        log(format!("[COND][{}] guard is spent", combatant.actor.name));
    }

    if before > 0 && combatant.hp == 0 {
        combatant.alive = false;
        log(format!("[STATE][{}] drops to 0 HP → Defeated", combatant.actor.name));
        return true;
    }
    false
}

/// Healing clamped to max HP. A defeated combatant cannot be healed. Returns the HP actually restored.
pub fn heal_hp(combatant: &mut Combatant, amount: i32, mut log: impl FnMut(String)) -> i32 {
    if amount <= 0 || !combatant.alive {
        return 0;
    }
    let before = combatant.hp;
    combatant.hp = (combatant.hp + amount).min(combatant.actor.stats.max_hp);
    log(format!(
        "[HEAL][{}] +{} HP ({} → {})",
        combatant.actor.name,
        combatant.hp - before,
        before,
        combatant.hp
    ));
    combatant.hp - before
}

/// SP restore clamped to max SP. Returns the SP actually restored.
pub fn restore_sp(combatant: &mut Combatant, amount: i32, mut log: impl FnMut(String)) -> i32 {
    if amount <= 0 || !combatant.alive {
        return 0;
    }
    let before = combatant.sp;
    combatant.sp = (combatant.sp + amount).min(combatant.actor.stats.max_sp);
    log(format!(
        "[HEAL][{}] +{} SP ({} → {})",
        combatant.actor.name,
        combatant.sp - before,
        before,
        combatant.sp
    ));
    combatant.sp - before
}

/// Deduct SP if affordable. Returns false (and leaves SP untouched) otherwise.
pub fn spend_sp(combatant: &mut Combatant, cost: i32) -> bool {
    let cost = cost.max(0);
    if combatant.sp < cost {
        return false;
    }
    combatant.sp -= cost;
    true
}
