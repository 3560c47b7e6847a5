//! Initiative ordering for a round.
//!
//! Sort key: agility desc, luck desc, then `initiative_hash(id, seed, round)`
//! desc. The seed is fixed per session, so the same roster, seed and round
//! always produce the same order, and replays line up exactly.

use std::cmp::Ordering;

use crate::combat::Combatant;
use crate::status::is_alive;
use crate::CombatantId;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the id bytes, then the seed and round in little-endian.
pub fn initiative_hash(id: &str, seed: u64, round: u32) -> u64 {
    id.as_bytes()
        .iter()
        .chain(seed.to_le_bytes().iter())
        .chain(round.to_le_bytes().iter())
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Living combatants in turn order for `round`. Dead combatants never appear.
pub fn build_turn_order<'a>(
    combatants: impl IntoIterator<Item = &'a Combatant>,
    round: u32,
    seed: u64,
) -> Vec<CombatantId> {
    let mut ready: Vec<(&Combatant, u64)> = combatants
        .into_iter()
        .filter(|c| c.alive && is_alive(c))
        .map(|c| (c, initiative_hash(&c.id, seed, round)))
        .collect();

    ready.sort_by(|(a, ha), (b, hb)| compare_initiative(a, *ha, b, *hb));
    ready.into_iter().map(|(c, _)| c.id.clone()).collect()
}

fn compare_initiative(a: &Combatant, ha: u64, b: &Combatant, hb: u64) -> Ordering {
    b.actor
        .stats
        .agility
        .cmp(&a.actor.stats.agility)
        .then_with(|| b.actor.stats.luck.cmp(&a.actor.stats.luck))
        .then_with(|| hb.cmp(&ha))
        // total order even on hash collision
        .then_with(|| a.id.cmp(&b.id))
}

/// Display slice of the queue. Turn logic must never depend on this cap.
pub fn preview(queue: &[CombatantId], cap: usize) -> Vec<CombatantId> {
    queue.iter().take(cap).cloned().collect()
}
