use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::ai::choose_action;
use crate::combat::queue::preview;
use crate::combat::resolver::{resolve, ResolveContext};
use crate::combat::turns::{begin, Exchange};
use crate::combat::{CombatAction, CombatEvent, CombatState, Combatant, Telemetry};
use crate::config::CombatConfig;
use crate::content::ContentCatalog;
use crate::encounter::{Encounter, EncounterResolution, Reward};
use crate::error::ContentError;
use crate::status::is_alive;
use crate::{Actor, CombatantId, Inventory, ItemCatalog, Side, SkillCatalog};

/// What the UI should be doing right now. There is no enemy phase: the caller
/// simply holds off on commands while an enemy is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    SelectCommand,
}

pub fn get_active(state: &CombatState) -> Option<&Combatant> {
    state.active_combatant()
}

pub fn phase(state: &CombatState) -> Phase {
    match get_active(state) {
        Some(c) if !state.ended && c.side == Side::Ally && is_alive(c) => Phase::SelectCommand,
        _ => Phase::Idle,
    }
}

/// One encounter attempt. Owns the state, the caller's inventory, and the catalogs
/// every resolve call reads from.
#[derive(Debug, Clone)]
pub struct CombatSession {
    state: CombatState,
    inventory: Inventory,
    skills: SkillCatalog,
    items: ItemCatalog,
    encounter_id: String,
    reward: Reward,
}

impl CombatSession {
    /// Clone `party` and the (already scaled) `encounter` into combatants and open round 1.
    pub fn new(
        party: &[Actor],
        encounter: &Encounter,
        content: &ContentCatalog,
        inventory: Inventory,
        seed: u64,
        config: CombatConfig,
    ) -> Result<Self, ContentError> {
        if party.is_empty() {
            return Err(ContentError::EmptyParty);
        }
        if encounter.enemies.is_empty() {
            return Err(ContentError::EmptyEncounter(encounter.id.clone()));
        }

        let mut combatants: IndexMap<CombatantId, Combatant> = IndexMap::new();
        let sides = [(Side::Ally, "a", party), (Side::Enemy, "e", &encounter.enemies[..])];
        for (side, prefix, roster) in sides {
            for (n, actor) in roster.iter().enumerate() {
                validate_actor(actor)?;
                let id = format!("{}{}", prefix, n + 1);
                combatants.insert(id.clone(), Combatant::new(id, side, actor.clone()));
            }
        }

        let mut state = CombatState {
            combatants,
            queue: Vec::new(),
            active: None,
            round: 1,
            seed,
            ended: false,
            winner: None,
            extra_turn_ready: IndexMap::new(),
            pending_extra_turn: None,
            telemetry: Telemetry::default(),
            log: VecDeque::new(),
            config,
        };

        let roster = |side: Side| {
            state
                .combatants
                .values()
                .filter(|c| c.side == side)
                .map(|c| c.actor.name.clone())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let start = format!(
            "[START] Party ({}) vs {} ({})",
            roster(Side::Ally),
            encounter.name,
            roster(Side::Enemy)
        );
        state.push_log(start);

        let mut ex = Exchange::default();
        begin(&mut state, &mut ex);
        for line in ex.lines {
            state.push_log(line);
        }
        info!(encounter = %encounter.id, seed, order = ?state.queue, "combat session started");

        Ok(Self {
            state,
            inventory,
            skills: content.skills.clone(),
            items: content.items.clone(),
            encounter_id: encounter.id.clone(),
            reward: encounter.reward.clone().unwrap_or_default(),
        })
    }

    pub fn state(&self) -> &CombatState {
        &self.state
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn skills(&self) -> &SkillCatalog {
        &self.skills
    }

    pub fn active(&self) -> Option<&Combatant> {
        get_active(&self.state)
    }

    pub fn phase(&self) -> Phase {
        phase(&self.state)
    }

    pub fn is_over(&self) -> bool {
        self.state.ended
    }

    pub fn telemetry(&self) -> Telemetry {
        self.state.telemetry
    }

    /// Upcoming turns, capped for display.
    pub fn turn_preview(&self) -> Vec<CombatantId> {
        preview(&self.state.queue, self.state.config.turn_preview)
    }

    /// Resolve one action and keep the resulting state and inventory.
    pub fn submit(&mut self, action: &CombatAction) -> Vec<CombatEvent> {
        let ctx = ResolveContext {
            skills: &self.skills,
            items: &self.items,
            inventory: &self.inventory,
        };
        let out = resolve(&self.state, action, &ctx);
        self.state = out.state;
        self.inventory = out.inventory;
        let finished = out.events.iter().find_map(|e| match e {
            CombatEvent::CombatEnded { winner } => Some(*winner),
            _ => None,
        });
        if let Some(winner) = finished {
            info!(
                encounter = %self.encounter_id,
                ?winner,
                round = self.state.round,
                telemetry = ?self.state.telemetry,
                "combat session ended"
            );
        }
        out.events
    }

    /// Player backed out of target selection. Nothing in the fight changes.
    pub fn cancel_target_selection(&mut self) {
        self.state.telemetry.target_cancels += 1;
    }

    /// The AI's pick for the active enemy, if an enemy is active.
    pub fn enemy_action(&self) -> Option<CombatAction> {
        choose_action(&self.state, &self.skills)
    }

    /// Terminal verdict for the caller; `None` while the fight is still going.
    pub fn resolution(&self) -> Option<EncounterResolution> {
        if !self.state.ended {
            return None;
        }
        let victory = self.state.winner == Some(Side::Ally);
        Some(EncounterResolution {
            encounter_id: self.encounter_id.clone(),
            victory,
            messages: self.state.log.iter().cloned().collect(),
            rewards: if victory {
                self.reward.clone()
            } else {
                Reward::default()
            },
        })
    }
}

fn validate_actor(actor: &Actor) -> Result<(), ContentError> {
    let invalid = |reason: &str| ContentError::InvalidStats {
        actor: actor.id.clone(),
        reason: reason.to_string(),
    };
    if actor.stats.max_hp <= 0 {
        return Err(invalid("max_hp must be positive"));
    }
    if actor.stats.max_sp < 0 {
        return Err(invalid("max_sp must not be negative"));
    }
    Ok(())
}
