use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::combat::ai::autopilot_action;
use crate::combat::session::CombatSession;
use crate::combat::{CombatAction, Telemetry};
use crate::config::CombatConfig;
use crate::content::{filter_unlocked_skills, ContentCatalog};
use crate::encounter::{scale_encounter_with, Encounter, EncounterResolution};
use crate::{Actor, Inventory, Side};

/// Safety cap on resolved actions per simulated fight.
pub const MAX_ACTIONS: u32 = 500;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterConfig {
    #[serde(default)]
    pub encounter_id: Option<String>,
    #[serde(default)]
    pub encounter_path: Option<String>,
    /// Built-in party member ids; empty means the whole built-in roster.
    #[serde(default)]
    pub party: Vec<String>,
    #[serde(default)]
    pub party_path: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub shards: u32,
    #[serde(default)]
    pub flags: BTreeSet<String>,
    #[serde(default)]
    pub inventory: Option<Inventory>,
    #[serde(default)]
    pub unlocked_skills: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EncounterReport {
    pub encounter_id: String,
    /// "ally", "enemy", or "draw" when the action cap was hit first.
    pub winner: String,
    pub rounds: u32,
    pub actions: u32,
    pub telemetry: Telemetry,
    pub inventory: Inventory,
    pub resolution: Option<EncounterResolution>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimulationSummary {
    pub samples: u32,
    pub ally_wins: u32,
    pub enemy_wins: u32,
    pub draws: u32,
    pub avg_rounds: f64,
    pub avg_extra_turns: f64,
}

/// Everything a fight needs, loaded once and reused across samples.
struct Prepared {
    content: ContentCatalog,
    party: Vec<Actor>,
    encounter: Encounter,
    inventory: Inventory,
    config: CombatConfig,
}

pub fn simulate_encounter(cfg: EncounterConfig) -> Result<EncounterReport> {
    let prepared = prepare(&cfg)?;
    run_once(&prepared, cfg.seed)
}

/// Run `samples` fights with per-sample seeds drawn from a ChaCha stream seeded by `cfg.seed`.
pub fn simulate_encounter_many(cfg: EncounterConfig, samples: u32) -> Result<SimulationSummary> {
    if samples == 0 {
        bail!("samples must be at least 1");
    }
    let prepared = prepare(&cfg)?;
    let mut seeds = ChaCha8Rng::seed_from_u64(cfg.seed);

    let mut summary = SimulationSummary {
        samples,
        ally_wins: 0,
        enemy_wins: 0,
        draws: 0,
        avg_rounds: 0.0,
        avg_extra_turns: 0.0,
    };
    let mut rounds = 0u64;
    let mut extra = 0u64;
    for _ in 0..samples {
        let report = run_once(&prepared, seeds.next_u64())?;
        match report.winner.as_str() {
            "ally" => summary.ally_wins += 1,
            "enemy" => summary.enemy_wins += 1,
            _ => summary.draws += 1,
        }
        rounds += u64::from(report.rounds);
        extra += u64::from(report.telemetry.extra_turns);
    }
    summary.avg_rounds = rounds as f64 / f64::from(samples);
    summary.avg_extra_turns = extra as f64 / f64::from(samples);
    Ok(summary)
}

fn prepare(cfg: &EncounterConfig) -> Result<Prepared> {
    let content = ContentCatalog::builtin().context("failed to load built-in content")?;

    let encounter = match (&cfg.encounter_path, &cfg.encounter_id) {
        (Some(path), _) => load_encounter(path)?,
        (None, Some(id)) => content.encounter(id)?.clone(),
        (None, None) => bail!("either encounter_id or encounter_path is required"),
    };

    let mut party = match &cfg.party_path {
        Some(path) => load_party(path)?,
        None => content.party_members(&cfg.party)?,
    };
    if let Some(unlocked) = &cfg.unlocked_skills {
        party = filter_unlocked_skills(&party, unlocked);
    }

    let config = match &cfg.config_path {
        Some(path) => load_config(path)?,
        None => CombatConfig::default(),
    };

    let encounter = scale_encounter_with(&encounter, cfg.shards, &cfg.flags, &config.scaling);
    let inventory = cfg.inventory.clone().unwrap_or_else(default_inventory);

    Ok(Prepared {
        content,
        party,
        encounter,
        inventory,
        config,
    })
}

fn run_once(prepared: &Prepared, seed: u64) -> Result<EncounterReport> {
    let mut session = CombatSession::new(
        &prepared.party,
        &prepared.encounter,
        &prepared.content,
        prepared.inventory.clone(),
        seed,
        prepared.config.clone(),
    )?;

    let mut actions = 0u32;
    while !session.is_over() && actions < MAX_ACTIONS {
        let Some(active) = session.active().map(|c| c.id.clone()) else {
            warn!("no active combatant before a verdict");
            break;
        };
        let action = session
            .enemy_action()
            .or_else(|| autopilot_action(session.state(), session.skills()))
            .unwrap_or_else(|| CombatAction::end(active.clone()));

        let events = session.submit(&action);
        if events.iter().any(|e| e.is_failure()) {
            debug!(?action, "autopilot action refused; ending turn instead");
            session.submit(&CombatAction::end(active));
        }
        actions += 1;
    }

    let state = session.state();
    let winner = match (state.ended, state.winner) {
        (true, Some(Side::Ally)) => "ally",
        (true, Some(Side::Enemy)) => "enemy",
        _ => "draw",
    };

    Ok(EncounterReport {
        encounter_id: prepared.encounter.id.clone(),
        winner: winner.to_string(),
        rounds: state.round,
        actions,
        telemetry: state.telemetry,
        inventory: session.inventory().clone(),
        resolution: session.resolution(),
        log: state.log.iter().cloned().collect(),
    })
}

/// Two tonics and a syrup, the stock a fresh save starts with.
pub fn default_inventory() -> Inventory {
    Inventory::from([("dream_tonic".to_string(), 2), ("star_syrup".to_string(), 1)])
}

pub fn load_encounter(path: &str) -> Result<Encounter> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read encounter JSON: {}", path))?;
    let data = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse encounter JSON: {}", path))?;
    Ok(data)
}

pub fn load_party(path: &str) -> Result<Vec<Actor>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read party JSON: {}", path))?;
    let data = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse party JSON: {}", path))?;
    Ok(data)
}

/// YAML for `.yaml`/`.yml`, JSON otherwise.
pub fn load_config(path: &str) -> Result<CombatConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read config: {}", path))?;
    parse_config(&text, Path::new(path))
}

pub fn parse_config(text: &str, path: &Path) -> Result<CombatConfig> {
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let cfg = if yaml {
        serde_yaml::from_str(text)
            .with_context(|| format!("failed to parse YAML config: {}", path.display()))?
    } else {
        serde_json::from_str(text)
            .with_context(|| format!("failed to parse JSON config: {}", path.display()))?
    };
    Ok(cfg)
}
