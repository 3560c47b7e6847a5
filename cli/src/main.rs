use std::{collections::BTreeSet, fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use encoding_rs::Encoding;
use engine::api::{simulate_encounter, EncounterConfig};
use engine::content::ContentCatalog;
use engine::encounter::scale_encounter_with;
use engine::{preview, CombatConfig, CombatSession, Encounter};
use tracing::Level;

#[derive(Subcommand)]
enum Cmd {
    /// Run one encounter with the AI on both sides and print the combat log
    Fight {
        /// Built-in encounter id
        #[arg(long, default_value = "drowsy_thicket")]
        encounter: String,
        /// Encounter JSON file (overrides --encounter)
        #[arg(long)]
        encounter_file: Option<PathBuf>,
        /// Comma-separated built-in party ids (default: whole roster)
        #[arg(long, value_delimiter = ',')]
        party: Vec<String>,
        /// Session seed (initiative tie-break)
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Dream shards collected so far
        #[arg(long, default_value_t = 0)]
        shards: u32,
        /// Story flags that are set (repeatable)
        #[arg(long = "flag")]
        flags: Vec<String>,
        /// Combat config (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full report as JSON instead of the log
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show the round-1 turn order for an encounter
    Order {
        #[arg(long, default_value = "drowsy_thicket")]
        encounter: String,
        #[arg(long)]
        encounter_file: Option<PathBuf>,
        #[arg(long, default_value_t = 7)]
        seed: u64,
        #[arg(long, default_value_t = 0)]
        shards: u32,
    },
    /// Print an encounter after meta-progression scaling
    Scale {
        #[arg(long, default_value = "drowsy_thicket")]
        encounter: String,
        #[arg(long)]
        encounter_file: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        shards: u32,
        #[arg(long = "flag")]
        flags: Vec<String>,
        /// Pretty-print JSON
        #[arg(long, default_value_t = true)]
        pretty: bool,
    },
    /// Dump the built-in content catalog as JSON
    Catalog {
        #[arg(long, default_value_t = true)]
        pretty: bool,
    },
}

#[derive(Parser)]
#[command(name = "dream-cli")]
#[command(about = "Dream combat simulator harness")]
struct Cli {
    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn pick_encounter(
    content: &ContentCatalog,
    id: &str,
    file: Option<&PathBuf>,
) -> anyhow::Result<Encounter> {
    match file {
        Some(path) => {
            let text = read_text_auto(path)?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse encounter JSON: {}", path.display()))
        }
        None => Ok(content.encounter(id)?.clone()),
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let content = ContentCatalog::builtin()?;

    match cli.cmd {
        Cmd::Fight {
            encounter,
            encounter_file,
            party,
            seed,
            shards,
            flags,
            config,
            json,
        } => {
            let cfg = EncounterConfig {
                encounter_id: Some(encounter),
                encounter_path: encounter_file.map(|p| p.to_string_lossy().into_owned()),
                party,
                seed,
                shards,
                flags: flags.into_iter().collect(),
                config_path: config.map(|p| p.to_string_lossy().into_owned()),
                ..EncounterConfig::default()
            };
            let report = simulate_encounter(cfg)?;
            if json {
                print_json(&report, true)?;
            } else {
                for line in &report.log {
                    println!("{}", line);
                }
                println!(
                    "winner={} rounds={} actions={} weakness_hits={} extra_turns={} guards={}",
                    report.winner,
                    report.rounds,
                    report.actions,
                    report.telemetry.weakness_hits,
                    report.telemetry.extra_turns,
                    report.telemetry.guards_used
                );
            }
        }
        Cmd::Order {
            encounter,
            encounter_file,
            seed,
            shards,
        } => {
            let config = CombatConfig::default();
            let base = pick_encounter(&content, &encounter, encounter_file.as_ref())?;
            let scaled = scale_encounter_with(&base, shards, &BTreeSet::new(), &config.scaling);
            let party: Vec<_> = content.party.values().cloned().collect();
            let session = CombatSession::new(
                &party,
                &scaled,
                &content,
                engine::api::default_inventory(),
                seed,
                config.clone(),
            )?;
            let state = session.state();
            println!("round {} (seed {})", state.round, seed);
            for (n, id) in preview(&state.queue, config.turn_preview).iter().enumerate() {
                if let Some(c) = state.get(id) {
                    println!(
                        "{:>2}. {:<4} {:<16} agi={:<3} luck={}",
                        n + 1,
                        c.id,
                        c.actor.name,
                        c.actor.stats.agility,
                        c.actor.stats.luck
                    );
                }
            }
        }
        Cmd::Scale {
            encounter,
            encounter_file,
            shards,
            flags,
            pretty,
        } => {
            let base = pick_encounter(&content, &encounter, encounter_file.as_ref())?;
            let flags: BTreeSet<String> = flags.into_iter().collect();
            let scaled =
                scale_encounter_with(&base, shards, &flags, &CombatConfig::default().scaling);
            print_json(&scaled, pretty)?;
        }
        Cmd::Catalog { pretty } => {
            print_json(&content, pretty)?;
        }
    }
    Ok(())
}
