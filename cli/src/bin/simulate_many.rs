use clap::Parser;
use encoding_rs::Encoding;
use engine::api::{simulate_encounter_many, EncounterConfig};
use std::{fs, path::PathBuf};

#[derive(Parser)]
#[command(name = "simulate-many")]
#[command(about = "Batch sim: many autopiloted fights against one encounter")]
struct Args {
    /// Built-in encounter id
    #[arg(long, default_value = "drowsy_thicket")]
    encounter: String,

    /// Optional EncounterConfig JSON (overrides every other flag except --trials)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Number of trials
    #[arg(long, default_value_t = 1000)]
    trials: u32,

    /// Base seed; per-trial seeds are drawn from a ChaCha stream seeded with it
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Dream shards collected so far
    #[arg(long, default_value_t = 0)]
    shards: u32,

    /// Story flags that are set (repeatable)
    #[arg(long = "flag")]
    flags: Vec<String>,
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg = match args.file.as_ref() {
        Some(path) => serde_json::from_str::<EncounterConfig>(&read_text_auto(path)?)?,
        None => EncounterConfig {
            encounter_id: Some(args.encounter.clone()),
            seed: args.seed,
            shards: args.shards,
            flags: args.flags.iter().cloned().collect(),
            ..EncounterConfig::default()
        },
    };
    let label = cfg
        .encounter_path
        .clone()
        .or_else(|| cfg.encounter_id.clone())
        .unwrap_or_default();
    let shards = cfg.shards;

    let stats = simulate_encounter_many(cfg, args.trials)?;
    let pct = |n: u32| f64::from(n) / f64::from(stats.samples) * 100.0;

    println!("simulate-many results");
    println!("---------------------");
    println!("trials:             {}", stats.samples);
    println!("encounter:          {} (shards {})", label, shards);
    println!();
    println!("ally win rate:      {:.1}%", pct(stats.ally_wins));
    println!("enemy win rate:     {:.1}%", pct(stats.enemy_wins));
    println!("unresolved:         {:.1}%", pct(stats.draws));
    println!("avg rounds:         {:.2}", stats.avg_rounds);
    println!("avg extra turns:    {:.2}", stats.avg_extra_turns);

    Ok(())
}
