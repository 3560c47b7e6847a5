use serde::{Deserialize, Serialize};

pub const DEFAULT_TURN_PREVIEW: usize = 7;
pub const DEFAULT_LOG_LIMIT: usize = 40;
pub const DEFAULT_GROWTH_PER_SHARD: f64 = 0.12;
pub const DEFAULT_BOSS_SHARD_STEP: u32 = 3;

/// Tunables that travel with a session. Every field has a default so partial
/// YAML/JSON files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// How many upcoming turns the display preview shows. Never used by turn logic.
    pub turn_preview: usize,
    /// Most-recent-N bound on the session's message log.
    pub log_limit: usize,
    pub scaling: ScalingConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            turn_preview: DEFAULT_TURN_PREVIEW,
            log_limit: DEFAULT_LOG_LIMIT,
            scaling: ScalingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Enemy max HP / strength / magic grow by this fraction per shard collected.
    pub growth_per_shard: f64,
    /// Boss encounters lose one resistance per this many shards.
    pub boss_shard_step: u32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            growth_per_shard: DEFAULT_GROWTH_PER_SHARD,
            boss_shard_step: DEFAULT_BOSS_SHARD_STEP,
        }
    }
}
