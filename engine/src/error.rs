use thiserror::Error;

/// Failures while assembling content or a session. Nothing inside combat resolution
/// returns these; in-fight failures are reported as events instead.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unknown encounter '{0}'")]
    UnknownEncounter(String),
    #[error("unknown actor '{0}'")]
    UnknownActor(String),
    #[error("party is empty")]
    EmptyParty,
    #[error("encounter '{0}' has no enemies")]
    EmptyEncounter(String),
    #[error("actor '{actor}' has invalid stats: {reason}")]
    InvalidStats { actor: String, reason: String },
    #[error("failed to parse built-in {what}")]
    Builtin {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
