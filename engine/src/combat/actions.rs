use serde::{Deserialize, Serialize};

use crate::CombatantId;

/// An intent submitted by the UI or the AI policy on behalf of `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAction {
    pub source: CombatantId,
    #[serde(flatten)]
    pub kind: ActionKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionKind {
    Attack {
        target: CombatantId,
    },
    /// `targets[0]` is used for single-target skills; all-target skills ignore
    /// the list and hit whoever is alive when the action resolves.
    Skill {
        skill_id: String,
        #[serde(default)]
        targets: Vec<CombatantId>,
    },
    Guard,
    Item {
        item_id: String,
        target: CombatantId,
    },
    End,
}

impl CombatAction {
    pub fn attack(source: impl Into<CombatantId>, target: impl Into<CombatantId>) -> Self {
        Self {
            source: source.into(),
            kind: ActionKind::Attack {
                target: target.into(),
            },
        }
    }

    pub fn skill(
        source: impl Into<CombatantId>,
        skill_id: impl Into<String>,
        targets: Vec<CombatantId>,
    ) -> Self {
        Self {
            source: source.into(),
            kind: ActionKind::Skill {
                skill_id: skill_id.into(),
                targets,
            },
        }
    }

    pub fn guard(source: impl Into<CombatantId>) -> Self {
        Self {
            source: source.into(),
            kind: ActionKind::Guard,
        }
    }

    pub fn item(
        source: impl Into<CombatantId>,
        item_id: impl Into<String>,
        target: impl Into<CombatantId>,
    ) -> Self {
        Self {
            source: source.into(),
            kind: ActionKind::Item {
                item_id: item_id.into(),
                target: target.into(),
            },
        }
    }

    pub fn end(source: impl Into<CombatantId>) -> Self {
        Self {
            source: source.into(),
            kind: ActionKind::End,
        }
    }
}
