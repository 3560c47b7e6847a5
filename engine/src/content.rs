use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::encounter::Encounter;
use crate::error::ContentError;
use crate::{index_by_id, Actor, Item, ItemCatalog, Skill, SkillCatalog};

pub fn builtin_skills() -> &'static str {
    include_str!("../content/skills.json")
}

pub fn builtin_items() -> &'static str {
    include_str!("../content/items.json")
}

pub fn builtin_party() -> &'static str {
    include_str!("../content/party.json")
}

pub fn builtin_encounters() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (
            "drowsy_thicket",
            include_str!("../content/encounters/drowsy_thicket.json"),
        ),
        (
            "mirror_hall",
            include_str!("../content/encounters/mirror_hall.json"),
        ),
        (
            "nightmare_king",
            include_str!("../content/encounters/nightmare_king.json"),
        ),
    ])
}

/// Read-only lookup tables for one run of the game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentCatalog {
    pub skills: SkillCatalog,
    pub items: ItemCatalog,
    /// Party blueprints keyed by actor id.
    pub party: IndexMap<String, Actor>,
    pub encounters: IndexMap<String, Encounter>,
}

impl ContentCatalog {
    pub fn builtin() -> Result<Self, ContentError> {
        let skills: Vec<Skill> = parse("skills", builtin_skills())?;
        let items: Vec<Item> = parse("items", builtin_items())?;
        let party: Vec<Actor> = parse("party", builtin_party())?;

        let mut sources: Vec<(&str, &str)> = builtin_encounters().into_iter().collect();
        sources.sort_unstable_by_key(|(id, _)| *id);
        let encounters = sources
            .into_iter()
            .map(|(_, text)| parse::<Encounter>("encounter", text))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skills: index_by_id(skills, |s| s.id.as_str()),
            items: index_by_id(items, |i| i.id.as_str()),
            party: index_by_id(party, |a| a.id.as_str()),
            encounters: index_by_id(encounters, |e| e.id.as_str()),
        })
    }

    pub fn encounter(&self, id: &str) -> Result<&Encounter, ContentError> {
        self.encounters
            .get(id)
            .ok_or_else(|| ContentError::UnknownEncounter(id.to_string()))
    }

    /// Party blueprints in the requested order; an empty request means the whole roster.
    pub fn party_members(&self, ids: &[String]) -> Result<Vec<Actor>, ContentError> {
        if ids.is_empty() {
            return Ok(self.party.values().cloned().collect());
        }
        ids.iter()
            .map(|id| {
                self.party
                    .get(id)
                    .cloned()
                    .ok_or_else(|| ContentError::UnknownActor(id.clone()))
            })
            .collect()
    }
}

fn parse<T: for<'de> Deserialize<'de>>(what: &'static str, text: &str) -> Result<T, ContentError> {
    serde_json::from_str(text).map_err(|source| ContentError::Builtin { what, source })
}

/// Clone the party, keeping only skills unlocked for each actor id.
/// Actors with no entry in `unlocked` keep their full list.
pub fn filter_unlocked_skills(
    party: &[Actor],
    unlocked: &HashMap<String, Vec<String>>,
) -> Vec<Actor> {
    party
        .iter()
        .map(|actor| {
            let mut a = actor.clone();
            if let Some(allowed) = unlocked.get(&actor.id) {
                a.skills.retain(|s| allowed.contains(s));
            }
            a
        })
        .collect()
}
