//! Input documents.
//!
//! Two shapes are accepted:
//! - a self-contained [`SceneSpec`] (rooms with their receptacles and
//!   objects, propositions, constraints, instruction)
//! - an [`Episode`] plus the matching [`RunEpisode`] from a run document,
//!   where propositions refer to simulator handles that are resolved to
//!   entity names here

pub mod constraint;
pub mod proposition;

use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{InputError, SourceContext};

pub use constraint::{Constraint, RawConstraint, plan_levels, topological_generations};
pub use proposition::{EntityType, NamedEntity, NextToArgs, Proposition, RawProposition};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub id: String,
    #[serde(default)]
    pub receptacles: Vec<String>,
    #[serde(default)]
    pub objects: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    pub instruction: String,
    pub rooms: Vec<RoomSpec>,
    /// object id -> receptacle id the object is drawn stacked on
    pub object_to_receptacle: IndexMap<String, String>,
    pub propositions: Vec<RawProposition>,
    pub constraints: Vec<RawConstraint>,
    /// receptacle id -> icon path (relative to the icon root)
    pub receptacle_icons: IndexMap<String, String>,
    /// object id -> icon path
    pub object_icons: IndexMap<String, String>,
}

impl SceneSpec {
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, InputError> {
        SourceContext::new(name, text).parse_json()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        Self::from_json_str(&path.display().to_string(), &read(path)?)
    }

    /// Build a scene from an episode and its run record, resolving handles.
    pub fn from_episode(episode: &Episode, run: &RunEpisode) -> Result<Self, InputError> {
        let rooms = episode
            .rooms
            .iter()
            .map(|room| RoomSpec {
                id: room.clone(),
                receptacles: members_of(&episode.recep_to_room, room),
                objects: members_of(&episode.object_to_room, room),
            })
            .collect();

        let resolver = HandleResolver::new(episode);
        let propositions = run
            .evaluation_propositions
            .iter()
            .map(|p| resolver.resolve(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SceneSpec {
            instruction: episode.instruction.clone(),
            rooms,
            object_to_receptacle: IndexMap::new(),
            propositions,
            constraints: run.evaluation_constraints.clone(),
            receptacle_icons: IndexMap::new(),
            object_icons: IndexMap::new(),
        })
    }

    pub fn room(&self, id: &str) -> Option<&RoomSpec> {
        self.rooms.iter().find(|r| r.id == id)
    }
}

fn members_of(assignment: &IndexMap<String, String>, room: &str) -> Vec<String> {
    assignment
        .iter()
        .filter(|(_, r)| r.as_str() == room)
        .map(|(id, _)| id.clone())
        .collect()
}

fn read(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Episode metadata as exported by the task generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    pub instruction: String,
    pub rooms: Vec<String>,
    pub recep_to_room: IndexMap<String, String>,
    pub object_to_room: IndexMap<String, String>,
    pub recep_to_handle: IndexMap<String, String>,
    pub object_to_handle: IndexMap<String, String>,
    pub room_to_id: IndexMap<String, String>,
    pub recep_to_description: IndexMap<String, Value>,
}

impl Episode {
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, InputError> {
        SourceContext::new(name, text).parse_json()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        Self::from_json_str(&path.display().to_string(), &read(path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEpisode {
    #[serde(deserialize_with = "string_or_number")]
    pub episode_id: String,
    #[serde(default)]
    pub evaluation_propositions: Vec<RawProposition>,
    #[serde(default)]
    pub evaluation_constraints: Vec<RawConstraint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunDocument {
    #[serde(default)]
    pub episodes: Vec<RunEpisode>,
}

impl RunDocument {
    pub fn from_json_str(name: &str, text: &str) -> Result<Self, InputError> {
        SourceContext::new(name, text).parse_json()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        Self::from_json_str(&path.display().to_string(), &read(path)?)
    }

    pub fn episode(&self, episode_id: &str) -> Result<&RunEpisode, InputError> {
        self.episodes
            .iter()
            .find(|e| e.episode_id == episode_id)
            .ok_or_else(|| InputError::MissingEpisode {
                episode_id: episode_id.to_string(),
            })
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

/// Maps simulator handles back to entity names.
struct HandleResolver {
    objects: HashMap<String, String>,
    receptacles: HashMap<String, String>,
    rooms: HashMap<String, String>,
}

impl HandleResolver {
    fn new(episode: &Episode) -> Self {
        let invert = |m: &IndexMap<String, String>| m.iter().map(|(k, v)| (v.clone(), k.clone())).collect();
        Self {
            objects: invert(&episode.object_to_handle),
            receptacles: invert(&episode.recep_to_handle),
            rooms: invert(&episode.room_to_id),
        }
    }

    /// Fill `object_names` / `receptacle_names` / `room_names` from their
    /// handle lists. Name lists already present are kept as they are.
    fn resolve(&self, raw: &RawProposition) -> Result<RawProposition, InputError> {
        let mut out = raw.clone();
        let pairs = [
            ("object_handles", "object_names", &self.objects),
            ("receptacle_handles", "receptacle_names", &self.receptacles),
            ("room_ids", "room_names", &self.rooms),
        ];
        for (handles_key, names_key, table) in pairs {
            if out.args.contains_key(names_key) {
                continue;
            }
            let Some(Value::Array(handles)) = raw.args.get(handles_key) else {
                continue;
            };
            let names = handles
                .iter()
                .map(|h| {
                    let handle = match h {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    table
                        .get(&handle)
                        .cloned()
                        .map(Value::String)
                        .ok_or(InputError::UnknownHandle { handle })
                })
                .collect::<Result<Vec<_>, _>>()?;
            out.args.insert(names_key.to_string(), Value::Array(names));
        }
        Ok(out)
    }
}
