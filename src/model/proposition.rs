//! Task propositions: the closed set of relations a scene diagram can show.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SceneError;

/// A proposition as it appears in scene and run documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProposition {
    pub function_name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlacementArgs {
    pub object_names: Vec<String>,
    pub receptacle_names: Vec<String>,
    #[serde(default = "one")]
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoomArgs {
    pub object_names: Vec<String>,
    pub room_names: Vec<String>,
    #[serde(default = "one")]
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FloorArgs {
    pub object_names: Vec<String>,
    #[serde(default = "one")]
    pub number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Object,
    Receptacle,
}

impl EntityType {
    /// Anything that is not labelled `object` is drawn as a receptacle.
    pub fn from_label(label: &str) -> Self {
        if label == "object" {
            EntityType::Object
        } else {
            EntityType::Receptacle
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedEntity {
    pub name: String,
    pub kind: EntityType,
}

impl From<(String, String)> for NamedEntity {
    fn from((name, label): (String, String)) -> Self {
        NamedEntity {
            kind: EntityType::from_label(&label),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextToArgs {
    pub entities_a: Vec<NamedEntity>,
    pub entities_b: Vec<NamedEntity>,
    pub number: usize,
}

#[derive(Deserialize)]
struct RawNextToArgs {
    entity_handles_a_names_and_types: Vec<(String, String)>,
    entity_handles_b_names_and_types: Vec<(String, String)>,
    #[serde(default = "one")]
    number: usize,
}

fn one() -> usize {
    1
}

/// Decoded proposition, matched exhaustively by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proposition {
    IsOnTop(PlacementArgs),
    IsInside(PlacementArgs),
    IsInRoom(RoomArgs),
    IsOnFloor(FloorArgs),
    IsNextTo(NextToArgs),
}

impl Proposition {
    pub fn function_name(&self) -> &'static str {
        match self {
            Proposition::IsOnTop(_) => "is_on_top",
            Proposition::IsInside(_) => "is_inside",
            Proposition::IsInRoom(_) => "is_in_room",
            Proposition::IsOnFloor(_) => "is_on_floor",
            Proposition::IsNextTo(_) => "is_next_to",
        }
    }

    /// Objects the proposition is about. Next-to relations have none; they
    /// are drawn by the legend.
    pub fn object_names(&self) -> &[String] {
        match self {
            Proposition::IsOnTop(a) | Proposition::IsInside(a) => &a.object_names,
            Proposition::IsInRoom(a) => &a.object_names,
            Proposition::IsOnFloor(a) => &a.object_names,
            Proposition::IsNextTo(_) => &[],
        }
    }

    pub fn number(&self) -> usize {
        match self {
            Proposition::IsOnTop(a) | Proposition::IsInside(a) => a.number,
            Proposition::IsInRoom(a) => a.number,
            Proposition::IsOnFloor(a) => a.number,
            Proposition::IsNextTo(a) => a.number,
        }
    }

    /// Whether the proposition takes a colour from the arrow palette.
    pub fn uses_color(&self) -> bool {
        !matches!(self, Proposition::IsNextTo(_))
    }

    /// More objects listed than need to satisfy it ("any two of ...").
    pub fn is_ambiguous(&self) -> bool {
        self.object_names().len() > self.number()
    }
}

fn decode<T: DeserializeOwned>(name: &str, args: &Map<String, Value>) -> Result<T, SceneError> {
    serde_json::from_value(Value::Object(args.clone())).map_err(|err| SceneError::MalformedProposition {
        name: name.to_string(),
        message: err.to_string(),
    })
}

impl TryFrom<&RawProposition> for Proposition {
    type Error = SceneError;

    fn try_from(raw: &RawProposition) -> Result<Self, Self::Error> {
        let name = raw.function_name.as_str();
        match name {
            "is_on_top" => Ok(Proposition::IsOnTop(decode(name, &raw.args)?)),
            "is_inside" => Ok(Proposition::IsInside(decode(name, &raw.args)?)),
            "is_in_room" => Ok(Proposition::IsInRoom(decode(name, &raw.args)?)),
            "is_on_floor" => Ok(Proposition::IsOnFloor(decode(name, &raw.args)?)),
            "is_next_to" => {
                let args: RawNextToArgs = decode(name, &raw.args)?;
                Ok(Proposition::IsNextTo(NextToArgs {
                    entities_a: args.entity_handles_a_names_and_types.into_iter().map(Into::into).collect(),
                    entities_b: args.entity_handles_b_names_and_types.into_iter().map(Into::into).collect(),
                    number: args.number,
                }))
            }
            other => Err(SceneError::UnknownProposition {
                name: other.to_string(),
            }),
        }
    }
}

/// Decode every raw proposition, failing on the first unknown or malformed one.
pub fn decode_all(raw: &[RawProposition]) -> Result<Vec<Proposition>, SceneError> {
    raw.iter().map(Proposition::try_from).collect()
}
