use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic label of a tracked object
///
/// The set is closed: anything not listed here fails deserialization and is
/// answered with a 400 before any store is contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    Ceiling,
    DoorFrame,
    Floor,
    InvisibleWallFace,
    WallArt,
    WallFace,
    WindowFrame,
    Couch,
    Table,
    Bed,
    Lamp,
    Plant,
    Screen,
    Storage,
    GlobalMesh,
    Other,
}

impl Label {
    #[cfg(test)]
    pub const ALL: [Label; 16] = [
        Label::Ceiling,
        Label::DoorFrame,
        Label::Floor,
        Label::InvisibleWallFace,
        Label::WallArt,
        Label::WallFace,
        Label::WindowFrame,
        Label::Couch,
        Label::Table,
        Label::Bed,
        Label::Lamp,
        Label::Plant,
        Label::Screen,
        Label::Storage,
        Label::GlobalMesh,
        Label::Other,
    ];

    /// Wire name, also used as the Redis key and the InfluxDB tag value
    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ceiling => "CEILING",
            Label::DoorFrame => "DOOR_FRAME",
            Label::Floor => "FLOOR",
            Label::InvisibleWallFace => "INVISIBLE_WALL_FACE",
            Label::WallArt => "WALL_ART",
            Label::WallFace => "WALL_FACE",
            Label::WindowFrame => "WINDOW_FRAME",
            Label::Couch => "COUCH",
            Label::Table => "TABLE",
            Label::Bed => "BED",
            Label::Lamp => "LAMP",
            Label::Plant => "PLANT",
            Label::Screen => "SCREEN",
            Label::Storage => "STORAGE",
            Label::GlobalMesh => "GLOBAL_MESH",
            Label::Other => "OTHER",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last known position of a labelled object
///
/// Also the request body of `POST /write`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CoordinateRecord {
    pub label: Label,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Label selector for reads, taken from the query string or a JSON body
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LabelQuery {
    pub label: Label,
}

/// Plain message body used for acknowledgements, misses and server errors
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
