//! HTTP API request / response DTOs.

use serde::{Deserialize, Serialize};

/// A list given either as one comma-separated string or as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Joined(String),
    Items(Vec<String>),
}

impl ListInput {
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            Self::Items(items) => items,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `POST /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRoomRequest {
    /// Defaults to `1,2,3,5,8,13`
    #[serde(default)]
    pub cards: Option<ListInput>,
    #[serde(default)]
    pub rows: Option<ListInput>,
    #[serde(default = "default_true")]
    pub map_to_fibonacci: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCreatedDto {
    pub room_id: String,
    pub cards: Vec<String>,
    pub rows: Vec<String>,
    pub map_to_fibonacci: bool,
    pub created_at: String,
    pub expires_at: String,
}

/// `POST /api/rooms/{room_id}/participants`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JoinRoomRequest {
    /// May be empty.
    #[serde(default)]
    pub name: String,
    /// `"Participant"` or `"Watcher"`. Anything else joins as a participant.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub qa: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedDto {
    pub room_id: String,
    pub participant_id: String,
    pub websocket_path: String,
}

/// Room detail. Participant ids are never exposed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub cards: Vec<String>,
    pub rows: Vec<String>,
    pub map_to_fibonacci: bool,
    pub showing: bool,
    pub participants: Vec<ParticipantDetailDto>,
    pub created_at: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub name: String,
    pub role: String,
    pub qa: bool,
    pub active: bool,
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub rooms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid_cards: Vec<String>,
}
