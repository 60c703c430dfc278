//! WebSocket frame DTOs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Inbound frame. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LiveUpdateMessage {
    pub card: Option<String>,
    pub row: String,
    pub undo: bool,
    pub toggle_role: bool,
    pub toggle_qa: bool,
    pub reveal: bool,
    pub reset: bool,
}

/// Outbound frame, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    RoomState(RoomStateDto),
    Error(ErrorNoticeDto),
}

/// Full room state as seen by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStateDto {
    pub room_id: String,
    pub cards: Vec<String>,
    pub rows: Vec<String>,
    pub map_to_fibonacci: bool,
    pub showing: bool,
    /// Everyone has picked a card for every row.
    pub can_reveal: bool,
    pub participants: Vec<ParticipantStateDto>,
    /// Present only while revealed and once a complete result exists.
    pub results: Option<Vec<RowResultDto>>,
    pub you: Option<ParticipantStateDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStateDto {
    pub name: String,
    pub role: String,
    pub qa: bool,
    pub active: bool,
    pub ready: bool,
    pub is_you: bool,
    /// Other participants' cards are hidden until the room is revealed.
    pub selections: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResultDto {
    pub name: String,
    pub overall: DistributionDto,
    pub primary: DistributionDto,
    pub secondary: DistributionDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionDto {
    pub count: u32,
    pub average: Option<String>,
    pub histogram: String,
    pub fibonacci_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNoticeDto {
    pub message: String,
    /// Where the client should navigate next, if anywhere.
    pub redirect: Option<String>,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, redirect: Option<String>) -> Self {
        Self::Error(ErrorNoticeDto {
            message: message.into(),
            redirect,
        })
    }

    /// リダイレクト付きのエラーか（送信後に接続を終える）
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(notice) if notice.redirect.is_some())
    }
}
