//! Request handlers.

mod error;
mod http;
mod websocket;

pub use error::ApiError;
pub use http::{create_room, get_room_detail, health_check, join_room, leave_room};
pub use websocket::websocket_handler;

/// WebSocket のパス
pub fn websocket_path(room_id: &str, participant_id: &str) -> String {
    format!("/ws/rooms/{}/participants/{}", room_id, participant_id)
}
