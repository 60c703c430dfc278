pub mod participant;
pub mod room;

pub use participant::{Participant, ParticipantView};
pub use room::{DEFAULT_CARDS, Room, RoomConfig, RoomSnapshot};
