//! RoomRegistry implementations.

pub mod inmemory;
pub mod sweeper;

pub use inmemory::{DEFAULT_ROOM_TTL, InMemoryRoomRegistry, RegistryConfig};
pub use sweeper::{DEFAULT_SWEEP_INTERVAL, spawn_sweeper};
