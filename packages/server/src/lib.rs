//! Planning-poker room server.
//!
//! Participants join a room, pick a card per estimation row, and reveal the
//! aggregated result together. Every connected participant is kept in sync
//! over a WebSocket.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
