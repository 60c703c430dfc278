//! Commands a participant can issue inside a room.

/// One validated operation from an inbound live update.
///
/// A single inbound frame may carry several commands; `Reset` short-circuits
/// the rest of its frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    /// Choose `card` for `dimension`. An empty card clears the selection.
    Select { dimension: String, card: String },
    /// Clear the selection for `dimension`.
    Deselect { dimension: String },
    /// Switch between `Participant` and `Watcher`.
    ToggleRole,
    /// Flip the secondary-role (QA) flag.
    ToggleSecondary,
    /// Reveal the aggregated results.
    Reveal,
    /// Hide results and clear every selection in the room.
    Reset,
}
