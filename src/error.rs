//! Error types for the chat server
//!
//! The core has exactly one expected runtime failure: a wait for the next
//! room action that was cancelled because the viewing connection closed.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal - listener bind or serve failure)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A wait for the next room action was cancelled
    ///
    /// Raised when the connection's cancellation token fires while the
    /// session is blocked in `Room::next_action`. Expected during normal
    /// disconnect, never user-visible.
    #[error("wait for next action was cancelled")]
    Cancelled,
}
