//! Action definitions
//!
//! Every user-originated or derived event flowing through a room is one of
//! these variants. Actions are immutable once built; broadcast fan-out hands
//! each waiting session its own clone.

use crate::types::{Key, SenderId};

/// One event in a room
///
/// The four `*Down`/`*Up` variants originate from one-shot trigger requests;
/// `Message` is derived by the acting session when a send commits a
/// non-empty buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A letter key was pressed
    KeyDown { sender: SenderId, key: Key },
    /// A letter key was released
    KeyUp { sender: SenderId, key: Key },
    /// The send button was pressed
    SendDown { sender: SenderId },
    /// The send button was released
    SendUp { sender: SenderId },
    /// A completed message, visible to every session in the room
    Message { sender: SenderId, text: String },
}

impl Action {
    /// The participant this action originated from
    pub fn sender(&self) -> SenderId {
        match self {
            Action::KeyDown { sender, .. }
            | Action::KeyUp { sender, .. }
            | Action::SendDown { sender }
            | Action::SendUp { sender }
            | Action::Message { sender, .. } => *sender,
        }
    }
}
