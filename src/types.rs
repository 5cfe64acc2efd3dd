//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `RoomId`: UUID-based room identifier, embedded in every trigger URL
//! - `SenderId`: UUID-based per-connection participant identifier
//! - `Key`: the closed set of "letter" controls on the keyboard

use serde::Deserialize;
use uuid::Uuid;

/// Unique room identifier (newtype pattern)
///
/// Wraps a UUID v4. Generated by the server on the root redirect and carried
/// in the URL path of every request that touches the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub Uuid);

impl RoomId {
    /// Create a new random room ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique participant identifier (newtype pattern)
///
/// Generated once per viewing connection. One-shot trigger URLs echo it back
/// so the acting session can recognize its own actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct SenderId(pub Uuid);

impl SenderId {
    /// Create a new random sender ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SenderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A letter control on the two-button keyboard
///
/// Closed enum so URL parsing rejects unknown tags before they reach the
/// core, and so the rendered markup only ever contains known element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Cowboy,
    Hacker,
}

impl Key {
    /// The tag used both as the element id and as the URL path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Cowboy => "cowboy",
            Key::Hacker => "hacker",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_id_unique() {
        let id1 = RoomId::new();
        let id2 = RoomId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_sender_id_unique() {
        let id1 = SenderId::new();
        let id2 = SenderId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_key_parse() {
        let key: Key = serde_json::from_str("\"cowboy\"").unwrap();
        assert_eq!(key, Key::Cowboy);
        assert_eq!(key.to_string(), "cowboy");

        assert!(serde_json::from_str::<Key>("\"banana\"").is_err());
    }

    #[test]
    fn test_room_id_parse() {
        let id = RoomId::new();
        let json = format!("\"{}\"", id);
        let parsed: RoomId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
