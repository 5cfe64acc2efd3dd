//! CSS-only Chat Server Library
//!
//! A chat server that needs no client-side scripting: every participant
//! holds one long-lived HTTP response the server keeps appending HTML/CSS
//! fragments to, and user input travels back as CSS `background-image`
//! requests fired by `:active` / `:not(:active)` style rules.
//!
//! # Features
//! - Per-room broadcast bus with fan-out to every subscribed session
//! - Reference-counted room lifecycle (created on first join, destroyed
//!   when the last viewer disconnects)
//! - Per-session action state machine with an in-progress message buffer
//! - One-shot nonce-carrying trigger URLs that defeat request caching
//! - Plain-text health snapshot of rooms and member counts
//!
//! # Architecture
//! A `RoomRegistry` (shared through the router state) maps room ids to
//! reference-counted `Room`s. Each viewing connection runs a
//! `ClientSession` task that subscribes to its room and reacts to
//! published `Action`s by writing fragments into its own response body.
//! One-shot trigger requests just resolve the room and publish.
//!
//! # Example
//! ```ignore
//! use css_chat::{router, RoomRegistry};
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = RoomRegistry::new();
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080")
//!         .await
//!         .unwrap();
//!     axum::serve(listener, router(registry)).await.unwrap();
//! }
//! ```

pub mod action;
pub mod error;
pub mod handler;
pub mod registry;
pub mod render;
pub mod room;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use action::Action;
pub use error::AppError;
pub use handler::router;
pub use registry::{RoomGuard, RoomRegistry};
pub use room::{Room, Subscription};
pub use session::ClientSession;
pub use types::{Key, RoomId, SenderId};
