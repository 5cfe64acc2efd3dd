//! Room broadcast bus
//!
//! A room fans every published action out to the sessions currently
//! subscribed to it and drops the action if nobody is. There is no history
//! or replay - a participant who joins (or re-joins) later simply misses
//! what happened while they were away.
//!
//! Subscriptions are an explicit per-room map of per-subscriber channels.
//! A subscription lives as long as its session: delivery does not race the
//! session's trip back into `next_action`, and dropping the subscription
//! deregisters it so a later publish never touches a dead entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::action::Action;
use crate::error::AppError;
use crate::types::RoomId;

/// Reference-count state for one room
///
/// `closed` marks a room whose count reached zero and whose registry entry
/// is being (or has been) unlinked, so a racing lookup can detect the
/// tombstone instead of resurrecting it.
#[derive(Debug)]
pub(crate) struct Membership {
    pub(crate) count: usize,
    pub(crate) closed: bool,
}

/// A single broadcast domain
///
/// Owns its subscriber set and reference count exclusively. Sessions
/// interact with it only through `publish` and their `Subscription`; the
/// registry manages the membership count through `RoomGuard`.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<Action>>>,
    next_subscriber: AtomicU64,
    pub(crate) membership: Mutex<Membership>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            subscribers: Mutex::new(HashMap::new()),
            next_subscriber: AtomicU64::new(0),
            membership: Mutex::new(Membership {
                count: 0,
                closed: false,
            }),
        }
    }

    /// The room's identifier
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Deliver an action to every currently-subscribed session
    ///
    /// Non-blocking and fire-and-forget: each subscriber gets one clone,
    /// and an action published with no subscribers is dropped silently.
    pub fn publish(&self, action: Action) {
        let subscribers = self.subscribers.lock().unwrap();

        if subscribers.is_empty() {
            debug!("room {}: dropped {:?} (no subscribers)", self.id, action);
            return;
        }

        for tx in subscribers.values() {
            // Fails only for a subscription mid-teardown; it no longer
            // cares.
            let _ = tx.send(action.clone());
        }
    }

    /// Register a new subscriber
    pub fn subscribe(self: Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().unwrap().insert(id, tx);
        Subscription { room: self, id, rx }
    }

    /// Number of sessions currently holding a reference to this room
    pub fn member_count(&self) -> usize {
        self.membership.lock().unwrap().count
    }

    /// Number of sessions currently subscribed to this room
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}

/// One session's registration in a room's subscriber set
///
/// Receives every action published after the subscription was created, in
/// publish order. Dropping it removes the registration from the room.
#[derive(Debug)]
pub struct Subscription {
    room: Arc<Room>,
    id: u64,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl Subscription {
    /// Block until the next action arrives or the token fires
    ///
    /// Exactly one of the two outcomes occurs: `Ok` with the next action in
    /// publish order, or `Err(AppError::Cancelled)` once the connection's
    /// cancellation token fires.
    pub async fn next_action(&mut self, cancel: &CancellationToken) -> Result<Action, AppError> {
        tokio::select! {
            action = self.rx.recv() => action.ok_or(AppError::Cancelled),
            _ = cancel.cancelled() => Err(AppError::Cancelled),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.room.subscribers.lock().unwrap().remove(&self.id);
    }
}
