//! Client session
//!
//! One session per open viewing connection. The session subscribes to its
//! room, writes the document shell once, then loops on the subscription,
//! reacting to each action by appending fragments to its own response body.
//! Cross-session visibility happens only through published `Message`
//! actions - sessions never write to each other's streams.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::action::Action;
use crate::registry::RoomGuard;
use crate::render;
use crate::room::Subscription;
use crate::types::{Key, SenderId};

/// One participant's viewing connection
///
/// Owns its in-progress message buffer, its room reference, and its
/// subscription. The buffer accumulates key tags until a send commits it
/// as a `Message`.
pub struct ClientSession {
    id: SenderId,
    room: RoomGuard,
    actions: Subscription,
    buffer: String,
    out: mpsc::Sender<String>,
}

impl ClientSession {
    /// Create a session with a fresh id, subscribed to the given room
    pub fn new(room: RoomGuard, out: mpsc::Sender<String>) -> Self {
        let actions = room.subscribe();
        Self {
            id: SenderId::new(),
            room,
            actions,
            buffer: String::new(),
            out,
        }
    }

    pub fn id(&self) -> SenderId {
        self.id
    }

    /// Run the session until the cancellation token fires
    ///
    /// Cancellation is the normal way out: the loop exits cleanly, and
    /// dropping the session deregisters the subscription and releases the
    /// room reference.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("session {} streaming room {}", self.id, self.room.id());

        self.write(render::document_shell(self.room.id(), self.id))
            .await;

        loop {
            match self.actions.next_action(&cancel).await {
                Ok(action) => self.handle(action).await,
                Err(_) => break,
            }
        }

        info!("session {} closed", self.id);
    }

    /// Dispatch one delivered action
    ///
    /// Key and send actions only matter when this session sent them; a
    /// committed `Message` renders on every other session's stream (the
    /// sender already rendered its own line when the send went down).
    async fn handle(&mut self, action: Action) {
        match action {
            Action::KeyDown { sender, key } if sender == self.id => self.on_key_down(key).await,
            Action::KeyUp { sender, key } if sender == self.id => self.on_key_up(key).await,
            Action::SendDown { sender } if sender == self.id => self.on_send_down().await,
            Action::SendUp { sender } if sender == self.id => self.on_send_up().await,
            Action::Message { sender, text } if sender != self.id => {
                self.write(render::message_line(sender, &text)).await;
            }
            other => {
                debug!("session {}: ignoring {:?}", self.id, other);
            }
        }
    }

    async fn on_key_down(&mut self, key: Key) {
        self.buffer.push_str(key.as_str());
        let mut fragment = render::key_up_armed(self.room.id(), self.id, key);
        fragment.push_str(&render::current_line(&self.buffer));
        self.write(fragment).await;
    }

    async fn on_key_up(&mut self, key: Key) {
        self.write(render::key_down_armed(self.room.id(), self.id, key))
            .await;
    }

    async fn on_send_down(&mut self) {
        if self.buffer.is_empty() {
            self.write(render::send_up_armed(self.room.id(), self.id))
                .await;
            return;
        }

        let text = std::mem::take(&mut self.buffer);
        let mut fragment = render::send_up_armed(self.room.id(), self.id);
        fragment.push_str(&render::message_line(self.id, &text));
        fragment.push_str(&render::current_line(""));
        self.write(fragment).await;

        self.room.publish(Action::Message {
            sender: self.id,
            text,
        });
    }

    async fn on_send_up(&mut self) {
        self.write(render::send_down_armed(self.room.id(), self.id))
            .await;
    }

    async fn write(&self, fragment: String) {
        if self.out.send(fragment).await.is_err() {
            debug!("session {}: sink closed, dropping fragment", self.id);
        }
    }
}
