//! Outbound fan-out.
//!
//! A `Topic` is a user, room, or game; connections subscribe to topics and
//! receive every event sent to them in FIFO order. Send failures are logged
//! and never fail the originating event.

pub mod channel;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::protocol::{GameId, RoomId, ServerEvent, UserId};

pub use channel::ChannelBroadcaster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Topic {
    User(UserId),
    Room(RoomId),
    Game(GameId),
}

pub type ConnectionId = Uuid;

/// A subscriber endpoint. The receiving half stays with the transport;
/// the broadcaster only keeps the sending half per subscribed topic.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub(crate) sender: UnboundedSender<ServerEvent>,
}

/// Create a connection and the receiver the transport reads from.
pub fn connection() -> (Connection, UnboundedReceiver<ServerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Connection {
            id: Uuid::new_v4(),
            sender: tx,
        },
        rx,
    )
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Deliver an event to every connection subscribed to the topic.
    async fn send(&self, topic: Topic, event: ServerEvent);
    fn subscribe(&self, topic: Topic, connection: &Connection);
    fn unsubscribe(&self, topic: Topic, connection_id: ConnectionId);
}
