//! In-process broadcaster over unbounded channels.
//!
//! Per-connection FIFO comes from the channel itself; ordering across
//! connections is not guaranteed. Dead connections are pruned on send.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{info, warn};

use super::{Broadcaster, Connection, ConnectionId, Topic};
use crate::protocol::ServerEvent;

#[derive(Debug, Default)]
pub struct ChannelBroadcaster {
    topics: DashMap<Topic, Vec<Connection>>,
    active_subscriptions: AtomicUsize,
}

impl ChannelBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active_subscriptions.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Broadcaster for ChannelBroadcaster {
    async fn send(&self, topic: Topic, event: ServerEvent) {
        let Some(mut entry) = self.topics.get_mut(&topic) else {
            return;
        };
        let before = entry.len();
        entry.retain(|conn| {
            if conn.sender.send(event.clone()).is_err() {
                warn!(topic = ?topic, connection = %conn.id, "dropping closed connection");
                return false;
            }
            true
        });
        let dropped = before - entry.len();
        if dropped > 0 {
            self.active_subscriptions.fetch_sub(dropped, Ordering::Relaxed);
        }
    }

    fn subscribe(&self, topic: Topic, connection: &Connection) {
        let mut entry = self.topics.entry(topic).or_default();
        if entry.iter().any(|c| c.id == connection.id) {
            return;
        }
        entry.push(connection.clone());
        let active = self.active_subscriptions.fetch_add(1, Ordering::Relaxed) + 1;
        info!(topic = ?topic, connection = %connection.id, active, "subscribed");
    }

    fn unsubscribe(&self, topic: Topic, connection_id: ConnectionId) {
        let now_empty = match self.topics.get_mut(&topic) {
            Some(mut entry) => {
                let before = entry.len();
                entry.retain(|c| c.id != connection_id);
                if entry.len() < before {
                    self.active_subscriptions.fetch_sub(1, Ordering::Relaxed);
                }
                entry.is_empty()
            }
            None => false,
        };
        // Guard dropped above; safe to remove the empty topic entry.
        if now_empty {
            self.topics.remove(&topic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::connection;
    use uuid::Uuid;

    #[tokio::test]
    async fn delivers_in_fifo_order_per_connection() {
        let broadcaster = ChannelBroadcaster::new();
        let (conn, mut rx) = connection();
        let topic = Topic::Game(Uuid::new_v4());
        broadcaster.subscribe(topic, &conn);

        for round in 1..=3 {
            broadcaster
                .send(
                    topic,
                    ServerEvent::RoundStarted {
                        game_id: Uuid::nil(),
                        round,
                        dealer: 0,
                        first_bidder: 1,
                    },
                )
                .await;
        }
        for expected in 1..=3 {
            match rx.try_recv().unwrap() {
                ServerEvent::RoundStarted { round, .. } => assert_eq!(round, expected),
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn send_to_unknown_topic_is_a_noop() {
        let broadcaster = ChannelBroadcaster::new();
        broadcaster
            .send(Topic::User(Uuid::new_v4()), ServerEvent::ServerShutdown)
            .await;
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let broadcaster = ChannelBroadcaster::new();
        let (conn, mut rx) = connection();
        let topic = Topic::Room(Uuid::new_v4());
        broadcaster.subscribe(topic, &conn);
        broadcaster.unsubscribe(topic, conn.id);
        assert_eq!(broadcaster.active_subscriptions(), 0);

        broadcaster.send(topic, ServerEvent::ServerShutdown).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dead_connections_are_pruned() {
        let broadcaster = ChannelBroadcaster::new();
        let (conn, rx) = connection();
        let topic = Topic::Room(Uuid::new_v4());
        broadcaster.subscribe(topic, &conn);
        drop(rx);

        broadcaster.send(topic, ServerEvent::ServerShutdown).await;
        assert_eq!(broadcaster.active_subscriptions(), 0);
    }
}
