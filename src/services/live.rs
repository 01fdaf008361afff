// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process live update hub.
//!
//! Each connected user gets a broadcast channel keyed by user ID. Services
//! publish events after their writes succeed; WebSocket connections relay
//! them to clients. A lagging subscriber loses the oldest events instead of
//! blocking publishers.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::models::{Message, Notification};

/// Events buffered per user before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Event pushed to a user's live connections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    MessageCreated { message: Message },
    Notification { notification: Notification },
}

/// Per-user fan-out of [`LiveEvent`]s.
#[derive(Clone, Default)]
pub struct LiveHub {
    channels: Arc<DashMap<String, broadcast::Sender<LiveEvent>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events addressed to `user_id`.
    pub fn subscribe(&self, user_id: &str) -> broadcast::Receiver<LiveEvent> {
        self.channels
            .entry(user_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to `user_id`. Returns the number of live receivers.
    pub fn publish(&self, user_id: &str, event: LiveEvent) -> usize {
        let delivered = self
            .channels
            .get(user_id)
            .map(|tx| tx.send(event).unwrap_or(0));

        if delivered == Some(0) {
            // Every connection for this user has gone away.
            self.channels
                .remove_if(user_id, |_, tx| tx.receiver_count() == 0);
        }

        delivered.unwrap_or(0)
    }

    /// Drop the channel for a user once their last connection closes.
    pub fn release(&self, user_id: &str) {
        self.channels
            .remove_if(user_id, |_, tx| tx.receiver_count() == 0);
    }

    /// Number of users with an open channel.
    pub fn connected_users(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationType;

    fn notification(user_id: &str) -> LiveEvent {
        LiveEvent::Notification {
            notification: Notification::new(
                "n1".to_string(),
                user_id,
                NotificationType::System,
                "Hello",
                "Welcome aboard",
                "2024-01-01T00:00:00.000Z",
            ),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let hub = LiveHub::new();
        let mut rx = hub.subscribe("alice");

        assert_eq!(hub.publish("alice", notification("alice")), 1);

        match rx.recv().await.unwrap() {
            LiveEvent::Notification { notification } => {
                assert_eq!(notification.user_id, "alice")
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscriber_is_dropped() {
        let hub = LiveHub::new();
        assert_eq!(hub.publish("nobody", notification("nobody")), 0);
        assert_eq!(hub.connected_users(), 0);
    }

    #[tokio::test]
    async fn test_closed_channels_are_pruned() {
        let hub = LiveHub::new();
        let rx = hub.subscribe("bob");
        assert_eq!(hub.connected_users(), 1);

        drop(rx);
        assert_eq!(hub.publish("bob", notification("bob")), 0);
        assert_eq!(hub.connected_users(), 0);
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(notification("alice")).unwrap();
        assert_eq!(json["type"], "notification");
        assert_eq!(json["notification"]["type"], "System");
    }
}
