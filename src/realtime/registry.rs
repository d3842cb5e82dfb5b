//! # Broadcast Registry
//!
//! Maps topics to the connections currently subscribed to them and fans
//! committed events out to those connections.
//!
//! Delivery is best-effort and at-most-once. Each connection has a
//! bounded outbound buffer; publish never waits on it. A connection
//! that cannot keep up (full buffer) or whose receiver is gone is
//! logged and torn down, never stalling the publisher or the other
//! subscribers. Within a topic, events arrive in publish order.
//!
//! A connection is represented by a [`ConnectionHandle`]. Dropping the
//! handle removes the connection from every topic it joined, so registry
//! entries cannot outlive the socket task that owns them.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::observability::Logger;

use super::event::BlogEvent;
use super::topic::Topic;

/// Registry tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Outbound frames buffered per connection before events are dropped
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

fn default_buffer_capacity() -> usize {
    64
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

/// Receiver half of a connection's outbound buffer
pub type FrameReceiver = mpsc::Receiver<String>;

/// Outcome of a single publish call
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Frames handed to connection buffers
    pub delivered: usize,
    /// Frames dropped because a buffer was full
    pub dropped: usize,
    /// Subscribers whose receiver was already gone
    pub stale: usize,
}

/// Topic -> connection fan-out
#[derive(Debug)]
pub struct BroadcastRegistry {
    /// Outbound sender per connection
    connections: RwLock<HashMap<String, mpsc::Sender<String>>>,

    /// Connection IDs per topic
    topics: RwLock<HashMap<Topic, HashSet<String>>>,

    /// Capacity of each connection's outbound buffer
    buffer_capacity: usize,
}

impl Default for BroadcastRegistry {
    fn default() -> Self {
        Self::new(RealtimeConfig::default())
    }
}

impl BroadcastRegistry {
    /// Create a new registry
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            topics: RwLock::new(HashMap::new()),
            buffer_capacity: config.buffer_capacity.max(1),
        }
    }

    /// Register a new connection
    ///
    /// Returns the handle that owns the registration and the receiver
    /// end of the connection's outbound buffer. Dropping the handle
    /// unsubscribes the connection from every topic.
    pub fn connect(self: &Arc<Self>) -> (ConnectionHandle, FrameReceiver) {
        let connection_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.buffer_capacity);

        if let Ok(mut connections) = self.connections.write() {
            connections.insert(connection_id.clone(), tx);
        }

        let handle = ConnectionHandle {
            registry: Arc::clone(self),
            id: connection_id,
        };

        (handle, rx)
    }

    /// Add a connection to a topic. Idempotent.
    pub fn subscribe(&self, topic: Topic, connection_id: &str) {
        if let Ok(mut topics) = self.topics.write() {
            topics
                .entry(topic)
                .or_default()
                .insert(connection_id.to_string());
        }
    }

    /// Remove a connection from a topic. No-op if absent.
    pub fn unsubscribe(&self, topic: Topic, connection_id: &str) {
        if let Ok(mut topics) = self.topics.write() {
            if let Some(subscribers) = topics.get_mut(&topic) {
                subscribers.remove(connection_id);
                if subscribers.is_empty() {
                    topics.remove(&topic);
                }
            }
        }
    }

    /// Remove a connection from every topic and drop its sender
    pub fn disconnect(&self, connection_id: &str) {
        if let Ok(mut topics) = self.topics.write() {
            for subscribers in topics.values_mut() {
                subscribers.remove(connection_id);
            }
            topics.retain(|_, subscribers| !subscribers.is_empty());
        }

        if let Ok(mut connections) = self.connections.write() {
            connections.remove(connection_id);
        }
    }

    /// Deliver an event to every connection subscribed to its topic
    ///
    /// Never blocks and never fails the caller. A delivery failure for
    /// one connection (full buffer, closed receiver) is logged, marks
    /// that connection for teardown, and leaves the other subscribers
    /// untouched. Publishing to a topic with no subscribers is a no-op.
    pub fn publish(&self, event: &BlogEvent) -> PublishReport {
        let mut report = PublishReport::default();

        let payload = match serde_json::to_string(&event.to_wire_format()) {
            Ok(payload) => payload,
            Err(e) => {
                Logger::error(
                    "EVENT_SERIALIZE_FAILED",
                    &[("kind", event.kind.as_str()), ("error", &e.to_string())],
                );
                return report;
            }
        };

        let subscriber_ids: Vec<String> = match self.topics.read() {
            Ok(topics) => topics
                .get(&event.topic)
                .map(|subscribers| subscribers.iter().cloned().collect())
                .unwrap_or_default(),
            Err(_) => return report,
        };

        let topic_name = event.topic.to_string();
        let mut teardown = Vec::new();

        {
            let connections = match self.connections.read() {
                Ok(connections) => connections,
                Err(_) => return report,
            };

            for connection_id in subscriber_ids {
                let Some(sender) = connections.get(&connection_id) else {
                    report.stale += 1;
                    teardown.push(connection_id);
                    continue;
                };

                match sender.try_send(payload.clone()) {
                    Ok(()) => report.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        report.dropped += 1;
                        Logger::warn(
                            "EVENT_DROPPED_BUFFER_FULL",
                            &[
                                ("connection", &connection_id),
                                ("kind", event.kind.as_str()),
                                ("topic", &topic_name),
                            ],
                        );
                        teardown.push(connection_id);
                    }
                    Err(TrySendError::Closed(_)) => {
                        report.stale += 1;
                        teardown.push(connection_id);
                    }
                }
            }
        }

        // Tear down failed connections once the read guards are released
        for connection_id in &teardown {
            Logger::warn(
                "CONNECTION_TORN_DOWN",
                &[("connection", connection_id), ("topic", &topic_name)],
            );
            self.disconnect(connection_id);
        }

        report
    }

    /// Number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.read().map(|c| c.len()).unwrap_or(0)
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        self.topics.read().map(|t| t.len()).unwrap_or(0)
    }

    /// Number of connections subscribed to a topic
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topics
            .read()
            .map(|t| t.get(&topic).map(HashSet::len).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Whether a connection is still registered
    pub fn is_connected(&self, connection_id: &str) -> bool {
        self.connections
            .read()
            .map(|c| c.contains_key(connection_id))
            .unwrap_or(false)
    }
}

/// Scoped registration of one connection
///
/// Owned by the socket task. Dropping it (normal close, transport error,
/// task cancellation) removes the connection from every topic exactly
/// once.
#[derive(Debug)]
pub struct ConnectionHandle {
    registry: Arc<BroadcastRegistry>,
    id: String,
}

impl ConnectionHandle {
    /// The connection's registry ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subscribe this connection to a topic
    pub fn subscribe(&self, topic: Topic) {
        self.registry.subscribe(topic, &self.id);
    }

    /// Unsubscribe this connection from a topic
    pub fn unsubscribe(&self, topic: Topic) {
        self.registry.unsubscribe(topic, &self.id);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.registry.disconnect(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::event::EventKind;
    use serde_json::json;

    fn test_registry() -> Arc<BroadcastRegistry> {
        Arc::new(BroadcastRegistry::default())
    }

    fn test_event(topic: Topic, id: u64) -> BlogEvent {
        BlogEvent::new(EventKind::PostCreated, topic, json!({ "id": id }))
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let registry = test_registry();
        let (handle, mut rx) = registry.connect();
        handle.subscribe(Topic::Global);

        let report = registry.publish(&test_event(Topic::Global, 1));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped, 0);

        let frame = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["type"], "post_created");
        assert_eq!(parsed["data"]["id"], 1);
    }

    #[tokio::test]
    async fn test_subscribe_is_idempotent() {
        let registry = test_registry();
        let (handle, mut rx) = registry.connect();
        handle.subscribe(Topic::Global);
        handle.subscribe(Topic::Global);

        let report = registry.publish(&test_event(Topic::Global, 1));
        assert_eq!(report.delivered, 1);

        rx.recv().await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_without_subscribe_is_noop() {
        let registry = test_registry();
        let (handle, _rx) = registry.connect();

        registry.unsubscribe(Topic::Global, handle.id());
        assert_eq!(registry.subscriber_count(Topic::Global), 0);
    }

    #[tokio::test]
    async fn test_publish_empty_topic_is_noop() {
        let registry = test_registry();

        let report = registry.publish(&test_event(Topic::Post(7), 1));
        assert_eq!(report, PublishReport::default());
    }

    #[tokio::test]
    async fn test_drop_handle_clears_every_topic() {
        let registry = test_registry();
        let (handle, _rx) = registry.connect();
        let id = handle.id().to_string();

        handle.subscribe(Topic::Global);
        handle.subscribe(Topic::Post(1));
        handle.subscribe(Topic::Post(2));
        assert_eq!(registry.connection_count(), 1);
        assert_eq!(registry.topic_count(), 3);

        drop(handle);

        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.topic_count(), 0);
        assert!(!registry.is_connected(&id));
    }

    #[tokio::test]
    async fn test_full_buffer_drops_frame_and_tears_down() {
        let registry = Arc::new(BroadcastRegistry::new(RealtimeConfig {
            buffer_capacity: 2,
        }));
        let (handle, _rx) = registry.connect();
        handle.subscribe(Topic::Global);

        // Nothing drains _rx, so the third frame overflows the buffer
        let mut delivered = 0;
        let mut dropped = 0;
        for i in 0..4 {
            let report = registry.publish(&test_event(Topic::Global, i));
            delivered += report.delivered;
            dropped += report.dropped;
        }

        assert_eq!(delivered, 2);
        assert_eq!(dropped, 1);
        // The lagging connection was torn down, not retried
        assert!(!registry.is_connected(handle.id()));
        assert_eq!(registry.subscriber_count(Topic::Global), 0);
    }

    #[tokio::test]
    async fn test_closed_receiver_is_swept() {
        let registry = test_registry();
        let (handle, rx) = registry.connect();
        handle.subscribe(Topic::Global);
        drop(rx);

        let report = registry.publish(&test_event(Topic::Global, 1));
        assert_eq!(report.delivered, 0);
        assert_eq!(report.stale, 1);
        assert_eq!(registry.subscriber_count(Topic::Global), 0);
        assert!(!registry.is_connected(handle.id()));
    }

    #[tokio::test]
    async fn test_failure_does_not_block_other_subscribers() {
        let registry = test_registry();

        let (dead, dead_rx) = registry.connect();
        dead.subscribe(Topic::Global);
        drop(dead_rx);

        let (live, mut live_rx) = registry.connect();
        live.subscribe(Topic::Global);

        let report = registry.publish(&test_event(Topic::Global, 1));
        assert_eq!(report.delivered, 1);
        assert_eq!(report.stale, 1);

        assert!(live_rx.recv().await.is_some());
    }
}
