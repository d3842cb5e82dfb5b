//! Broadcast registry invariants
//!
//! A connection receives exactly the events published to its topics
//! while it was subscribed, in publish order; teardown never leaks
//! registry entries; a misbehaving subscriber never affects the rest.

use std::sync::Arc;

use serde_json::json;

use quillbase::realtime::{
    BlogEvent, BroadcastRegistry, EventKind, PublishReport, RealtimeConfig, Topic,
};

fn registry() -> Arc<BroadcastRegistry> {
    Arc::new(BroadcastRegistry::default())
}

fn event(topic: Topic, id: u64) -> BlogEvent {
    BlogEvent::new(EventKind::PostCreated, topic, json!({ "id": id }))
}

#[tokio::test]
async fn events_arrive_in_publish_order() {
    let registry = registry();
    let (handle, mut rx) = registry.connect();
    handle.subscribe(Topic::Global);

    for i in 0..10 {
        registry.publish(&event(Topic::Global, i));
    }

    for i in 0..10 {
        let frame = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["data"]["id"], i);
    }
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn subscriber_receives_exact_wire_shape() {
    let registry = registry();
    let (handle, mut rx) = registry.connect();
    handle.subscribe(Topic::Global);

    let event = BlogEvent::new(
        EventKind::PostCreated,
        Topic::Global,
        json!({ "id": 1, "title": "Hi" }),
    );
    registry.publish(&event);

    let frame = rx.recv().await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(
        parsed,
        json!({ "type": "post_created", "data": { "id": 1, "title": "Hi" } })
    );

    // Exactly once
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn events_outside_subscription_window_are_missed() {
    let registry = registry();
    let (handle, mut rx) = registry.connect();

    // Before subscribing: not delivered
    registry.publish(&event(Topic::Global, 1));

    handle.subscribe(Topic::Global);
    registry.publish(&event(Topic::Global, 2));

    handle.unsubscribe(Topic::Global);
    registry.publish(&event(Topic::Global, 3));

    let frame = rx.recv().await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(parsed["data"]["id"], 2);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unsubscribe_without_subscribe_is_a_noop() {
    let registry = registry();
    let (handle, _rx) = registry.connect();

    registry.unsubscribe(Topic::Global, handle.id());
    registry.unsubscribe(Topic::Post(5), "never-registered");

    assert_eq!(registry.topic_count(), 0);
    assert_eq!(registry.connection_count(), 1);
}

#[tokio::test]
async fn publish_to_empty_topic_is_a_noop() {
    let registry = registry();

    let report = registry.publish(&event(Topic::Global, 1));
    assert_eq!(report, PublishReport::default());
}

#[tokio::test]
async fn post_topics_are_isolated() {
    let registry = registry();
    let (handle, mut rx) = registry.connect();
    handle.subscribe(Topic::Post(42));

    registry.publish(&event(Topic::Post(43), 1));

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn dropping_the_handle_clears_every_topic() {
    let registry = registry();
    let (handle, _rx) = registry.connect();
    let id = handle.id().to_string();

    handle.subscribe(Topic::Global);
    handle.subscribe(Topic::Post(1));
    handle.subscribe(Topic::Post(2));

    drop(handle);

    assert!(!registry.is_connected(&id));
    assert_eq!(registry.connection_count(), 0);
    assert_eq!(registry.topic_count(), 0);
    assert_eq!(registry.subscriber_count(Topic::Global), 0);
}

#[tokio::test]
async fn slow_subscriber_never_stalls_the_rest() {
    let registry = Arc::new(BroadcastRegistry::new(RealtimeConfig {
        buffer_capacity: 4,
    }));

    let (slow, _slow_rx) = registry.connect();
    slow.subscribe(Topic::Global);

    let (healthy, mut healthy_rx) = registry.connect();
    healthy.subscribe(Topic::Global);

    for i in 0..8 {
        registry.publish(&event(Topic::Global, i));
    }

    // The healthy subscriber saw everything in order
    for i in 0..8 {
        let frame = healthy_rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(parsed["data"]["id"], i);
    }

    // The slow subscriber overflowed its buffer and was torn down
    assert!(!registry.is_connected(slow.id()));
    assert_eq!(registry.subscriber_count(Topic::Global), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_close_and_publish_stays_consistent() {
    let registry = registry();

    let mut handles = Vec::new();
    let mut receivers = Vec::new();
    for _ in 0..8 {
        let (handle, rx) = registry.connect();
        handle.subscribe(Topic::Global);
        handles.push(handle);
        receivers.push(rx);
    }

    let publisher = {
        let registry = Arc::clone(&registry);
        tokio::spawn(async move {
            for i in 0..200 {
                registry.publish(&event(Topic::Global, i));
                tokio::task::yield_now().await;
            }
        })
    };

    let closer = tokio::spawn(async move {
        for handle in handles {
            drop(handle);
            tokio::task::yield_now().await;
        }
    });

    publisher.await.unwrap();
    closer.await.unwrap();

    // Every registration was released despite racing publishes
    assert_eq!(registry.connection_count(), 0);
    assert_eq!(registry.topic_count(), 0);

    // Each receiver saw a prefix of the stream: in order, no duplicates
    for mut rx in receivers {
        let mut last_seen: i64 = -1;
        while let Ok(frame) = rx.try_recv() {
            let parsed: serde_json::Value = serde_json::from_str(&frame).unwrap();
            let id = parsed["data"]["id"].as_i64().unwrap();
            assert!(id > last_seen, "duplicate or reordered event");
            last_seen = id;
        }
    }
}
