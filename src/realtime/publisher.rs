//! # Event Publisher
//!
//! The bridge between the REST write path and the broadcast registry.
//! Called after a domain write commits; delivery problems are logged and
//! swallowed so they can never fail the originating request.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::observability::Logger;

use super::event::BlogEvent;
use super::registry::BroadcastRegistry;

/// Fire-and-forget publisher handed to the write path
#[derive(Clone)]
pub struct EventPublisher {
    registry: Arc<BroadcastRegistry>,
}

impl EventPublisher {
    /// Create a publisher over an explicitly owned registry
    pub fn new(registry: Arc<BroadcastRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this publisher fans out through
    pub fn registry(&self) -> &Arc<BroadcastRegistry> {
        &self.registry
    }

    /// Publish an event. Infallible from the caller's perspective.
    pub fn publish(&self, event: BlogEvent) {
        let topic = event.topic.to_string();
        let report = self.registry.publish(&event);

        Logger::info(
            "EVENT_PUBLISHED",
            &[
                ("kind", event.kind.as_str()),
                ("topic", &topic),
                ("delivered", &report.delivered.to_string()),
                ("dropped", &report.dropped.to_string()),
                ("stale", &report.stale.to_string()),
            ],
        );
    }

    /// A post was created with published status
    pub fn post_created(&self, id: u64, title: &str, author: &str, created_at: DateTime<Utc>) {
        self.publish(BlogEvent::post_created(id, title, author, created_at));
    }

    /// A draft transitioned to published
    pub fn post_published(
        &self,
        id: u64,
        title: &str,
        author: &str,
        published_at: DateTime<Utc>,
    ) {
        self.publish(BlogEvent::post_published(id, title, author, published_at));
    }

    /// A comment landed on a post
    pub fn comment_added(
        &self,
        id: u64,
        post_id: u64,
        author: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) {
        self.publish(BlogEvent::comment_added(
            id, post_id, author, content, created_at,
        ));
    }
}
