//! # Real-Time Events
//!
//! Immutable notifications describing a committed domain write. Each
//! event carries a snapshot of the fields clients need, so delivery
//! never goes back to storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::topic::Topic;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A post was created already published
    PostCreated,
    /// A draft transitioned to published
    PostPublished,
    /// A comment landed on a post
    CommentAdded,
}

impl EventKind {
    /// Returns the wire-format tag
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PostCreated => "post_created",
            EventKind::PostPublished => "post_published",
            EventKind::CommentAdded => "comment_added",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A broadcast event
#[derive(Debug, Clone)]
pub struct BlogEvent {
    /// Event kind
    pub kind: EventKind,

    /// Topic the event is delivered on
    pub topic: Topic,

    /// Snapshot payload
    pub data: Value,
}

impl BlogEvent {
    /// Create an event with an arbitrary payload
    pub fn new(kind: EventKind, topic: Topic, data: Value) -> Self {
        Self { kind, topic, data }
    }

    /// A post was created with published status
    pub fn post_created(
        id: u64,
        title: &str,
        author: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            EventKind::PostCreated,
            Topic::Global,
            json!({
                "id": id,
                "title": title,
                "author": author,
                "created_at": created_at.to_rfc3339(),
            }),
        )
    }

    /// A draft was published
    pub fn post_published(
        id: u64,
        title: &str,
        author: &str,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            EventKind::PostPublished,
            Topic::Global,
            json!({
                "id": id,
                "title": title,
                "author": author,
                "published_at": published_at.to_rfc3339(),
            }),
        )
    }

    /// A comment landed on a post
    pub fn comment_added(
        id: u64,
        post_id: u64,
        author: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            EventKind::CommentAdded,
            Topic::Post(post_id),
            json!({
                "id": id,
                "post_id": post_id,
                "author": author,
                "content": content,
                "created_at": created_at.to_rfc3339(),
            }),
        )
    }

    /// Serialize to the client wire shape
    pub fn to_wire_format(&self) -> Value {
        json!({
            "type": self.kind.as_str(),
            "data": self.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_tags() {
        assert_eq!(EventKind::PostCreated.as_str(), "post_created");
        assert_eq!(EventKind::PostPublished.as_str(), "post_published");
        assert_eq!(EventKind::CommentAdded.as_str(), "comment_added");
    }

    #[test]
    fn test_post_created_event() {
        let now = Utc::now();
        let event = BlogEvent::post_created(1, "Hello", "alice", now);

        assert_eq!(event.kind, EventKind::PostCreated);
        assert_eq!(event.topic, Topic::Global);
        assert_eq!(event.data["id"], 1);
        assert_eq!(event.data["title"], "Hello");
        assert_eq!(event.data["author"], "alice");
    }

    #[test]
    fn test_comment_added_targets_post_topic() {
        let event = BlogEvent::comment_added(7, 42, "bob", "Nice post!", Utc::now());

        assert_eq!(event.topic, Topic::Post(42));
        assert_eq!(event.data["post_id"], 42);
        assert_eq!(event.data["content"], "Nice post!");
    }

    #[test]
    fn test_wire_format() {
        let event = BlogEvent::new(
            EventKind::PostCreated,
            Topic::Global,
            json!({"id": 1, "title": "Hi"}),
        );

        let wire = event.to_wire_format();
        assert_eq!(wire["type"], "post_created");
        assert_eq!(wire["data"]["id"], 1);
        assert_eq!(wire["data"]["title"], "Hi");
    }
}
