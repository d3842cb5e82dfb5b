//! # Observability
//!
//! Structured logging for QuillBase. One log line = one event, as JSON,
//! with deterministic field ordering.

pub mod logger;

pub use logger::{Logger, Severity};
