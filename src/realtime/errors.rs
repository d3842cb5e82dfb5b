//! # Real-Time Errors
//!
//! Error types for the real-time module.

use thiserror::Error;

/// Result type for real-time operations
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// Real-time errors
#[derive(Debug, Clone, Error)]
pub enum RealtimeError {
    /// Topic string did not parse
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// Event could not be serialized
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RealtimeError::InvalidTopic("posts:xyz".to_string());
        assert_eq!(err.to_string(), "Invalid topic: posts:xyz");
    }
}
