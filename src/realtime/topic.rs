//! # Topics
//!
//! A topic is a named broadcast channel: the global blog feed, or one
//! channel per post for comment activity.

use std::fmt;
use std::str::FromStr;

use super::errors::RealtimeError;

/// A broadcast channel name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The site-wide feed (new and freshly published posts)
    Global,

    /// Activity on a single post (comments)
    Post(u64),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Global => write!(f, "global"),
            Topic::Post(id) => write!(f, "post:{}", id),
        }
    }
}

impl FromStr for Topic {
    type Err = RealtimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "global" {
            return Ok(Topic::Global);
        }

        if let Some(id) = s.strip_prefix("post:") {
            return id
                .parse::<u64>()
                .map(Topic::Post)
                .map_err(|_| RealtimeError::InvalidTopic(s.to_string()));
        }

        Err(RealtimeError::InvalidTopic(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_display() {
        assert_eq!(Topic::Global.to_string(), "global");
        assert_eq!(Topic::Post(42).to_string(), "post:42");
    }

    #[test]
    fn test_topic_parse() {
        assert_eq!("global".parse::<Topic>().unwrap(), Topic::Global);
        assert_eq!("post:42".parse::<Topic>().unwrap(), Topic::Post(42));
    }

    #[test]
    fn test_topic_parse_rejects_garbage() {
        assert!("".parse::<Topic>().is_err());
        assert!("post:".parse::<Topic>().is_err());
        assert!("post:abc".parse::<Topic>().is_err());
        assert!("comments:1".parse::<Topic>().is_err());
    }

    #[test]
    fn test_topic_round_trip() {
        for topic in [Topic::Global, Topic::Post(0), Topic::Post(42)] {
            assert_eq!(topic.to_string().parse::<Topic>().unwrap(), topic);
        }
    }
}
