//! quillbase - A self-hostable blogging backend with real-time updates
//!
//! REST API for users, posts, categories, and comments, plus WebSocket
//! topics that receive an event whenever a post goes live or a comment
//! lands.

pub mod auth;
pub mod blog;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod realtime;
