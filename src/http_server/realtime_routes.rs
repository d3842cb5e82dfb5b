//! Realtime WebSocket Routes
//!
//! Two feeds: the global blog feed and a per-post feed. A connection is
//! a pure event sink; inbound application messages are ignored and only
//! transport pings are answered. The connection's registry handle is
//! owned by the relay task, so dropping out of the loop for any reason
//! (client close, transport error, shutdown) unsubscribes it from every
//! topic.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;

use crate::observability::Logger;
use crate::realtime::{BroadcastRegistry, Topic};

use super::ApiState;

/// Realtime routes with shared state
pub fn realtime_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/blog", get(global_feed_handler))
        .route("/blog/post/:post_id", get(post_feed_handler))
        .route("/stats", get(realtime_stats_handler))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct RealtimeStatsResponse {
    pub active_connections: usize,
    pub active_topics: usize,
}

// ==================
// Handlers
// ==================

/// Upgrade onto the global feed
async fn global_feed_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ApiState>>,
) -> impl IntoResponse {
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| relay(socket, registry, Topic::Global))
}

/// Upgrade onto a single post's feed
async fn post_feed_handler(
    ws: WebSocketUpgrade,
    Path(post_id): Path<u64>,
    State(state): State<Arc<ApiState>>,
) -> impl IntoResponse {
    let registry = Arc::clone(&state.registry);
    ws.on_upgrade(move |socket| relay(socket, registry, Topic::Post(post_id)))
}

/// Connection and topic counts
async fn realtime_stats_handler(
    State(state): State<Arc<ApiState>>,
) -> Json<RealtimeStatsResponse> {
    Json(RealtimeStatsResponse {
        active_connections: state.registry.connection_count(),
        active_topics: state.registry.topic_count(),
    })
}

/// Pump registry frames out to one socket until it closes
async fn relay(socket: WebSocket, registry: Arc<BroadcastRegistry>, topic: Topic) {
    let (handle, mut frames) = registry.connect();
    handle.subscribe(topic);

    let topic_name = topic.to_string();
    Logger::info(
        "WS_CONNECTED",
        &[("connection", handle.id()), ("topic", &topic_name)],
    );

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            frame = frames.recv() => {
                match frame {
                    Some(text) => {
                        if sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    // Registry dropped our sender (swept as stale)
                    None => break,
                }
            }

            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    // Sink only: inbound application messages are ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    Logger::info(
        "WS_CLOSED",
        &[("connection", handle.id()), ("topic", &topic_name)],
    );
    // `handle` drops here and unsubscribes the connection everywhere
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_routes_build() {
        let state = Arc::new(ApiState::new(&AppConfig::default()));
        let _router = realtime_routes(state);
    }
}
