//! End-to-end WebSocket delivery
//!
//! Boots the real axum server on an ephemeral port, connects with a
//! WebSocket client, and drives the write path through the services
//! behind the same state the server uses.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use quillbase::auth::access::AccessContext;
use quillbase::auth::user::{Role, SignupRequest};
use quillbase::blog::post::PostStatus;
use quillbase::blog::service::{CreateCommentRequest, CreatePostRequest};
use quillbase::config::AppConfig;
use quillbase::http_server::{ApiState, HttpServer, HttpServerConfig};
use quillbase::realtime::Topic;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server(state: Arc<ApiState>) -> SocketAddr {
    let server = HttpServer::with_state(HttpServerConfig::default(), state);
    let router = server.into_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

fn author_ctx(state: &ApiState, username: &str, role: Role) -> AccessContext {
    let (user, _) = state
        .auth
        .signup(SignupRequest {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: "password123".to_string(),
            role: Some(role),
            bio: None,
        })
        .unwrap();
    AccessContext::authenticated(&user)
}

/// The upgrade completes asynchronously; wait until the relay task has
/// registered its subscription.
async fn wait_for_subscriber(state: &ApiState, topic: Topic, count: usize) {
    timeout(WAIT, async {
        while state.registry.subscriber_count(topic) < count {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscription was never registered");
}

async fn next_json<S>(read: &mut S) -> serde_json::Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let msg = timeout(WAIT, read.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("transport error");

        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn global_feed_delivers_post_created() {
    let state = Arc::new(ApiState::new(&AppConfig::default()));
    let addr = start_server(Arc::clone(&state)).await;
    let ctx = author_ctx(&state, "alice", Role::Author);

    let (ws, _) = connect_async(format!("ws://{}/ws/blog", addr)).await.unwrap();
    let (_write, mut read) = ws.split();
    wait_for_subscriber(&state, Topic::Global, 1).await;

    let view = state
        .blog
        .create_post(
            &ctx,
            CreatePostRequest {
                title: "Socket test".to_string(),
                content: "Body".to_string(),
                excerpt: None,
                status: Some(PostStatus::Published),
                category_id: None,
                featured_image: None,
                tags: None,
            },
        )
        .unwrap();

    let frame = next_json(&mut read).await;
    assert_eq!(frame["type"], "post_created");
    assert_eq!(frame["data"]["id"], view.id);
    assert_eq!(frame["data"]["author"], "alice");
}

#[tokio::test]
async fn post_feed_delivers_comment_added_only_for_its_post() {
    let state = Arc::new(ApiState::new(&AppConfig::default()));
    let addr = start_server(Arc::clone(&state)).await;
    let author = author_ctx(&state, "alice", Role::Author);
    let reader = author_ctx(&state, "bob", Role::Reader);

    let first = state
        .blog
        .create_post(
            &author,
            CreatePostRequest {
                title: "First".to_string(),
                content: "Body".to_string(),
                excerpt: None,
                status: Some(PostStatus::Published),
                category_id: None,
                featured_image: None,
                tags: None,
            },
        )
        .unwrap();
    let second = state
        .blog
        .create_post(
            &author,
            CreatePostRequest {
                title: "Second".to_string(),
                content: "Body".to_string(),
                excerpt: None,
                status: Some(PostStatus::Published),
                category_id: None,
                featured_image: None,
                tags: None,
            },
        )
        .unwrap();

    let (first_ws, _) = connect_async(format!("ws://{}/ws/blog/post/{}", addr, first.id))
        .await
        .unwrap();
    let (_first_write, mut first_read) = first_ws.split();
    wait_for_subscriber(&state, Topic::Post(first.id), 1).await;

    let (second_ws, _) = connect_async(format!("ws://{}/ws/blog/post/{}", addr, second.id))
        .await
        .unwrap();
    let (_second_write, mut second_read) = second_ws.split();
    wait_for_subscriber(&state, Topic::Post(second.id), 1).await;

    state
        .blog
        .add_comment(
            &reader,
            first.id,
            CreateCommentRequest {
                content: "Only here".to_string(),
            },
        )
        .unwrap();

    let frame = next_json(&mut first_read).await;
    assert_eq!(frame["type"], "comment_added");
    assert_eq!(frame["data"]["post_id"], first.id);
    assert_eq!(frame["data"]["content"], "Only here");

    // The other post's feed stays silent
    let silence = timeout(Duration::from_millis(300), second_read.next()).await;
    assert!(silence.is_err(), "unrelated feed received a frame");
}

#[tokio::test]
async fn closing_the_socket_releases_the_registration() {
    let state = Arc::new(ApiState::new(&AppConfig::default()));
    let addr = start_server(Arc::clone(&state)).await;

    let (ws, _) = connect_async(format!("ws://{}/ws/blog", addr)).await.unwrap();
    let (mut write, _read) = ws.split();
    wait_for_subscriber(&state, Topic::Global, 1).await;
    assert_eq!(state.registry.connection_count(), 1);

    write.send(Message::Close(None)).await.unwrap();

    timeout(WAIT, async {
        while state.registry.connection_count() > 0 {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("registration leaked after close");

    assert_eq!(state.registry.subscriber_count(Topic::Global), 0);
    assert_eq!(state.registry.topic_count(), 0);
}
