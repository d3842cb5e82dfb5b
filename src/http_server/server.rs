//! # HTTP Server
//!
//! Main server combining all endpoint routers into one axum app.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::observability::Logger;

use super::auth_routes::auth_routes;
use super::category_routes::category_routes;
use super::comment_routes::comment_routes;
use super::config::HttpServerConfig;
use super::docs_routes::docs_routes;
use super::post_routes::post_routes;
use super::realtime_routes::realtime_routes;
use super::state::ApiState;
use super::user_routes::user_routes;

/// HTTP server for the blogging API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server with freshly wired state
    pub fn new(config: &AppConfig) -> Self {
        Self::with_state(config.http.clone(), Arc::new(ApiState::new(config)))
    }

    /// Create a server over existing state (used by tests to reach the
    /// services behind a running server)
    pub fn with_state(config: HttpServerConfig, state: Arc<ApiState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<ApiState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            // Permissive for development
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let blog_api = post_routes(Arc::clone(&state))
            .merge(category_routes(Arc::clone(&state)))
            .merge(comment_routes(Arc::clone(&state)));

        Router::new()
            .route("/health", get(health_handler))
            .merge(docs_routes())
            .nest("/api/auth", auth_routes(Arc::clone(&state)))
            .nest("/api/users", user_routes(Arc::clone(&state)))
            .nest("/api/blog", blog_api)
            .nest("/ws", realtime_routes(state))
            .layer(cors)
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Consume the server, returning its router (for tests)
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("{}", e)))?;

        let listener = TcpListener::bind(addr).await?;
        Logger::info("SERVER_STARTED", &[("addr", &addr.to_string())]);

        axum::serve(listener, self.router).await
    }
}

/// Liveness probe
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_creation() {
        let server = HttpServer::new(&AppConfig::default());
        assert_eq!(server.socket_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_router_builds() {
        let server = HttpServer::new(&AppConfig::default());
        let _router = server.into_router();
    }
}
