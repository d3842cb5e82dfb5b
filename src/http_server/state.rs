//! # Shared API State
//!
//! One explicitly constructed state object owns every service. The
//! broadcast registry is built here and injected into both the WebSocket
//! accept path and the REST write path; there is no ambient singleton.

use std::sync::Arc;

use crate::auth::access::AccessContext;
use crate::auth::session::InMemorySessionRepository;
use crate::auth::user::{InMemoryUserRepository, Role, SignupRequest};
use crate::auth::AuthService;
use crate::blog::category::InMemoryCategoryRepository;
use crate::blog::comment::InMemoryCommentRepository;
use crate::blog::post::InMemoryPostRepository;
use crate::blog::service::CreateCategoryRequest;
use crate::blog::BlogService;
use crate::config::AppConfig;
use crate::observability::Logger;
use crate::realtime::{BroadcastRegistry, EventPublisher};

/// Concrete auth service used by the server
pub type ApiAuthService = AuthService<InMemoryUserRepository, InMemorySessionRepository>;

/// Concrete blog service used by the server
pub type ApiBlogService = BlogService<
    InMemoryPostRepository,
    InMemoryCategoryRepository,
    InMemoryCommentRepository,
    InMemoryUserRepository,
>;

/// Shared state handed to every router
pub struct ApiState {
    pub auth: ApiAuthService,
    pub blog: ApiBlogService,
    pub registry: Arc<BroadcastRegistry>,
}

impl ApiState {
    /// Wire up the services from configuration
    pub fn new(config: &AppConfig) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let registry = Arc::new(BroadcastRegistry::new(config.realtime.clone()));

        let auth = AuthService::new(
            Arc::clone(&users),
            InMemorySessionRepository::new(),
            config.auth.jwt_config(),
            config.auth.session_config(),
            config.auth.password_policy(),
        );

        let blog = BlogService::new(
            InMemoryPostRepository::new(),
            InMemoryCategoryRepository::new(),
            InMemoryCommentRepository::new(),
            users,
            EventPublisher::new(Arc::clone(&registry)),
        );

        Self {
            auth,
            blog,
            registry,
        }
    }

    /// Create a demo admin account and starter categories
    ///
    /// Best-effort: already-existing records are skipped with a log line
    /// so `--seed` stays safe to pass on every boot.
    pub fn seed_demo_data(&self) {
        let admin = SignupRequest {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "admin123".to_string(),
            role: Some(Role::Admin),
            bio: None,
        };

        match self.auth.signup(admin) {
            Ok((user, _)) => {
                Logger::warn(
                    "SEED_ADMIN_CREATED",
                    &[
                        ("email", "admin@example.com"),
                        ("password", "admin123"),
                        ("user_id", &user.id.to_string()),
                    ],
                );

                let ctx = AccessContext::authenticated(&user);
                for (name, description) in [
                    ("Technology", "Tech-related posts"),
                    ("Lifestyle", "Lifestyle and personal posts"),
                    ("Business", "Business and entrepreneurship"),
                    ("Education", "Educational content"),
                ] {
                    let result = self.blog.create_category(
                        &ctx,
                        CreateCategoryRequest {
                            name: name.to_string(),
                            description: Some(description.to_string()),
                        },
                    );
                    match result {
                        Ok(category) => {
                            Logger::info("SEED_CATEGORY_CREATED", &[("name", &category.name)])
                        }
                        Err(e) => Logger::warn(
                            "SEED_CATEGORY_SKIPPED",
                            &[("name", name), ("reason", &e.to_string())],
                        ),
                    }
                }
            }
            Err(e) => {
                Logger::warn("SEED_SKIPPED", &[("reason", &e.to_string())]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_wires_up() {
        let state = ApiState::new(&AppConfig::default());
        assert_eq!(state.registry.connection_count(), 0);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let state = ApiState::new(&AppConfig::default());

        state.seed_demo_data();
        state.seed_demo_data();

        let categories = state.blog.list_categories().unwrap();
        assert_eq!(categories.len(), 4);

        let authors = state.auth.list_authors().unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].username, "admin");
    }
}
