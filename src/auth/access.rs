//! # Access Context
//!
//! Per-request identity carried from the HTTP layer into the services.
//! Built from a validated access token, or anonymous when no token was
//! presented.

use uuid::Uuid;

use super::errors::{AuthError, AuthResult};
use super::user::{Role, User};

/// Identity attached to a request
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    /// The authenticated user's ID (None if anonymous)
    pub user_id: Option<Uuid>,

    /// The authenticated user's display name
    pub username: Option<String>,

    /// The authenticated user's role
    pub role: Option<Role>,

    /// Whether the request is authenticated
    pub is_authenticated: bool,
}

impl AccessContext {
    /// Create context for an authenticated user
    pub fn authenticated(user: &User) -> Self {
        Self {
            user_id: Some(user.id),
            username: Some(user.username.clone()),
            role: Some(user.role),
            is_authenticated: true,
        }
    }

    /// Create context for anonymous access
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Get the user ID or error if not authenticated
    pub fn require_user_id(&self) -> AuthResult<Uuid> {
        self.user_id.ok_or(AuthError::AuthenticationRequired)
    }

    /// Authors and admins may write posts and manage categories
    pub fn is_author(&self) -> bool {
        matches!(self.role, Some(Role::Author | Role::Admin))
    }

    /// Admins may moderate anything
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Owner-or-admin check for mutating a resource
    pub fn can_manage(&self, owner_id: Uuid) -> bool {
        self.is_admin() || self.user_id == Some(owner_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::crypto::PasswordPolicy;

    fn user_with_role(role: Role) -> User {
        User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "password123",
            role,
            &PasswordPolicy::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_anonymous_context() {
        let ctx = AccessContext::anonymous();

        assert!(!ctx.is_authenticated);
        assert!(!ctx.is_author());
        assert!(!ctx.is_admin());
        assert!(matches!(
            ctx.require_user_id(),
            Err(AuthError::AuthenticationRequired)
        ));
    }

    #[test]
    fn test_authenticated_context() {
        let user = user_with_role(Role::Author);
        let ctx = AccessContext::authenticated(&user);

        assert!(ctx.is_authenticated);
        assert!(ctx.is_author());
        assert!(!ctx.is_admin());
        assert_eq!(ctx.require_user_id().unwrap(), user.id);
    }

    #[test]
    fn test_can_manage() {
        let owner = user_with_role(Role::Author);
        let ctx = AccessContext::authenticated(&owner);

        assert!(ctx.can_manage(owner.id));
        assert!(!ctx.can_manage(Uuid::new_v4()));

        // Admins can manage anything
        let admin = user_with_role(Role::Admin);
        let admin_ctx = AccessContext::authenticated(&admin);
        assert!(admin_ctx.can_manage(owner.id));
    }
}
