//! # Session Management
//!
//! Refresh-token sessions. Refresh tokens are single-use, stored hashed,
//! and sessions are revoked immediately on logout.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crypto::{constant_time_str_eq, generate_token, hash_token};
use super::errors::{AuthError, AuthResult};

/// Session model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Hashed refresh token (raw token given to client)
    #[serde(skip_serializing)]
    pub refresh_token_hash: String,

    /// When the session was created
    pub created_at: DateTime<Utc>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// Whether the session has been revoked
    pub revoked: bool,
}

/// Session manager configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl: Duration::days(30),
        }
    }
}

/// Session manager handles session creation and validation
pub struct SessionManager<R: SessionRepository> {
    config: SessionConfig,
    repository: R,
}

impl<R: SessionRepository> SessionManager<R> {
    pub fn new(config: SessionConfig, repository: R) -> Self {
        Self { config, repository }
    }

    /// Create a new session for a user
    ///
    /// Returns the raw refresh token (not hashed) to give to the client.
    pub fn create_session(&self, user_id: Uuid) -> AuthResult<(Session, String)> {
        let refresh_token = generate_token();
        let refresh_token_hash = hash_token(&refresh_token);

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id,
            refresh_token_hash,
            created_at: now,
            expires_at: now + self.config.refresh_token_ttl,
            revoked: false,
        };

        self.repository.create(&session)?;

        Ok((session, refresh_token))
    }

    /// Rotate a session: revoke the old one, create a new one
    ///
    /// Refresh tokens are single-use.
    pub fn refresh_session(&self, refresh_token: &str) -> AuthResult<(Session, String)> {
        let token_hash = hash_token(refresh_token);

        let old_session = self
            .repository
            .find_by_refresh_token_hash(&token_hash)?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if old_session.revoked {
            return Err(AuthError::SessionRevoked);
        }

        if old_session.expires_at < Utc::now() {
            return Err(AuthError::SessionInvalid);
        }

        self.repository.revoke(old_session.id)?;

        self.create_session(old_session.user_id)
    }

    /// Revoke a session (logout)
    pub fn revoke_session(&self, session_id: Uuid) -> AuthResult<()> {
        self.repository.revoke(session_id)
    }

    /// Revoke all sessions for a user
    pub fn revoke_all_user_sessions(&self, user_id: Uuid) -> AuthResult<()> {
        self.repository.revoke_all_for_user(user_id)
    }

    /// Validate a refresh token and return the associated session
    pub fn validate_refresh_token(&self, refresh_token: &str) -> AuthResult<Session> {
        let token_hash = hash_token(refresh_token);

        let session = self
            .repository
            .find_by_refresh_token_hash(&token_hash)?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if session.revoked {
            return Err(AuthError::SessionRevoked);
        }

        if session.expires_at < Utc::now() {
            return Err(AuthError::SessionInvalid);
        }

        Ok(session)
    }
}

/// Session repository trait
pub trait SessionRepository: Send + Sync {
    /// Create a new session
    fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by ID
    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Session>>;

    /// Find session by refresh token hash
    fn find_by_refresh_token_hash(&self, hash: &str) -> AuthResult<Option<Session>>;

    /// Revoke a session
    fn revoke(&self, id: Uuid) -> AuthResult<()>;

    /// Revoke all sessions for a user
    fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<()>;

    /// Delete expired sessions (cleanup)
    fn delete_expired(&self) -> AuthResult<usize>;
}

/// In-memory session repository
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    sessions: std::sync::RwLock<Vec<Session>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn create(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        sessions.push(session.clone());
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(sessions.iter().find(|s| s.id == id).cloned())
    }

    fn find_by_refresh_token_hash(&self, hash: &str) -> AuthResult<Option<Session>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(sessions
            .iter()
            .find(|s| constant_time_str_eq(&s.refresh_token_hash, hash))
            .cloned())
    }

    fn revoke(&self, id: Uuid) -> AuthResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        if let Some(session) = sessions.iter_mut().find(|s| s.id == id) {
            session.revoked = true;
            Ok(())
        } else {
            Err(AuthError::SessionInvalid)
        }
    }

    fn revoke_all_for_user(&self, user_id: Uuid) -> AuthResult<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        for session in sessions.iter_mut().filter(|s| s.user_id == user_id) {
            session.revoked = true;
        }
        Ok(())
    }

    fn delete_expired(&self) -> AuthResult<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        let now = Utc::now();
        let len_before = sessions.len();
        sessions.retain(|s| s.expires_at > now);
        Ok(len_before - sessions.len())
    }
}
