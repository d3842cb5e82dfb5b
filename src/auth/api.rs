//! # Auth Service
//!
//! Combines the user repository, session manager, and JWT manager into
//! the account operations the HTTP layer calls.

use std::sync::Arc;

use uuid::Uuid;

use super::access::AccessContext;
use super::crypto::PasswordPolicy;
use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtConfig, JwtManager, TokenResponse};
use super::session::{SessionConfig, SessionManager, SessionRepository};
use super::user::{LoginRequest, Role, SignupRequest, UpdateProfileRequest, User, UserRepository};

/// Auth service combining all auth components
pub struct AuthService<U: UserRepository, S: SessionRepository> {
    user_repo: Arc<U>,
    session_manager: SessionManager<S>,
    jwt_manager: JwtManager,
    password_policy: PasswordPolicy,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(
        user_repo: Arc<U>,
        session_repo: S,
        jwt_config: JwtConfig,
        session_config: SessionConfig,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            user_repo,
            session_manager: SessionManager::new(session_config, session_repo),
            jwt_manager: JwtManager::new(jwt_config),
            password_policy,
        }
    }

    /// Register a new user
    pub fn signup(&self, request: SignupRequest) -> AuthResult<(User, TokenResponse)> {
        if self.user_repo.email_exists(&request.email)? {
            return Err(AuthError::EmailAlreadyExists);
        }
        if self.user_repo.username_exists(&request.username)? {
            return Err(AuthError::UsernameAlreadyExists);
        }

        let mut user = User::new(
            request.username,
            request.email,
            &request.password,
            request.role.unwrap_or_default(),
            &self.password_policy,
        )?;
        if let Some(bio) = request.bio {
            user.bio = bio;
        }

        self.user_repo.create(&user)?;

        let (_, refresh_token) = self.session_manager.create_session(user.id)?;
        let access_token = self.jwt_manager.generate_access_token(&user)?;
        let token_response = TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt_manager.get_expiration(),
        );

        Ok((user, token_response))
    }

    /// Authenticate a user by email and password
    pub fn login(&self, request: LoginRequest) -> AuthResult<(User, TokenResponse)> {
        let user = self
            .user_repo
            .find_by_email(&request.email)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.verify_password(&request.password)? {
            return Err(AuthError::InvalidCredentials);
        }

        let (_, refresh_token) = self.session_manager.create_session(user.id)?;
        let access_token = self.jwt_manager.generate_access_token(&user)?;
        let token_response = TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt_manager.get_expiration(),
        );

        Ok((user, token_response))
    }

    /// Rotate the refresh token and issue a fresh access token
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenResponse> {
        let (session, new_refresh_token) = self.session_manager.refresh_session(refresh_token)?;

        let user = self
            .user_repo
            .find_by_id(session.user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.jwt_manager.generate_access_token(&user)?;

        Ok(TokenResponse::new(
            access_token,
            new_refresh_token,
            self.jwt_manager.get_expiration(),
        ))
    }

    /// Logout (invalidate session)
    pub fn logout(&self, refresh_token: &str) -> AuthResult<()> {
        let session = self.session_manager.validate_refresh_token(refresh_token)?;
        self.session_manager.revoke_session(session.id)
    }

    /// Validate an access token and build the request context
    ///
    /// The role is read fresh from the repository so a role change takes
    /// effect without waiting for token expiry.
    pub fn validate_access_token(&self, token: &str) -> AuthResult<AccessContext> {
        let claims = self.jwt_manager.validate_token(token)?;
        let user_id = JwtManager::get_user_id(&claims)?;

        let user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(AccessContext::authenticated(&user))
    }

    /// Get user by ID
    pub fn get_user(&self, user_id: Uuid) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)
    }

    /// List all active users
    pub fn list_users(&self) -> AuthResult<Vec<User>> {
        self.user_repo.all_active()
    }

    /// List all active users with an authoring role
    pub fn list_authors(&self) -> AuthResult<Vec<User>> {
        Ok(self
            .user_repo
            .all_active()?
            .into_iter()
            .filter(|u| matches!(u.role, Role::Author | Role::Admin))
            .collect())
    }

    /// Update profile fields (bio, avatar)
    pub fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateProfileRequest,
    ) -> AuthResult<User> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        if let Some(bio) = update.bio {
            user.bio = bio;
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = avatar_url;
        }

        user.updated_at = chrono::Utc::now();
        self.user_repo.update(&user)?;

        Ok(user)
    }

    /// Change password for authenticated user
    pub fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(current_password)? {
            return Err(AuthError::InvalidCredentials);
        }

        user.set_password(new_password, &self.password_policy)?;
        self.user_repo.update(&user)?;

        // Force other devices to log in again
        self.session_manager.revoke_all_user_sessions(user_id)?;

        Ok(())
    }
}
