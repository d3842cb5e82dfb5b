//! # Application Configuration
//!
//! JSON configuration file with serde defaults and a validation pass.
//! `quillbase init` writes the default file; `quillbase serve` loads it.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::crypto::PasswordPolicy;
use crate::auth::jwt::JwtConfig;
use crate::auth::session::SessionConfig;
use crate::http_server::HttpServerConfig;
use crate::realtime::RealtimeConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadFailed(String),

    #[error("Failed to write config: {0}")]
    WriteFailed(String),

    #[error("Invalid config JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Auth-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing secret for access tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Access token lifetime in minutes
    #[serde(default = "default_access_token_ttl_minutes")]
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,

    /// Minimum password length
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

fn default_jwt_secret() -> String {
    "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string()
}

fn default_access_token_ttl_minutes() -> i64 {
    15
}

fn default_refresh_token_ttl_days() -> i64 {
    30
}

fn default_password_min_length() -> usize {
    8
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_token_ttl_minutes: default_access_token_ttl_minutes(),
            refresh_token_ttl_days: default_refresh_token_ttl_days(),
            password_min_length: default_password_min_length(),
        }
    }
}

impl AuthSettings {
    /// JWT configuration derived from these settings
    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            access_token_ttl: Duration::minutes(self.access_token_ttl_minutes),
            ..JwtConfig::default()
        }
    }

    /// Session configuration derived from these settings
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            refresh_token_ttl: Duration::days(self.refresh_token_ttl_days),
        }
    }

    /// Password policy derived from these settings
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.password_min_length,
            ..PasswordPolicy::default()
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Broadcast registry settings
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Auth settings
    #[serde(default)]
    pub auth: AuthSettings,
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed(e.to_string()))?;

        let config: AppConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Write this configuration to a JSON file
    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteFailed(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.host.trim().is_empty() {
            return Err(ConfigError::Invalid("http.host must not be empty".into()));
        }
        if self.realtime.buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "realtime.buffer_capacity must be > 0".into(),
            ));
        }
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("auth.jwt_secret must not be empty".into()));
        }
        if self.auth.access_token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "auth.access_token_ttl_minutes must be > 0".into(),
            ));
        }
        if self.auth.refresh_token_ttl_days <= 0 {
            return Err(ConfigError::Invalid(
                "auth.refresh_token_ttl_days must be > 0".into(),
            ));
        }
        Ok(())
    }
}
