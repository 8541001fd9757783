//! Application settings loaded via OrthoConfig.
//!
//! Values come from `CAMPUSSPHERE_*` environment variables, matching CLI
//! flags, or a configuration file. Required values are checked by
//! [`AppSettings::validate`] so start-up fails with a message naming the key.

use std::ffi::OsString;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_RUN_MIGRATIONS: bool = true;

/// Raw settings as loaded from the environment, CLI, and files.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUSSPHERE")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// HMAC secret for bearer tokens.
    pub jwt_secret: Option<String>,
    /// Bearer token lifetime in seconds.
    #[ortho_config(default = 86_400)]
    pub token_ttl_secs: u64,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_max_connections: u32,
    /// Apply embedded migrations before serving. Unset means `true`.
    pub run_migrations: Option<bool>,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

/// Configuration failures surfaced at start-up.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Loading from sources failed.
    #[error("failed to load configuration: {0}")]
    Load(String),
    /// A required key was absent.
    #[error("missing required setting {key} (set {env})")]
    Missing {
        /// Setting name.
        key: &'static str,
        /// Environment variable that supplies it.
        env: &'static str,
    },
    /// The bind address did not parse.
    #[error("invalid bind address {value:?}: {reason}")]
    InvalidBindAddr {
        /// Rejected value.
        value: String,
        /// Parser message.
        reason: String,
    },
    /// Tokens would expire immediately.
    #[error("token_ttl_secs must be greater than zero")]
    ZeroTokenTtl,
}

/// Settings after required values have been checked.
pub struct ValidatedSettings {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: Zeroizing<String>,
    pub token_ttl: Duration,
    pub db_max_connections: u32,
    pub run_migrations: bool,
}

impl AppSettings {
    /// Load settings from the process arguments and environment.
    ///
    /// # Errors
    /// Returns [`SettingsError::Load`] when a source cannot be parsed.
    pub fn load_from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self, SettingsError> {
        Self::load_from_iter(args).map_err(|err| SettingsError::Load(err.to_string()))
    }

    /// Check required values and convert into typed settings.
    ///
    /// # Errors
    /// Returns [`SettingsError`] naming the first offending key.
    pub fn validate(self) -> Result<ValidatedSettings, SettingsError> {
        let raw_addr = self
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|err| SettingsError::InvalidBindAddr {
                value: raw_addr.clone(),
                reason: err.to_string(),
            })?;
        let database_url = self
            .database_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(SettingsError::Missing {
                key: "database_url",
                env: "CAMPUSSPHERE_DATABASE_URL",
            })?;
        let jwt_secret = self
            .jwt_secret
            .filter(|secret| !secret.is_empty())
            .map(Zeroizing::new)
            .ok_or(SettingsError::Missing {
                key: "jwt_secret",
                env: "CAMPUSSPHERE_JWT_SECRET",
            })?;
        if self.token_ttl_secs == 0 {
            return Err(SettingsError::ZeroTokenTtl);
        }
        Ok(ValidatedSettings {
            bind_addr,
            database_url,
            jwt_secret,
            token_ttl: Duration::from_secs(self.token_ttl_secs),
            db_max_connections: self.db_max_connections,
            run_migrations: self.run_migrations.unwrap_or(DEFAULT_RUN_MIGRATIONS),
        })
    }
}
