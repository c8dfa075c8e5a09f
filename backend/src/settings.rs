//! Server configuration loaded via OrthoConfig.
//!
//! Every field may be supplied through `MARKETPLACE_*` environment variables,
//! a configuration file or command-line flags. Accessors fill in defaults for
//! values left unset.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use crate::outbound::security::DEFAULT_TOKEN_TTL_HOURS;

const DEFAULT_HTTP_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_SWAGGER_ENABLED: bool = true;
const EPHEMERAL_SECRET_LEN: usize = 32;

/// Configuration values for the marketplace server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct AppSettings {
    /// TCP port the HTTP server listens on.
    pub http_port: Option<u16>,
    /// PostgreSQL connection URL. In-process storage is used when absent.
    pub database_url: Option<String>,
    /// Log filter applied when `RUST_LOG` is unset.
    pub log_level: Option<String>,
    /// HS256 signing secret for access tokens.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued access tokens, in hours.
    pub token_ttl_hours: Option<i64>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// PostgreSQL `lock_timeout` applied to each purchase transaction.
    pub lock_timeout_ms: Option<u64>,
    /// Serve Swagger UI and the OpenAPI document.
    pub swagger_enabled: Option<bool>,
}

/// Failures turning loaded settings into runtime values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("MARKETPLACE_JWT_SECRET must be set in release builds")]
    MissingJwtSecret,
    #[error("token_ttl_hours must be positive, got {0}")]
    InvalidTokenTtl(i64),
    #[error("db_max_connections must be positive")]
    InvalidPoolSize,
}

impl AppSettings {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((
            Ipv4Addr::UNSPECIFIED,
            self.http_port.unwrap_or(DEFAULT_HTTP_PORT),
        ))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Token lifetime in hours.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidTokenTtl`] for zero or negative values.
    pub fn token_ttl_hours(&self) -> Result<i64, SettingsError> {
        match self.token_ttl_hours.unwrap_or(DEFAULT_TOKEN_TTL_HOURS) {
            hours if hours > 0 => Ok(hours),
            hours => Err(SettingsError::InvalidTokenTtl(hours)),
        }
    }

    /// Maximum pool size.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidPoolSize`] when configured as zero.
    pub fn db_max_connections(&self) -> Result<u32, SettingsError> {
        match self.db_max_connections.unwrap_or(DEFAULT_DB_MAX_CONNECTIONS) {
            0 => Err(SettingsError::InvalidPoolSize),
            size => Ok(size),
        }
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Whether Swagger UI and the OpenAPI document are served. On unless
    /// explicitly disabled.
    pub fn swagger_enabled(&self) -> bool {
        self.swagger_enabled.unwrap_or(DEFAULT_SWAGGER_ENABLED)
    }

    /// Resolve the token signing secret.
    ///
    /// Debug builds without a configured secret get a random one that lives
    /// for the process; tokens do not survive a restart.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingJwtSecret`] in release builds when no
    /// secret is configured.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        resolve_jwt_secret(self.jwt_secret.as_deref(), cfg!(debug_assertions))
    }
}

fn resolve_jwt_secret(
    configured: Option<&str>,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
    if let Some(secret) = configured.filter(|secret| !secret.is_empty()) {
        return Ok(Zeroizing::new(secret.as_bytes().to_vec()));
    }
    if !allow_ephemeral {
        return Err(SettingsError::MissingJwtSecret);
    }
    let secret = Zeroizing::new(rand::random::<[u8; EPHEMERAL_SECRET_LEN]>().to_vec());
    warn!(
        fingerprint = %secret_fingerprint(&secret),
        "using ephemeral token signing secret (dev only)"
    );
    Ok(secret)
}

/// Short SHA-256 fingerprint identifying a secret in logs without
/// revealing it.
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..8])
}
