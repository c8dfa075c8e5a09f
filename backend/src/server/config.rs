//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

use chrono::TimeDelta;
use marketplace::outbound::persistence::DbPool;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Where asset and account records live.
pub enum Storage {
    /// PostgreSQL through the shared connection pool.
    Postgres {
        pool: DbPool,
        lock_timeout: Option<Duration>,
    },
    /// Process memory; records are lost on restart.
    InMemory,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) storage: Storage,
    pub(crate) token_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: TimeDelta,
    pub(crate) swagger_enabled: bool,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration backed by in-process storage.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        token_secret: Zeroizing<Vec<u8>>,
        token_ttl: TimeDelta,
    ) -> Self {
        Self {
            bind_addr,
            storage: Storage::InMemory,
            token_secret,
            token_ttl,
            swagger_enabled: true,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for the persistence adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool, lock_timeout: Option<Duration>) -> Self {
        self.storage = Storage::Postgres { pool, lock_timeout };
        self
    }

    /// Toggle Swagger UI and the OpenAPI document route.
    #[must_use]
    pub fn with_swagger(mut self, enabled: bool) -> Self {
        self.swagger_enabled = enabled;
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
