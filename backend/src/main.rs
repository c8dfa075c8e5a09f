//! Backend entry-point: loads settings, prepares storage and serves the
//! marketplace API until SIGINT or SIGTERM.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use std::io;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use marketplace::inbound::http::health::HealthState;
use marketplace::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use marketplace::settings::AppSettings;
use server::{ServerConfig, create_server};

const DEFAULT_MIN_IDLE: u32 = 2;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|err| io::Error::other(format!("load settings: {err}")))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level()));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }

    let config = server_config(&settings).await?;

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()?));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(addr = %settings.bind_addr(), "marketplace listening");

    let handle = server.handle();
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested; draining connections");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    server.await
}

async fn server_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let secret = settings.jwt_secret().map_err(io::Error::other)?;
    let ttl_hours = settings.token_ttl_hours().map_err(io::Error::other)?;
    let ttl = TimeDelta::try_hours(ttl_hours)
        .ok_or_else(|| io::Error::other(format!("token_ttl_hours {ttl_hours} out of range")))?;

    let config = ServerConfig::new(settings.bind_addr(), secret, ttl)
        .with_swagger(settings.swagger_enabled());

    let Some(database_url) = settings.database_url() else {
        warn!("no database URL configured; records are kept in memory and lost on restart");
        return Ok(config);
    };

    let applied = run_migrations(database_url)
        .await
        .map_err(|err| io::Error::other(format!("run migrations: {err}")))?;
    info!(applied, "database schema up to date");

    let max_size = settings.db_max_connections().map_err(io::Error::other)?;
    let pool = DbPool::new(
        PoolConfig::new(database_url)
            .with_max_size(max_size)
            .with_min_idle(Some(DEFAULT_MIN_IDLE.min(max_size))),
    )
    .await
    .map_err(|err| io::Error::other(format!("create database pool: {err}")))?;

    Ok(config.with_db_pool(pool, settings.lock_timeout()))
}

#[cfg(feature = "metrics")]
fn make_metrics() -> io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("marketplace")
        .endpoint("/metrics")
        .build()
        .map_err(|err| io::Error::other(format!("configure Prometheus metrics: {err}")))
}

/// Resolve once SIGINT or, on Unix, SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
