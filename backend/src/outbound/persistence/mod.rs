//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module. Connections come from a `bb8` pool through
//! `diesel-async`, and every database failure is mapped onto the owning
//! port's error type.
//!
//! # Example
//!
//! ```no_run
//! use marketplace::outbound::persistence::{DbPool, DieselAssetRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/marketplace")).await?;
//! let assets = DieselAssetRepository::new(pool);
//! # let _ = assets;
//! # Ok(())
//! # }
//! ```

mod diesel_asset_repository;
mod diesel_error_mapping;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_asset_repository::DieselAssetRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations, run_migrations_blocking};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
