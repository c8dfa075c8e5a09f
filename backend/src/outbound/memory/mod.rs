//! In-process adapters.
//!
//! These back the server when no database URL is configured and give tests
//! real locking and uniqueness semantics without PostgreSQL. State is lost on
//! restart.

mod asset_repository;
mod user_repository;

pub use asset_repository::InMemoryAssetRepository;
pub use user_repository::InMemoryUserRepository;
