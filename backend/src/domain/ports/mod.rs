//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`AssetRepository`, `UserRepository`, `PasswordHasher`,
//! `AccessTokenService`) are implemented by outbound adapters. Driving ports
//! (`AssetMarketplace`, `AccountService`) are implemented by domain services
//! and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod access_tokens;
mod accounts;
mod asset_marketplace;
mod asset_repository;
mod password_hasher;
mod user_repository;

#[cfg(test)]
pub use access_tokens::MockAccessTokenService;
pub use access_tokens::{AccessTokenError, AccessTokenService};
#[cfg(test)]
pub use accounts::MockAccountService;
pub use accounts::AccountService;
#[cfg(test)]
pub use asset_marketplace::MockAssetMarketplace;
pub use asset_marketplace::AssetMarketplace;
#[cfg(test)]
pub use asset_repository::MockAssetRepository;
pub use asset_repository::{
    AssetRepository, AssetRepositoryError, AssetTransaction, AssetUnitOfWork, RowLock,
    with_transaction,
};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserAccount, UserPersistenceError, UserRepository};
