//! Domain primitives, services and ports.
//!
//! Purpose: define strongly typed entities shared by the HTTP and persistence
//! adapters, plus the services coordinating them. Types validate their
//! invariants at construction so adapters cannot smuggle malformed values
//! into the core.
//!
//! Public surface:
//! - `Asset`, `NewAsset`, `AssetId`, `Price`: marketplace records.
//! - `User`, `UserId`, `Username`: account identity.
//! - `LoginCredentials`, `PasswordHash`, `AccessToken`: credential values.
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `AssetService`, `UserAccountService`: application services.

pub mod account_service;
pub mod asset;
pub mod asset_service;
pub mod auth;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::UserAccountService;
pub use self::asset::{Asset, AssetId, AssetValidationError, NewAsset, Price};
pub use self::asset_service::{AssetService, OwnershipTransfer, PurchaseError};
pub use self::auth::{AccessToken, LoginCredentials, LoginValidationError, PasswordHash};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::TraceId;
pub use self::user::{User, UserId, UserValidationError, Username};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";
