//! Driving port for registration, login and bearer authentication.

use async_trait::async_trait;

use crate::domain::{AccessToken, Error, LoginCredentials, UserId};

/// Account use-cases exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account and return its id.
    async fn register(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Exchange valid credentials for an access token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error>;

    /// Resolve a bearer token to the user it was issued for.
    fn authenticate(&self, token: &str) -> Result<UserId, Error>;
}
