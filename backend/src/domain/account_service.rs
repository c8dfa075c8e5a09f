//! Account registration, login and bearer authentication.
//!
//! `UserAccountService` composes three driven ports: the account store, the
//! password hasher and the access token issuer. Login failures never reveal
//! whether the username exists.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AccessTokenError, AccessTokenService, AccountService, PasswordHashError, PasswordHasher,
    UserPersistenceError, UserRepository,
};
use crate::domain::{AccessToken, Error, LoginCredentials, UserId, Username};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Account use-cases over pluggable storage, hashing and token adapters.
pub struct UserAccountService<U: ?Sized, H: ?Sized, T: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
}

impl<U: ?Sized, H: ?Sized, T: ?Sized> Clone for UserAccountService<U, H, T> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            hasher: Arc::clone(&self.hasher),
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<U: ?Sized, H: ?Sized, T: ?Sized> UserAccountService<U, H, T> {
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>) -> Self {
        Self {
            users,
            hasher,
            tokens,
        }
    }
}

fn persistence_failure(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::DuplicateUsername { .. } => {
            Error::conflict("username already taken")
        }
        UserPersistenceError::Connection { .. } => {
            warn!(error = %err, "account store unavailable");
            Error::service_unavailable("account store unavailable")
        }
        UserPersistenceError::Query { .. } => {
            error!(error = %err, "account store failure");
            Error::internal(err.to_string())
        }
    }
}

fn hashing_failure(err: PasswordHashError) -> Error {
    error!(error = %err, "password hashing failed");
    Error::internal(err.to_string())
}

fn token_failure(err: AccessTokenError) -> Error {
    match err {
        AccessTokenError::Expired => Error::unauthorized("access token expired"),
        AccessTokenError::Invalid { .. } => Error::unauthorized("invalid access token"),
        AccessTokenError::Issue { .. } => {
            error!(error = %err, "access token issue failed");
            Error::internal(err.to_string())
        }
    }
}

#[async_trait]
impl<U, H, T> AccountService for UserAccountService<U, H, T>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
    T: AccessTokenService + ?Sized,
{
    async fn register(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let username = Username::new(credentials.username())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(hashing_failure)?;
        let user_id = self
            .users
            .create(&username, &hash)
            .await
            .map_err(persistence_failure)?;
        info!(user_id = user_id.get(), "user registered");
        Ok(user_id)
    }

    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, Error> {
        let Some(account) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(persistence_failure)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &account.password_hash)
            .await
            .map_err(hashing_failure)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        let user_id = account.user.id();
        let token = self.tokens.issue(user_id).map_err(token_failure)?;
        info!(user_id = user_id.get(), "user logged in");
        Ok(token)
    }

    fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        self.tokens.verify(token).map_err(token_failure)
    }
}
