//! bcrypt-backed `PasswordHasher`.
//!
//! Hashing is CPU bound, so both operations run on Tokio's blocking pool with
//! the caller's trace identifier carried across.

use async_trait::async_trait;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PasswordHash, TraceId};

/// Password hasher using bcrypt with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BcryptPasswordHasher {
    /// Hasher at bcrypt's default cost.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Hasher at an explicit cost (4..=31). Low costs are for tests only.
    #[must_use]
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Configured work factor.
    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }
}

async fn run_blocking<F, R>(work: F) -> Result<R, PasswordHashError>
where
    F: FnOnce() -> Result<R, bcrypt::BcryptError> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(TraceId::in_current_scope(work))
        .await
        .map_err(|err| PasswordHashError::worker(err.to_string()))?
        .map_err(|err| PasswordHashError::algorithm(err.to_string()))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let cost = self.cost;
        let encoded = run_blocking(move || bcrypt::hash(password.as_str(), cost)).await?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        run_blocking(move || bcrypt::verify(password.as_str(), &encoded)).await
    }
}
