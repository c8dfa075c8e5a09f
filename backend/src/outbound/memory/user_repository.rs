//! In-process account store enforcing unique usernames.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{UserAccount, UserPersistenceError, UserRepository};
use crate::domain::{PasswordHash, User, UserId, Username};

/// Account store kept in process memory.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<Vec<UserAccount>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(
        &self,
        username: &Username,
        password_hash: &PasswordHash,
    ) -> Result<UserId, UserPersistenceError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if accounts
            .iter()
            .any(|account| account.user.username() == username)
        {
            return Err(UserPersistenceError::duplicate_username(username.as_ref()));
        }
        let next = i64::try_from(accounts.len())
            .map_err(|err| UserPersistenceError::query(err.to_string()))?
            + 1;
        let user_id = UserId::new(next).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        accounts.push(UserAccount {
            user: User::new(user_id, username.clone()),
            password_hash: password_hash.clone(),
        });
        Ok(user_id)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(accounts
            .iter()
            .find(|account| account.user.username().as_ref() == username)
            .cloned())
    }
}
