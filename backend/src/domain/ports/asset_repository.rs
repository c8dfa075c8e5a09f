//! Ownership store port.
//!
//! Three traits split the store along transaction boundaries:
//!
//! - [`AssetRepository`] is the shared, pool-backed entry point. Its methods
//!   run as independent statements and [`AssetRepository::begin`] opens a
//!   unit of work.
//! - [`AssetTransaction`] is the set of operations available *inside* a unit
//!   of work. It has no `begin`, so nesting transactions does not type-check.
//! - [`AssetUnitOfWork`] owns the open transaction and is consumed by
//!   `commit` or `rollback`. Dropping it unfinished rolls back.
//!
//! Business code normally goes through [`with_transaction`], which commits
//! on `Ok` and rolls back on `Err`.

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::warn;

use crate::domain::{Asset, AssetId, NewAsset, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ownership store adapters.
    pub enum AssetRepositoryError {
        /// Store connection could not be established or was lost.
        Connection { message: String } =>
            "asset store connection failed: {message}",
        /// Query or mutation failed during execution, including lock waits.
        Query { message: String } =>
            "asset store query failed: {message}",
        /// A schema constraint rejected the write.
        Constraint { message: String } =>
            "asset store constraint violated: {message}",
        /// Owner-scoped delete matched no row.
        NotFoundOrNotOwned =>
            "asset not found or not owned by user",
        /// Targeted write matched no row.
        Missing { asset_id: i64 } =>
            "asset {asset_id} does not exist",
    }
}

/// Locking mode for reads inside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLock {
    /// Plain read; sees committed data plus the unit's own writes.
    Shared,
    /// Exclusive row lock held until the unit of work ends. Competing
    /// exclusive reads of the same row wait.
    Exclusive,
}

/// Operations bound to one open transaction.
#[async_trait]
pub trait AssetTransaction: Send {
    /// Insert an asset and return its generated id.
    async fn create(&mut self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError>;

    /// Delete the asset only when `owner_id` owns it.
    ///
    /// Fails with [`AssetRepositoryError::NotFoundOrNotOwned`] when no row
    /// matched; missing and foreign-owned assets are indistinguishable.
    async fn delete_owned(
        &mut self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError>;

    /// Point read. `Ok(None)` when the asset does not exist.
    async fn find_by_id(
        &mut self,
        asset_id: AssetId,
        lock: RowLock,
    ) -> Result<Option<Asset>, AssetRepositoryError>;

    /// All assets owned by `owner_id`, in id order.
    async fn list_by_owner(&mut self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError>;

    /// Unconditionally move the asset to `new_owner_id`.
    ///
    /// Callers validate preconditions first, normally under
    /// [`RowLock::Exclusive`].
    async fn reassign_owner(
        &mut self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError>;
}

/// An open transaction that must be finished exactly once.
///
/// Implementations roll back when dropped without `commit` or `rollback`,
/// which covers panics and cancelled futures.
pub trait AssetUnitOfWork: Send {
    /// Operations running inside this transaction.
    fn operations(&mut self) -> &mut dyn AssetTransaction;

    /// Make all writes durable and release row locks.
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>>;

    /// Discard all writes and release row locks.
    fn rollback(self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>>;
}

/// Shared ownership store handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetRepository: Send + Sync {
    /// Insert an asset and return its generated id.
    async fn create(&self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError>;

    /// Delete the asset only when `owner_id` owns it.
    async fn delete_owned(
        &self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError>;

    /// Point read of committed state without locking.
    async fn find_by_id(&self, asset_id: AssetId) -> Result<Option<Asset>, AssetRepositoryError>;

    /// All assets owned by `owner_id`, in id order.
    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError>;

    /// Unconditionally move the asset to `new_owner_id`.
    async fn reassign_owner(
        &self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError>;

    /// Open a unit of work.
    async fn begin(&self) -> Result<Box<dyn AssetUnitOfWork>, AssetRepositoryError>;
}

/// Run `work` inside a fresh unit of work on `repo`.
///
/// Commits when `work` returns `Ok`, rolls back when it returns `Err`. A
/// failed rollback is logged and the original error is returned. A commit
/// failure surfaces as the caller's error type.
///
/// # Examples
/// ```no_run
/// use futures_util::FutureExt;
/// use marketplace::domain::ports::{
///     AssetRepository, AssetRepositoryError, RowLock, with_transaction,
/// };
/// use marketplace::domain::{Asset, AssetId};
///
/// async fn read_locked(
///     repo: &dyn AssetRepository,
///     id: AssetId,
/// ) -> Result<Option<Asset>, AssetRepositoryError> {
///     with_transaction(repo, |tx| {
///         async move { tx.find_by_id(id, RowLock::Exclusive).await }.boxed()
///     })
///     .await
/// }
/// ```
pub async fn with_transaction<R, T, E, F>(repo: &R, work: F) -> Result<T, E>
where
    R: AssetRepository + ?Sized,
    E: From<AssetRepositoryError>,
    F: for<'tx> FnOnce(&'tx mut dyn AssetTransaction) -> BoxFuture<'tx, Result<T, E>> + Send,
{
    let mut unit = repo.begin().await?;
    let outcome = work(unit.operations()).await;
    match outcome {
        Ok(value) => {
            unit.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback_error) = unit.rollback().await {
                warn!(error = %rollback_error, "rollback after failed unit of work also failed");
            }
            Err(error)
        }
    }
}
