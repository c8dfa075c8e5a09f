//! In-process ownership store with row-level exclusive locks.
//!
//! Committed rows live behind a synchronous mutex that is never held across
//! an await. Each row additionally has an async lock; a unit of work acquires
//! it for locked reads and for every write and keeps the guard until it
//! commits, rolls back or is dropped. Writes inside a unit are staged and
//! become visible to other callers only on commit.
//!
//! Row locks exist only while someone holds or waits for them. The entry is
//! removed when its last claim is released, so probing arbitrary ids leaves
//! nothing behind.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::{Mutex as RowMutex, OwnedMutexGuard};

use crate::domain::ports::{
    AssetRepository, AssetRepositoryError, AssetTransaction, AssetUnitOfWork, RowLock,
};
use crate::domain::{Asset, AssetId, NewAsset, UserId};

/// A row's async lock plus the number of holders and waiters referencing it.
#[derive(Default)]
struct RowLockEntry {
    lock: Arc<RowMutex<()>>,
    claims: usize,
}

#[derive(Default)]
struct Store {
    rows: Mutex<BTreeMap<AssetId, Asset>>,
    row_locks: Mutex<HashMap<AssetId, RowLockEntry>>,
    last_id: AtomicI64,
}

impl Store {
    fn rows(&self) -> MutexGuard<'_, BTreeMap<AssetId, Asset>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn row_locks(&self) -> MutexGuard<'_, HashMap<AssetId, RowLockEntry>> {
        self.row_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn claim_row(self: &Arc<Self>, asset_id: AssetId) -> RowClaim {
        let mut locks = self.row_locks();
        let entry = locks.entry(asset_id).or_default();
        entry.claims += 1;
        RowClaim {
            store: Arc::clone(self),
            asset_id,
            lock: Arc::clone(&entry.lock),
        }
    }

    fn release_claim(&self, asset_id: AssetId) {
        if let Entry::Occupied(mut entry) = self.row_locks().entry(asset_id) {
            entry.get_mut().claims -= 1;
            if entry.get().claims == 0 {
                entry.remove();
            }
        }
    }

    async fn lock_row(self: &Arc<Self>, asset_id: AssetId) -> RowGuard {
        let claim = self.claim_row(asset_id);
        let guard = Arc::clone(&claim.lock).lock_owned().await;
        RowGuard {
            _guard: guard,
            _claim: claim,
        }
    }

    fn next_id(&self) -> Result<AssetId, AssetRepositoryError> {
        let raw = self.last_id.fetch_add(1, Ordering::Relaxed) + 1;
        AssetId::new(raw).map_err(|err| AssetRepositoryError::query(err.to_string()))
    }

    fn committed(&self, asset_id: AssetId) -> Option<Asset> {
        self.rows().get(&asset_id).cloned()
    }

    fn committed_by_owner(&self, owner_id: UserId) -> BTreeMap<AssetId, Asset> {
        self.rows()
            .iter()
            .filter(|(_, asset)| asset.is_owned_by(owner_id))
            .map(|(id, asset)| (*id, asset.clone()))
            .collect()
    }
}

/// Registration on a row lock entry, held while waiting for and while
/// holding the lock. Dropping the last claim removes the entry.
struct RowClaim {
    store: Arc<Store>,
    asset_id: AssetId,
    lock: Arc<RowMutex<()>>,
}

impl Drop for RowClaim {
    fn drop(&mut self) {
        self.store.release_claim(self.asset_id);
    }
}

/// Exclusive hold on one row. The mutex guard is released before the claim.
struct RowGuard {
    _guard: OwnedMutexGuard<()>,
    _claim: RowClaim,
}

/// Ownership store kept in process memory.
///
/// Used when no database is configured and by tests that need real row
/// locking semantics without PostgreSQL.
#[derive(Clone, Default)]
pub struct InMemoryAssetRepository {
    store: Arc<Store>,
}

impl InMemoryAssetRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.rows().len()
    }

    /// Whether no assets are committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn create(&self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError> {
        let asset_id = self.store.next_id()?;
        self.store
            .rows()
            .insert(asset_id, asset.clone().into_asset(asset_id));
        Ok(asset_id)
    }

    async fn delete_owned(
        &self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        let _guard = self.store.lock_row(asset_id).await;
        let mut rows = self.store.rows();
        match rows.get(&asset_id) {
            Some(asset) if asset.is_owned_by(owner_id) => {
                rows.remove(&asset_id);
                Ok(())
            }
            _ => Err(AssetRepositoryError::not_found_or_not_owned()),
        }
    }

    async fn find_by_id(&self, asset_id: AssetId) -> Result<Option<Asset>, AssetRepositoryError> {
        Ok(self.store.committed(asset_id))
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        Ok(self.store.committed_by_owner(owner_id).into_values().collect())
    }

    async fn reassign_owner(
        &self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        let _guard = self.store.lock_row(asset_id).await;
        let mut rows = self.store.rows();
        let asset = rows
            .get_mut(&asset_id)
            .ok_or_else(|| AssetRepositoryError::missing(asset_id.get()))?;
        asset.owner_id = new_owner_id;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn AssetUnitOfWork>, AssetRepositoryError> {
        Ok(Box::new(InMemoryUnitOfWork {
            store: Arc::clone(&self.store),
            held: HashMap::new(),
            staged: BTreeMap::new(),
        }))
    }
}

/// Open unit of work over [`InMemoryAssetRepository`].
///
/// Dropping it releases every held row lock and discards staged writes.
struct InMemoryUnitOfWork {
    store: Arc<Store>,
    held: HashMap<AssetId, RowGuard>,
    /// `None` marks a staged delete.
    staged: BTreeMap<AssetId, Option<Asset>>,
}

impl InMemoryUnitOfWork {
    async fn acquire(&mut self, asset_id: AssetId) {
        if !self.held.contains_key(&asset_id) {
            let guard = self.store.lock_row(asset_id).await;
            self.held.insert(asset_id, guard);
        }
    }

    fn visible(&self, asset_id: AssetId) -> Option<Asset> {
        match self.staged.get(&asset_id) {
            Some(staged) => staged.clone(),
            None => self.store.committed(asset_id),
        }
    }
}

#[async_trait]
impl AssetTransaction for InMemoryUnitOfWork {
    async fn create(&mut self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError> {
        let asset_id = self.store.next_id()?;
        self.acquire(asset_id).await;
        self.staged
            .insert(asset_id, Some(asset.clone().into_asset(asset_id)));
        Ok(asset_id)
    }

    async fn delete_owned(
        &mut self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        self.acquire(asset_id).await;
        match self.visible(asset_id) {
            Some(asset) if asset.is_owned_by(owner_id) => {
                self.staged.insert(asset_id, None);
                Ok(())
            }
            _ => Err(AssetRepositoryError::not_found_or_not_owned()),
        }
    }

    async fn find_by_id(
        &mut self,
        asset_id: AssetId,
        lock: RowLock,
    ) -> Result<Option<Asset>, AssetRepositoryError> {
        if lock == RowLock::Exclusive {
            self.acquire(asset_id).await;
        }
        Ok(self.visible(asset_id))
    }

    async fn list_by_owner(&mut self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        let mut owned = self.store.committed_by_owner(owner_id);
        for (asset_id, staged) in &self.staged {
            match staged {
                Some(asset) if asset.is_owned_by(owner_id) => {
                    owned.insert(*asset_id, asset.clone());
                }
                _ => {
                    owned.remove(asset_id);
                }
            }
        }
        Ok(owned.into_values().collect())
    }

    async fn reassign_owner(
        &mut self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        self.acquire(asset_id).await;
        let mut asset = self
            .visible(asset_id)
            .ok_or_else(|| AssetRepositoryError::missing(asset_id.get()))?;
        asset.owner_id = new_owner_id;
        self.staged.insert(asset_id, Some(asset));
        Ok(())
    }
}

impl AssetUnitOfWork for InMemoryUnitOfWork {
    fn operations(&mut self) -> &mut dyn AssetTransaction {
        self
    }

    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>> {
        async move {
            let mut unit = *self;
            {
                let mut rows = unit.store.rows();
                for (asset_id, staged) in std::mem::take(&mut unit.staged) {
                    match staged {
                        Some(asset) => {
                            rows.insert(asset_id, asset);
                        }
                        None => {
                            rows.remove(&asset_id);
                        }
                    }
                }
            }
            drop(unit);
            Ok(())
        }
        .boxed()
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>> {
        drop(self);
        async { Ok(()) }.boxed()
    }
}
