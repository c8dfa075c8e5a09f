//! PostgreSQL-backed `AssetRepository` adapter using Diesel ORM.
//!
//! Plain repository calls borrow a pooled connection per statement. A unit
//! of work checks out one connection for its whole lifetime, opens a
//! transaction on it and takes row locks with `SELECT ... FOR UPDATE`.
//! Dropping an unfinished unit schedules a rollback on the current Tokio
//! runtime; without a runtime the connection is released still inside its
//! transaction and the pool discards it instead of reusing it.

use std::time::Duration;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use crate::domain::ports::{
    AssetRepository, AssetRepositoryError, AssetTransaction, AssetUnitOfWork, RowLock,
};
use crate::domain::{Asset, AssetId, NewAsset, UserId};

use super::diesel_error_mapping::{map_asset_diesel_error, map_asset_pool_error};
use super::models::{AssetRow, NewAssetRow};
use super::pool::{DbPool, OwnedConnection};
use super::schema::assets;

/// Diesel-backed implementation of the ownership store port.
#[derive(Clone)]
pub struct DieselAssetRepository {
    pool: DbPool,
    lock_timeout: Option<Duration>,
}

impl DieselAssetRepository {
    /// Create a repository with the given connection pool. Lock waits are
    /// unbounded until [`Self::with_lock_timeout`] is applied.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            lock_timeout: None,
        }
    }

    /// Bound how long a unit of work waits for a row lock. Expired waits
    /// fail with [`AssetRepositoryError::Query`].
    #[must_use]
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }
}

async fn insert_asset(
    conn: &mut AsyncPgConnection,
    asset: &NewAsset,
) -> Result<AssetId, AssetRepositoryError> {
    let id: i64 = diesel::insert_into(assets::table)
        .values(&NewAssetRow::from(asset))
        .returning(assets::id)
        .get_result(conn)
        .await
        .map_err(|err| map_asset_diesel_error(err, "insert asset"))?;
    AssetId::new(id).map_err(|err| AssetRepositoryError::query(err.to_string()))
}

async fn delete_owned_row(
    conn: &mut AsyncPgConnection,
    asset_id: AssetId,
    owner_id: UserId,
) -> Result<(), AssetRepositoryError> {
    let deleted = diesel::delete(
        assets::table
            .filter(assets::id.eq(asset_id.get()))
            .filter(assets::user_id.eq(owner_id.get())),
    )
    .execute(conn)
    .await
    .map_err(|err| map_asset_diesel_error(err, "delete asset"))?;

    if deleted == 0 {
        return Err(AssetRepositoryError::not_found_or_not_owned());
    }
    Ok(())
}

async fn select_asset(
    conn: &mut AsyncPgConnection,
    asset_id: AssetId,
    lock: RowLock,
) -> Result<Option<Asset>, AssetRepositoryError> {
    let query = assets::table
        .filter(assets::id.eq(asset_id.get()))
        .select(AssetRow::as_select());
    let row = match lock {
        RowLock::Shared => query.first::<AssetRow>(conn).await,
        RowLock::Exclusive => query.for_update().first::<AssetRow>(conn).await,
    }
    .optional()
    .map_err(|err| map_asset_diesel_error(err, "select asset"))?;

    row.map(Asset::try_from).transpose()
}

async fn select_by_owner(
    conn: &mut AsyncPgConnection,
    owner_id: UserId,
) -> Result<Vec<Asset>, AssetRepositoryError> {
    let rows: Vec<AssetRow> = assets::table
        .filter(assets::user_id.eq(owner_id.get()))
        .select(AssetRow::as_select())
        .order_by(assets::id.asc())
        .load(conn)
        .await
        .map_err(|err| map_asset_diesel_error(err, "list assets"))?;

    rows.into_iter().map(Asset::try_from).collect()
}

async fn update_owner(
    conn: &mut AsyncPgConnection,
    asset_id: AssetId,
    new_owner_id: UserId,
) -> Result<(), AssetRepositoryError> {
    let updated = diesel::update(assets::table.filter(assets::id.eq(asset_id.get())))
        .set(assets::user_id.eq(new_owner_id.get()))
        .execute(conn)
        .await
        .map_err(|err| map_asset_diesel_error(err, "reassign owner"))?;

    if updated == 0 {
        return Err(AssetRepositoryError::missing(asset_id.get()));
    }
    Ok(())
}

#[async_trait]
impl AssetRepository for DieselAssetRepository {
    async fn create(&self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_asset_pool_error)?;
        insert_asset(&mut conn, asset).await
    }

    async fn delete_owned(
        &self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_asset_pool_error)?;
        delete_owned_row(&mut conn, asset_id, owner_id).await
    }

    async fn find_by_id(&self, asset_id: AssetId) -> Result<Option<Asset>, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_asset_pool_error)?;
        select_asset(&mut conn, asset_id, RowLock::Shared).await
    }

    async fn list_by_owner(&self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_asset_pool_error)?;
        select_by_owner(&mut conn, owner_id).await
    }

    async fn reassign_owner(
        &self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_asset_pool_error)?;
        update_owner(&mut conn, asset_id, new_owner_id).await
    }

    async fn begin(&self) -> Result<Box<dyn AssetUnitOfWork>, AssetRepositoryError> {
        let mut conn = self.pool.get_owned().await.map_err(map_asset_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(|err| map_asset_diesel_error(err, "begin transaction"))?;

        // From here on, early returns drop the unit and roll back.
        let mut unit = DieselUnitOfWork { conn: Some(conn) };
        if let Some(timeout) = self.lock_timeout {
            let statement = format!("SET LOCAL lock_timeout = '{}ms'", timeout.as_millis());
            diesel::sql_query(statement)
                .execute(unit.connection()?)
                .await
                .map_err(|err| map_asset_diesel_error(err, "set lock timeout"))?;
        }
        Ok(Box::new(unit))
    }
}

/// One open PostgreSQL transaction on a dedicated connection.
struct DieselUnitOfWork {
    conn: Option<OwnedConnection>,
}

impl DieselUnitOfWork {
    fn connection(&mut self) -> Result<&mut AsyncPgConnection, AssetRepositoryError> {
        self.conn
            .as_deref_mut()
            .ok_or_else(|| AssetRepositoryError::connection("unit of work already finished"))
    }
}

#[async_trait]
impl AssetTransaction for DieselUnitOfWork {
    async fn create(&mut self, asset: &NewAsset) -> Result<AssetId, AssetRepositoryError> {
        insert_asset(self.connection()?, asset).await
    }

    async fn delete_owned(
        &mut self,
        asset_id: AssetId,
        owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        delete_owned_row(self.connection()?, asset_id, owner_id).await
    }

    async fn find_by_id(
        &mut self,
        asset_id: AssetId,
        lock: RowLock,
    ) -> Result<Option<Asset>, AssetRepositoryError> {
        select_asset(self.connection()?, asset_id, lock).await
    }

    async fn list_by_owner(&mut self, owner_id: UserId) -> Result<Vec<Asset>, AssetRepositoryError> {
        select_by_owner(self.connection()?, owner_id).await
    }

    async fn reassign_owner(
        &mut self,
        asset_id: AssetId,
        new_owner_id: UserId,
    ) -> Result<(), AssetRepositoryError> {
        update_owner(self.connection()?, asset_id, new_owner_id).await
    }
}

impl AssetUnitOfWork for DieselUnitOfWork {
    fn operations(&mut self) -> &mut dyn AssetTransaction {
        self
    }

    fn commit(mut self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>> {
        let conn = self.conn.take();
        async move {
            let Some(mut conn) = conn else {
                return Err(AssetRepositoryError::connection(
                    "unit of work already finished",
                ));
            };
            AnsiTransactionManager::commit_transaction(&mut *conn)
                .await
                .map_err(|err| map_asset_diesel_error(err, "commit transaction"))
        }
        .boxed()
    }

    fn rollback(mut self: Box<Self>) -> BoxFuture<'static, Result<(), AssetRepositoryError>> {
        let conn = self.conn.take();
        async move {
            let Some(mut conn) = conn else {
                return Ok(());
            };
            AnsiTransactionManager::rollback_transaction(&mut *conn)
                .await
                .map_err(|err| map_asset_diesel_error(err, "rollback transaction"))
        }
        .boxed()
    }
}

impl Drop for DieselUnitOfWork {
    fn drop(&mut self) {
        let Some(mut conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("unit of work dropped unfinished; rolling back");
                handle.spawn(async move {
                    if let Err(err) = AnsiTransactionManager::rollback_transaction(&mut *conn).await
                    {
                        warn!(error = %err, "rollback of abandoned unit of work failed");
                    }
                });
            }
            Err(_) => {
                warn!("unit of work dropped outside a runtime; discarding connection");
                drop(conn);
            }
        }
    }
}
