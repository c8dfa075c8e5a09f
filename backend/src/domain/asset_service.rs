//! Asset marketplace domain service.
//!
//! Implements [`AssetMarketplace`] on top of an [`AssetRepository`]. The
//! purchase flow runs as one unit of work: the asset row is locked
//! exclusively, ownership is validated against the locked state, and only
//! then reassigned. Concurrent purchases of the same asset therefore
//! serialise on the row lock and the loser observes the winner's owner.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::FutureExt;
use thiserror::Error as ThisError;
use tracing::{error, info, warn};

use crate::domain::ports::{
    AssetMarketplace, AssetRepository, AssetRepositoryError, RowLock, with_transaction,
};
use crate::domain::{Asset, AssetId, Error, NewAsset, UserId};

/// Result of a successful purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipTransfer {
    pub asset_id: AssetId,
    pub seller_id: UserId,
    pub buyer_id: UserId,
}

/// Typed purchase failures.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum PurchaseError {
    /// No asset with this id exists.
    #[error("asset {asset_id} not found")]
    AssetNotFound { asset_id: AssetId },
    /// The buyer already owns the asset.
    #[error("cannot purchase own asset {asset_id}")]
    OwnAsset { asset_id: AssetId },
    /// The ownership store failed; the unit of work was rolled back.
    #[error(transparent)]
    Store(#[from] AssetRepositoryError),
}

/// Marketplace service implementing the asset driving port.
pub struct AssetService<R: ?Sized> {
    assets: Arc<R>,
}

impl<R: ?Sized> Clone for AssetService<R> {
    fn clone(&self) -> Self {
        Self {
            assets: Arc::clone(&self.assets),
        }
    }
}

impl<R: ?Sized> AssetService<R> {
    /// Create a service backed by `assets`.
    pub fn new(assets: Arc<R>) -> Self {
        Self { assets }
    }
}

impl<R> AssetService<R>
where
    R: AssetRepository + ?Sized,
{
    /// Transfer `asset_id` to `buyer_id` atomically.
    ///
    /// Fails with [`PurchaseError::AssetNotFound`] for unknown assets and
    /// [`PurchaseError::OwnAsset`] when the buyer already owns it. Neither
    /// failure writes anything.
    pub async fn purchase(
        &self,
        asset_id: AssetId,
        buyer_id: UserId,
    ) -> Result<OwnershipTransfer, PurchaseError> {
        let transfer = with_transaction(&*self.assets, move |tx| {
            async move {
                let Some(asset) = tx.find_by_id(asset_id, RowLock::Exclusive).await? else {
                    return Err(PurchaseError::AssetNotFound { asset_id });
                };
                if asset.is_owned_by(buyer_id) {
                    return Err(PurchaseError::OwnAsset { asset_id });
                }
                tx.reassign_owner(asset_id, buyer_id).await?;
                Ok(OwnershipTransfer {
                    asset_id,
                    seller_id: asset.owner_id,
                    buyer_id,
                })
            }
            .boxed()
        })
        .await?;

        info!(
            asset_id = transfer.asset_id.get(),
            seller_id = transfer.seller_id.get(),
            buyer_id = transfer.buyer_id.get(),
            "asset ownership transferred"
        );
        Ok(transfer)
    }
}

fn store_failure(
    operation: &'static str,
    asset_id: Option<AssetId>,
    user_id: UserId,
    err: AssetRepositoryError,
) -> Error {
    let asset_id = asset_id.map(AssetId::get);
    let user_id = user_id.get();
    match err {
        AssetRepositoryError::NotFoundOrNotOwned => {
            Error::not_found("asset not found or not owned by user")
        }
        AssetRepositoryError::Missing { .. } => Error::not_found("asset not found"),
        AssetRepositoryError::Connection { .. } => {
            warn!(operation, asset_id, user_id, error = %err, "asset store unavailable");
            Error::service_unavailable("asset store unavailable")
        }
        AssetRepositoryError::Query { .. } | AssetRepositoryError::Constraint { .. } => {
            error!(operation, asset_id, user_id, error = %err, "asset store failure");
            Error::internal(err.to_string())
        }
    }
}

fn purchase_failure(err: PurchaseError, asset_id: AssetId, buyer_id: UserId) -> Error {
    match err {
        PurchaseError::AssetNotFound { .. } => Error::not_found("asset not found"),
        PurchaseError::OwnAsset { .. } => Error::invalid_operation("cannot purchase own asset"),
        PurchaseError::Store(store) => store_failure("purchase", Some(asset_id), buyer_id, store),
    }
}

#[async_trait]
impl<R> AssetMarketplace for AssetService<R>
where
    R: AssetRepository + ?Sized,
{
    async fn create_asset(&self, asset: NewAsset) -> Result<AssetId, Error> {
        let owner_id = asset.owner_id();
        let asset_id = self
            .assets
            .create(&asset)
            .await
            .map_err(|err| store_failure("create", None, owner_id, err))?;
        info!(asset_id = asset_id.get(), owner_id = owner_id.get(), "asset created");
        Ok(asset_id)
    }

    async fn delete_asset(&self, asset_id: AssetId, owner_id: UserId) -> Result<(), Error> {
        self.assets
            .delete_owned(asset_id, owner_id)
            .await
            .map_err(|err| store_failure("delete", Some(asset_id), owner_id, err))?;
        info!(asset_id = asset_id.get(), owner_id = owner_id.get(), "asset deleted");
        Ok(())
    }

    async fn purchase_asset(
        &self,
        asset_id: AssetId,
        buyer_id: UserId,
    ) -> Result<OwnershipTransfer, Error> {
        self.purchase(asset_id, buyer_id)
            .await
            .map_err(|err| purchase_failure(err, asset_id, buyer_id))
    }

    async fn list_assets(&self, owner_id: UserId) -> Result<Vec<Asset>, Error> {
        self.assets
            .list_by_owner(owner_id)
            .await
            .map_err(|err| store_failure("list", None, owner_id, err))
    }
}

#[cfg(test)]
#[path = "asset_service_tests.rs"]
mod tests;
