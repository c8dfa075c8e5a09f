//! Driving port for marketplace use-cases.
//!
//! Inbound adapters call this port with an already authenticated user id and
//! receive transport-agnostic [`Error`] values.

use async_trait::async_trait;

use crate::domain::{Asset, AssetId, Error, NewAsset, OwnershipTransfer, UserId};

/// Asset lifecycle operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetMarketplace: Send + Sync {
    /// List an asset owned by its creator.
    async fn create_asset(&self, asset: NewAsset) -> Result<AssetId, Error>;

    /// Remove an asset owned by `owner_id`.
    async fn delete_asset(&self, asset_id: AssetId, owner_id: UserId) -> Result<(), Error>;

    /// Transfer ownership of an asset to `buyer_id`.
    async fn purchase_asset(
        &self,
        asset_id: AssetId,
        buyer_id: UserId,
    ) -> Result<OwnershipTransfer, Error>;

    /// Assets currently owned by `owner_id`.
    async fn list_assets(&self, owner_id: UserId) -> Result<Vec<Asset>, Error>;
}
