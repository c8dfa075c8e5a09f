//! Builders wiring storage adapters into the HTTP driving ports.

use std::sync::Arc;

use actix_web::web;

use marketplace::domain::ports::{
    AccessTokenService, AccountService, AssetMarketplace, AssetRepository, UserRepository,
};
use marketplace::domain::{AssetService, UserAccountService};
use marketplace::inbound::http::state::HttpState;
use marketplace::outbound::memory::{InMemoryAssetRepository, InMemoryUserRepository};
use marketplace::outbound::persistence::{DieselAssetRepository, DieselUserRepository};
use marketplace::outbound::security::{BcryptPasswordHasher, JwtAccessTokens};

use super::config::{ServerConfig, Storage};

/// Select the asset and account stores for the configured backend.
fn build_repositories(storage: &Storage) -> (Arc<dyn AssetRepository>, Arc<dyn UserRepository>) {
    match storage {
        Storage::Postgres { pool, lock_timeout } => {
            let assets = DieselAssetRepository::new(pool.clone());
            let assets = match lock_timeout {
                Some(timeout) => assets.with_lock_timeout(*timeout),
                None => assets,
            };
            (
                Arc::new(assets),
                Arc::new(DieselUserRepository::new(pool.clone())),
            )
        }
        Storage::InMemory => (
            Arc::new(InMemoryAssetRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        ),
    }
}

/// Build the shared handler state from server configuration.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (asset_repo, user_repo) = build_repositories(&config.storage);
    let tokens: Arc<dyn AccessTokenService> = Arc::new(JwtAccessTokens::new(
        config.token_secret.as_slice(),
        config.token_ttl,
    ));

    let assets: Arc<dyn AssetMarketplace> = Arc::new(AssetService::new(asset_repo));
    let accounts: Arc<dyn AccountService> = Arc::new(UserAccountService::new(
        user_repo,
        Arc::new(BcryptPasswordHasher::new()),
        tokens,
    ));
    web::Data::new(HttpState::new(assets, accounts))
}
