//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountService, AssetMarketplace};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub assets: Arc<dyn AssetMarketplace>,
    pub accounts: Arc<dyn AccountService>,
}

impl HttpState {
    /// Construct state from the two driving ports.
    pub fn new(assets: Arc<dyn AssetMarketplace>, accounts: Arc<dyn AccountService>) -> Self {
        Self { assets, accounts }
    }
}
