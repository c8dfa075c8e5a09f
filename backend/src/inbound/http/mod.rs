//! HTTP inbound adapter exposing REST endpoints.
//!
//! ```text
//! POST   /v1/auth/register
//! POST   /v1/auth/login
//! POST   /v1/assets
//! GET    /v1/assets
//! DELETE /v1/assets/{id}
//! POST   /v1/assets/purchase/{id}
//! ```

use actix_web::web;

pub mod accounts;
pub mod assets;
pub mod auth;
pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

/// Maximum accepted JSON request body.
const JSON_LIMIT_BYTES: usize = 16 * 1024;

/// JSON extractor configuration reporting malformed bodies as
/// `invalid_request` payloads.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT_BYTES)
        .error_handler(|err, _req| validation::invalid_json_error(&err).into())
}

/// Register the versioned API under `/v1`.
///
/// Handlers expect `web::Data<HttpState>` in app data.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use marketplace::inbound::http::configure_api;
///
/// let app = App::new().configure(configure_api);
/// ```
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .app_data(json_config())
            .service(accounts::register)
            .service(accounts::login)
            .service(assets::create_asset)
            .service(assets::list_assets)
            .service(assets::purchase_asset)
            .service(assets::delete_asset),
    );
}
