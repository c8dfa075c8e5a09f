//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, test as actix_test, web};

use crate::Trace;
use crate::domain::ports::{MockAccountService, MockAssetMarketplace};
use crate::domain::{Error, UserId};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;

/// Build the `/v1` API over mocked driving ports. `None` installs a mock
/// with no expectations, so any call to it fails the test.
pub fn test_app(
    assets: Option<MockAssetMarketplace>,
    accounts: Option<MockAccountService>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        Arc::new(assets.unwrap_or_default()),
        Arc::new(accounts.unwrap_or_default()),
    );
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .configure(configure_api)
}

/// Account mock accepting `token-<id>` bearer tokens for any positive id.
pub fn token_accounts() -> MockAccountService {
    let mut accounts = MockAccountService::new();
    accounts.expect_authenticate().returning(|token| {
        token
            .strip_prefix("token-")
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|raw| UserId::new(raw).ok())
            .ok_or_else(|| Error::unauthorized("invalid access token"))
    });
    accounts
}

/// `Authorization` header for the user accepted by [`token_accounts`].
pub fn bearer_for(user_id: i64) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer token-{user_id}"))
}

/// Decode an error payload from a response.
pub async fn error_body(res: ServiceResponse) -> Error {
    actix_test::read_body_json(res).await
}
