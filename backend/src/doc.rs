//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint, the request/response bodies and
//! the domain error schema wrappers, plus the bearer token security scheme.
//! The document backs Swagger UI and `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::accounts::{CredentialsRequest, RegisteredResponse, TokenResponse};
use crate::inbound::http::assets::{AssetResponse, CreateAssetRequest, CreatedAssetResponse};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Name of the bearer security scheme in the document.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the JWT bearer security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by POST /v1/auth/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Asset marketplace API",
        description = "Register, log in, list assets and transfer ownership by purchase."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::assets::create_asset,
        crate::inbound::http::assets::list_assets,
        crate::inbound::http::assets::delete_asset,
        crate::inbound::http::assets::purchase_asset,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CredentialsRequest,
        RegisteredResponse,
        TokenResponse,
        CreateAssetRequest,
        CreatedAssetResponse,
        AssetResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "accounts", description = "Registration and login"),
        (name = "assets", description = "Asset listing, creation, deletion and purchase"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
