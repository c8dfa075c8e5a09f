//! Asset API handlers. All routes require a bearer token.
//!
//! ```text
//! POST   /v1/assets {"name":"Lamp","description":"brass","price":100.0}
//! GET    /v1/assets
//! DELETE /v1/assets/{id}
//! POST   /v1/assets/purchase/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Asset, NewAsset, Price};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{ASSET_ID, map_asset_validation_error, parse_asset_id};

/// Request body for `POST /v1/assets`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateAssetRequest {
    #[schema(example = "Lamp")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "brass desk lamp")]
    pub description: String,
    #[schema(example = 100.0)]
    pub price: f64,
}

/// Asset as returned by `GET /v1/assets`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct AssetResponse {
    pub id: i64,
    /// Current owner.
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl From<Asset> for AssetResponse {
    fn from(asset: Asset) -> Self {
        Self {
            id: asset.id.get(),
            user_id: asset.owner_id.get(),
            name: asset.name,
            description: asset.description,
            price: asset.price.get(),
        }
    }
}

/// Body returned after creation.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreatedAssetResponse {
    #[schema(example = 1)]
    pub id: i64,
}

/// List an owner's assets.
#[utoipa::path(
    get,
    path = "/v1/assets",
    responses(
        (status = 200, description = "Assets owned by the caller", body = [AssetResponse]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["assets"],
    operation_id = "listAssets"
)]
#[get("/assets")]
pub async fn list_assets(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<AssetResponse>>> {
    let assets = state.assets.list_assets(user.user_id()).await?;
    Ok(web::Json(assets.into_iter().map(AssetResponse::from).collect()))
}

/// Create an asset owned by the caller.
#[utoipa::path(
    post,
    path = "/v1/assets",
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = CreatedAssetResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["assets"],
    operation_id = "createAsset"
)]
#[post("/assets")]
pub async fn create_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateAssetRequest>,
) -> ApiResult<HttpResponse> {
    let CreateAssetRequest {
        name,
        description,
        price,
    } = payload.into_inner();
    let price = Price::new(price).map_err(map_asset_validation_error)?;
    let asset = NewAsset::new(user.user_id(), &name, &description, price)
        .map_err(map_asset_validation_error)?;
    let asset_id = state.assets.create_asset(asset).await?;
    Ok(HttpResponse::Created().json(CreatedAssetResponse { id: asset_id.get() }))
}

/// Delete an asset the caller owns.
#[utoipa::path(
    delete,
    path = "/v1/assets/{id}",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Asset deleted"),
        (status = 400, description = "Invalid asset id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Asset not found or not owned by caller", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["assets"],
    operation_id = "deleteAsset"
)]
#[delete("/assets/{id}")]
pub async fn delete_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let asset_id = parse_asset_id(&path, ASSET_ID)?;
    state.assets.delete_asset(asset_id, user.user_id()).await?;
    Ok(HttpResponse::Ok().finish())
}

/// Buy an asset, transferring ownership to the caller.
#[utoipa::path(
    post,
    path = "/v1/assets/purchase/{id}",
    params(("id" = i64, Path, description = "Asset id")),
    responses(
        (status = 200, description = "Ownership transferred"),
        (status = 400, description = "Invalid asset id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Asset not found", body = ErrorSchema),
        (status = 409, description = "Caller already owns the asset", body = ErrorSchema),
        (status = 503, description = "Asset store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["assets"],
    operation_id = "purchaseAsset"
)]
#[post("/assets/purchase/{id}")]
pub async fn purchase_asset(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let asset_id = parse_asset_id(&path, ASSET_ID)?;
    state.assets.purchase_asset(asset_id, user.user_id()).await?;
    Ok(HttpResponse::Ok().finish())
}
