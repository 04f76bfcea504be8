use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post, put},
};

use crate::{
    dto::items::{CreateItemRequest, UpdateItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Item,
    response::ApiResponse,
    services::item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_item))
        .route("/{slug}", put(update_item))
        .route("/{slug}", delete(delete_item))
}

#[utoipa::path(
    post,
    path = "/api/items",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Create item", body = ApiResponse<Item>),
        (status = 400, description = "Invalid price, slug, label or colour"),
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = item_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/items/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Update own item", body = ApiResponse<Item>),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<Item>>> {
    let resp = item_service::update_item(&state, &user, &slug, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/items/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 200, description = "Delete own item and its cart lines and reviews", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Not the item owner"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = item_service::delete_item(&state, &user, &slug).await?;
    Ok(Json(resp))
}
