use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::items::ItemList,
    dto::operator::{
        DashboardSummary, FulfilmentList, UpdateStatusRequest, UpdateStatusResponse,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::operator_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/pending", get(pending_orders))
        .route("/orders/delivered", get(delivered_orders))
        .route("/orders/{id}/status", patch(update_status))
        .route("/dashboard", get(dashboard))
        .route("/items", get(list_items))
}

#[utoipa::path(
    get,
    path = "/api/operator/orders/pending",
    responses(
        (status = 200, description = "Active placed lines on the operator's items", body = ApiResponse<FulfilmentList>),
        (status = 403, description = "Not an operator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Operator"
)]
pub async fn pending_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FulfilmentList>>> {
    let resp = operator_service::pending_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/operator/orders/delivered",
    responses(
        (status = 200, description = "Delivered lines on the operator's items", body = ApiResponse<FulfilmentList>),
        (status = 403, description = "Not an operator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Operator"
)]
pub async fn delivered_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FulfilmentList>>> {
    let resp = operator_service::delivered_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/operator/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Cart line ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Whether the line moved to delivered", body = ApiResponse<UpdateStatusResponse>),
        (status = 403, description = "Not an operator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Operator"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<ApiResponse<UpdateStatusResponse>>> {
    let resp = operator_service::update_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/operator/dashboard",
    responses(
        (status = 200, description = "Pending and delivered totals, income and per-item counts", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Not an operator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Operator"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    let resp = operator_service::dashboard(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/operator/items",
    responses(
        (status = 200, description = "Items created by the operator", body = ApiResponse<ItemList>),
        (status = 403, description = "Not an operator"),
    ),
    security(("bearer_auth" = [])),
    tag = "Operator"
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ItemList>>> {
    let resp = operator_service::list_items(&state, &user).await?;
    Ok(Json(resp))
}
