use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dto::orders::{OrderDetails, PlaceOrderResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(order_details).post(place_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 200, description = "Place every open cart line", body = ApiResponse<PlaceOrderResponse>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PlaceOrderResponse>>> {
    let resp = order_service::place_order(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Placed lines split by status, with totals over the active ones", body = ApiResponse<OrderDetails>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_details(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderDetails>>> {
    let resp = order_service::order_details(&state, &user).await?;
    Ok(Json(resp))
}
