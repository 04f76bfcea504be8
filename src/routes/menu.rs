use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::items::{ItemDetail, ItemList},
    dto::reviews::AddReviewRequest,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    services::{item_service, review_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu))
        .route("/{slug}", get(menu_detail))
        .route("/{slug}/reviews", post(add_review))
}

#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "List menu items, newest first", body = ApiResponse<ItemList>)
    ),
    tag = "Menu"
)]
pub async fn list_menu(State(state): State<AppState>) -> AppResult<Json<ApiResponse<ItemList>>> {
    let resp = item_service::list_menu(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu/{slug}",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    responses(
        (status = 200, description = "Item with its most recent reviews", body = ApiResponse<ItemDetail>),
        (status = 404, description = "Item not found"),
    ),
    tag = "Menu"
)]
pub async fn menu_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ItemDetail>>> {
    let resp = item_service::menu_detail(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menu/{slug}/reviews",
    params(
        ("slug" = String, Path, description = "Item slug")
    ),
    request_body = AddReviewRequest,
    responses(
        (status = 200, description = "Review posted", body = ApiResponse<Review>),
        (status = 400, description = "Empty review text"),
        (status = 404, description = "Item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu"
)]
pub async fn add_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(slug): Path<String>,
    Json(payload): Json<AddReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::add_review(&state, &user, &slug, payload).await?;
    Ok(Json(resp))
}
