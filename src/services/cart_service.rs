use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartLineDto, CartView},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartLine, Item},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct CartLineWithItemRow {
    line_id: Uuid,
    quantity: i32,
    item_id: Uuid,
    created_by: Uuid,
    title: String,
    slug: String,
    description: Option<String>,
    price: i64,
    pieces: Option<i32>,
    instructions: Option<String>,
    image: Option<String>,
    label: Option<String>,
    label_colour: Option<String>,
    item_created_at: DateTime<Utc>,
    item_updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CartTotalsRow {
    total: Option<i64>,
    count: Option<i64>,
    total_pieces: Option<i64>,
}

impl CartLineWithItemRow {
    fn into_dto(self) -> CartLineDto {
        CartLineDto {
            id: self.line_id,
            item: Item {
                id: self.item_id,
                created_by: self.created_by,
                title: self.title,
                slug: self.slug,
                description: self.description,
                price: self.price,
                pieces: self.pieces,
                instructions: self.instructions,
                image: self.image,
                label: self.label,
                label_colour: self.label_colour,
                created_at: self.item_created_at,
                updated_at: self.item_updated_at,
            },
            quantity: self.quantity,
        }
    }
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartLine>> {
    let item: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM items WHERE slug = $1")
        .bind(payload.slug.as_str())
        .fetch_optional(&state.pool)
        .await?;
    let item_id = match item {
        Some((id,)) => id,
        None => return Err(AppError::NotFound),
    };

    // Always a fresh line: repeated adds stack up as separate rows rather
    // than merging into one line with a higher quantity.
    let line: CartLine = sqlx::query_as(
        "INSERT INTO cart_items (id, user_id, item_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(item_id)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "line_id": line.id, "slug": payload.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to cart", line, None))
}

pub async fn view_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartView>> {
    let rows = sqlx::query_as::<_, CartLineWithItemRow>(
        r#"
        SELECT ci.id AS line_id, ci.quantity,
               i.id AS item_id, i.created_by, i.title, i.slug, i.description, i.price,
               i.pieces, i.instructions, i.image, i.label, i.label_colour,
               i.created_at AS item_created_at, i.updated_at AS item_updated_at
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE ci.user_id = $1 AND ci.ordered = FALSE
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    // SUM over an empty cart comes back NULL; the view keeps the absent
    // totals instead of failing.
    let totals: CartTotalsRow = sqlx::query_as(
        r#"
        SELECT SUM(i.price)::BIGINT AS total,
               SUM(ci.quantity)::BIGINT AS count,
               SUM(i.pieces)::BIGINT AS total_pieces
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE ci.user_id = $1 AND ci.ordered = FALSE
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let lines: Vec<CartLineDto> = rows.into_iter().map(CartLineWithItemRow::into_dto).collect();

    let meta = Meta::new(lines.len() as i64);
    let view = CartView {
        lines,
        total: totals.total,
        count: totals.count,
        total_pieces: totals.total_pieces,
    };
    Ok(ApiResponse::success("OK", view, Some(meta)))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let owner: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM cart_items WHERE id = $1")
        .bind(line_id)
        .fetch_optional(&state.pool)
        .await?;
    match owner {
        None => return Err(AppError::NotFound),
        Some((owner_id,)) if owner_id != user.user_id => return Err(AppError::Forbidden),
        Some(_) => {}
    }

    // The owner predicate rides in the DELETE as well, so a concurrent
    // change cannot slip another user's line through.
    let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
        .bind(line_id)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "line_id": line_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
