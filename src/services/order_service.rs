use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderDetails, PlaceOrderResponse, PlacedLineDto},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Item, OrderStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct PlacedLineRow {
    line_id: Uuid,
    quantity: i32,
    status: String,
    ordered_date: Option<DateTime<Utc>>,
    delivery_date: Option<DateTime<Utc>>,
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
struct PlacedTotalsRow {
    total: Option<i64>,
    count: Option<i64>,
    total_pieces: Option<i64>,
}

impl PlacedLineRow {
    fn into_dto(self) -> PlacedLineDto {
        PlacedLineDto {
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
            status: self.status,
            ordered_date: self.ordered_date,
            delivery_date: self.delivery_date,
        }
    }
}

/// Submit the whole open cart as one order. Predicate and mutation travel in
/// a single UPDATE so two concurrent submissions cannot double-place a line.
pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    let result = sqlx::query(
        r#"
        UPDATE cart_items
        SET ordered = TRUE, ordered_date = NOW(), updated_at = NOW()
        WHERE user_id = $1 AND ordered = FALSE
        "#,
    )
    .bind(user.user_id)
    .execute(&state.pool)
    .await?;

    let placed = result.rows_affected();

    if placed > 0 {
        if let Err(err) = log_audit(
            &state.pool,
            Some(user.user_id),
            "order_placed",
            Some("cart_items"),
            Some(serde_json::json!({ "lines": placed })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }
    }

    // An empty cart places nothing and is still a success.
    Ok(ApiResponse::success(
        "Order placed",
        PlaceOrderResponse { placed },
        Some(Meta::empty()),
    ))
}

pub async fn order_details(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderDetails>> {
    let active = placed_lines(state, user.user_id, OrderStatus::Active).await?;
    let delivered = placed_lines(state, user.user_id, OrderStatus::Delivered).await?;

    // Running totals cover the still-active subset only.
    let totals: PlacedTotalsRow = sqlx::query_as(
        r#"
        SELECT SUM(i.price)::BIGINT AS total,
               SUM(ci.quantity)::BIGINT AS count,
               SUM(i.pieces)::BIGINT AS total_pieces
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE ci.user_id = $1 AND ci.ordered = TRUE AND ci.status = 'active'
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let details = OrderDetails {
        active,
        delivered,
        total: totals.total,
        count: totals.count,
        total_pieces: totals.total_pieces,
    };
    Ok(ApiResponse::success("OK", details, Some(Meta::empty())))
}

async fn placed_lines(
    state: &AppState,
    user_id: Uuid,
    status: OrderStatus,
) -> AppResult<Vec<PlacedLineDto>> {
    let rows = sqlx::query_as::<_, PlacedLineRow>(
        r#"
        SELECT ci.id AS line_id, ci.quantity, ci.status, ci.ordered_date, ci.delivery_date,
               i.id AS item_id, i.created_by, i.title, i.slug, i.description, i.price,
               i.pieces, i.instructions, i.image, i.label, i.label_colour,
               i.created_at AS item_created_at, i.updated_at AS item_updated_at
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE ci.user_id = $1 AND ci.ordered = TRUE AND ci.status = $2
        ORDER BY ci.ordered_date DESC
        "#,
    )
    .bind(user_id)
    .bind(status.as_str())
    .fetch_all(&state.pool)
    .await?;

    Ok(rows.into_iter().map(PlacedLineRow::into_dto).collect())
}
