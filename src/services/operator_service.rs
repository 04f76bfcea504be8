use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::items::ItemList,
    dto::operator::{
        DashboardSummary, FulfilmentLineDto, FulfilmentList, ItemOrderCount, UpdateStatusRequest,
        UpdateStatusResponse,
    },
    entity::items::{Column as ItemCol, Entity as Items, Model as ItemModel},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_operator},
    models::{Item, OrderStatus},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(FromRow)]
struct FulfilmentRow {
    id: Uuid,
    item_title: String,
    quantity: i32,
    customer_email: String,
    status: String,
    ordered_date: Option<DateTime<Utc>>,
    delivery_date: Option<DateTime<Utc>>,
}

#[derive(FromRow)]
struct DashboardTotalsRow {
    pending_total: i64,
    completed_total: i64,
    income: Option<i64>,
}

#[derive(FromRow)]
struct ItemOrderCountRow {
    item_id: Uuid,
    title: String,
    placed: i64,
}

pub async fn pending_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FulfilmentList>> {
    ensure_operator(user)?;
    let items = fulfilment_lines(state, user.user_id, OrderStatus::Active).await?;
    let meta = Meta::new(items.len() as i64);
    Ok(ApiResponse::success(
        "Pending orders",
        FulfilmentList { items },
        Some(meta),
    ))
}

pub async fn delivered_orders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FulfilmentList>> {
    ensure_operator(user)?;
    let items = fulfilment_lines(state, user.user_id, OrderStatus::Delivered).await?;
    let meta = Meta::new(items.len() as i64);
    Ok(ApiResponse::success(
        "Delivered orders",
        FulfilmentList { items },
        Some(meta),
    ))
}

/// Move one placed line to delivered. Ownership, placement and the active
/// state are all conditions of the UPDATE itself, so a line that was
/// concurrently delivered (or never belonged to the caller) simply matches
/// nothing; the caller learns that through `transitioned`, not an error.
/// Any requested status other than "delivered" is accepted and ignored.
pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    line_id: Uuid,
    payload: UpdateStatusRequest,
) -> AppResult<ApiResponse<UpdateStatusResponse>> {
    ensure_operator(user)?;

    let transitioned = match OrderStatus::parse(&payload.status) {
        Some(OrderStatus::Delivered) => {
            let result = sqlx::query(
                r#"
                UPDATE cart_items ci
                SET status = 'delivered', delivery_date = NOW(), updated_at = NOW()
                FROM items i
                WHERE i.id = ci.item_id
                  AND ci.id = $1
                  AND i.created_by = $2
                  AND ci.ordered = TRUE
                  AND ci.status = 'active'
                "#,
            )
            .bind(line_id)
            .bind(user.user_id)
            .execute(&state.pool)
            .await?;
            result.rows_affected() > 0
        }
        _ => false,
    };

    if transitioned {
        if let Err(err) = log_audit(
            &state.pool,
            Some(user.user_id),
            "order_delivered",
            Some("cart_items"),
            Some(serde_json::json!({ "line_id": line_id })),
        )
        .await
        {
            tracing::warn!(error = %err, "audit log failed");
        }
    }

    Ok(ApiResponse::success(
        "OK",
        UpdateStatusResponse { transitioned },
        Some(Meta::empty()),
    ))
}

pub async fn dashboard(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardSummary>> {
    ensure_operator(user)?;

    let totals: DashboardTotalsRow = sqlx::query_as(
        r#"
        SELECT COUNT(*) FILTER (WHERE ci.status = 'active') AS pending_total,
               COUNT(*) FILTER (WHERE ci.status = 'delivered') AS completed_total,
               SUM(i.price)::BIGINT AS income
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE i.created_by = $1 AND ci.ordered = TRUE
        "#,
    )
    .bind(user.user_id)
    .fetch_one(&state.pool)
    .await?;

    let per_item = sqlx::query_as::<_, ItemOrderCountRow>(
        r#"
        SELECT i.id AS item_id, i.title, COUNT(ci.id) AS placed
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        WHERE i.created_by = $1 AND ci.ordered = TRUE
        GROUP BY i.id, i.title
        ORDER BY placed DESC, i.title ASC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?
    .into_iter()
    .map(|row| ItemOrderCount {
        item_id: row.item_id,
        title: row.title,
        placed: row.placed,
    })
    .collect();

    let summary = DashboardSummary {
        pending_total: totals.pending_total,
        completed_total: totals.completed_total,
        income: totals.income,
        per_item,
    };
    Ok(ApiResponse::success("Dashboard", summary, Some(Meta::empty())))
}

/// Items created by the requesting operator.
pub async fn list_items(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ItemList>> {
    ensure_operator(user)?;

    let items: Vec<Item> = Items::find()
        .filter(ItemCol::CreatedBy.eq(user.user_id))
        .order_by_desc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    let meta = Meta::new(items.len() as i64);
    Ok(ApiResponse::success("Items", ItemList { items }, Some(meta)))
}

fn item_from_entity(model: ItemModel) -> Item {
    Item {
        id: model.id,
        created_by: model.created_by,
        title: model.title,
        slug: model.slug,
        description: model.description,
        price: model.price,
        pieces: model.pieces,
        instructions: model.instructions,
        image: model.image,
        label: model.label,
        label_colour: model.label_colour,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

async fn fulfilment_lines(
    state: &AppState,
    owner_id: Uuid,
    status: OrderStatus,
) -> AppResult<Vec<FulfilmentLineDto>> {
    let rows = sqlx::query_as::<_, FulfilmentRow>(
        r#"
        SELECT ci.id, i.title AS item_title, ci.quantity, u.email AS customer_email,
               ci.status, ci.ordered_date, ci.delivery_date
        FROM cart_items ci
        JOIN items i ON i.id = ci.item_id
        JOIN users u ON u.id = ci.user_id
        WHERE i.created_by = $1 AND ci.ordered = TRUE AND ci.status = $2
        ORDER BY ci.ordered_date DESC
        "#,
    )
    .bind(owner_id)
    .bind(status.as_str())
    .fetch_all(&state.pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| FulfilmentLineDto {
            id: row.id,
            item_title: row.item_title,
            quantity: row.quantity,
            customer_email: row.customer_email,
            status: row.status,
            ordered_date: row.ordered_date,
            delivery_date: row.delivery_date,
        })
        .collect())
}
