use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Item;

#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedLineDto {
    pub id: Uuid,
    pub item: Item,
    pub quantity: i32,
    pub status: String,
    pub ordered_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
}

/// Placed lines split by fulfilment state. The running totals cover the
/// active subset only.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetails {
    pub active: Vec<PlacedLineDto>,
    pub delivered: Vec<PlacedLineDto>,
    pub total: Option<i64>,
    pub count: Option<i64>,
    pub total_pieces: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PlaceOrderResponse {
    /// Number of open lines the order submission moved to active.
    pub placed: u64,
}
