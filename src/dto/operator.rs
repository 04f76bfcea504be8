use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    /// False when nothing matched: the line is not active, not placed, not
    /// on one of the caller's items, or the requested status was not
    /// "delivered". That outcome is a no-op, not an error.
    pub transitioned: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FulfilmentLineDto {
    pub id: Uuid,
    pub item_title: String,
    pub quantity: i32,
    pub customer_email: String,
    pub status: String,
    pub ordered_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FulfilmentList {
    #[schema(value_type = Vec<FulfilmentLineDto>)]
    pub items: Vec<FulfilmentLineDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemOrderCount {
    pub item_id: Uuid,
    pub title: String,
    pub placed: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub pending_total: i64,
    pub completed_total: i64,
    pub income: Option<i64>,
    pub per_item: Vec<ItemOrderCount>,
}
