use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Item;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub slug: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub item: Item,
    pub quantity: i32,
}

/// Open cart with its running totals. The sums come straight from SQL
/// aggregates and are null for an empty cart.
#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineDto>,
    pub total: Option<i64>,
    pub count: Option<i64>,
    pub total_pieces: Option<i64>,
}
