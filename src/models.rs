use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Labels an item may carry on the menu.
pub const ITEM_LABELS: [&str; 3] = ["best-seller", "new", "tasty"];

/// Display colours accepted for an item label.
pub const LABEL_COLOURS: [&str; 4] = ["danger", "success", "primary", "info"];

/// Fulfilment status of a placed cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Active,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Active => "active",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// Operator forms post capitalized values ("Delivered"), so parsing is
    /// case-insensitive. Unknown values yield `None`, not an error.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "active" => Some(OrderStatus::Active),
            "delivered" => Some(OrderStatus::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_operator: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Item {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: i64,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub image: Option<String>,
    pub label: Option<String>,
    pub label_colour: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CartLine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub ordered: bool,
    pub status: String,
    pub ordered_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub slug: String,
    pub review: String,
    pub posted_on: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
