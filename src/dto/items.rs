use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Item, Review};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub image: Option<String>,
    pub label: Option<String>,
    pub label_colour: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub pieces: Option<i32>,
    pub instructions: Option<String>,
    pub image: Option<String>,
    pub label: Option<String>,
    pub label_colour: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ItemList {
    #[schema(value_type = Vec<Item>)]
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemDetail {
    pub item: Item,
    pub reviews: Vec<Review>,
}
