use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::items::{CreateItemRequest, ItemDetail, ItemList, UpdateItemRequest},
    entity::{
        items::{ActiveModel, Column as ItemCol, Entity as Items, Model as ItemModel},
        reviews::{Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{ITEM_LABELS, Item, LABEL_COLOURS, Review},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// How many of the newest reviews ride along with an item detail.
pub const RECENT_REVIEWS: u64 = 7;

/// Lowercase the title and collapse anything that is not alphanumeric into
/// single dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Empty strings clear the field; anything else must be one of the allowed
/// values.
fn validate_choice(
    value: Option<String>,
    allowed: &[&str],
    field: &str,
) -> AppResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => {
            if allowed.contains(&v.as_str()) {
                Ok(Some(v))
            } else {
                Err(AppError::Validation(format!("invalid {field}: {v}")))
            }
        }
    }
}

pub async fn list_menu(state: &AppState) -> AppResult<ApiResponse<ItemList>> {
    let items: Vec<Item> = Items::find()
        .order_by_desc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    let meta = Meta::new(items.len() as i64);
    Ok(ApiResponse::success("Menu", ItemList { items }, Some(meta)))
}

pub async fn menu_detail(state: &AppState, slug: &str) -> AppResult<ApiResponse<ItemDetail>> {
    let item = Items::find()
        .filter(ItemCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    let reviews: Vec<Review> = Reviews::find()
        .filter(ReviewCol::Slug.eq(slug))
        .order_by_desc(ReviewCol::CreatedAt)
        .limit(RECENT_REVIEWS)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();

    let detail = ItemDetail {
        item: item_from_entity(item),
        reviews,
    };
    Ok(ApiResponse::success("Item", detail, Some(Meta::empty())))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    if payload.price < 0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    let label = validate_choice(payload.label, &ITEM_LABELS, "label")?;
    let label_colour = validate_choice(payload.label_colour, &LABEL_COLOURS, "label colour")?;

    let slug = match payload.slug {
        Some(s) if !s.is_empty() => s,
        _ => slugify(&payload.title),
    };
    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(
            "slug must be a non-empty URL-safe string".into(),
        ));
    }

    let exist = Items::find()
        .filter(ItemCol::Slug.eq(slug.as_str()))
        .one(&state.orm)
        .await?;
    if exist.is_some() {
        return Err(AppError::Validation("slug is already taken".to_string()));
    }

    let active = ActiveModel {
        id: Set(Uuid::new_v4()),
        created_by: Set(user.user_id),
        title: Set(payload.title),
        slug: Set(slug),
        description: Set(payload.description),
        price: Set(payload.price),
        pieces: Set(payload.pieces),
        instructions: Set(payload.instructions),
        image: Set(payload.image),
        label: Set(label),
        label_colour: Set(label_colour),
        created_at: NotSet,
        updated_at: NotSet,
    };
    let item = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_create",
        Some("items"),
        Some(serde_json::json!({ "item_id": item.id, "slug": item.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item created",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<Item>> {
    let existing = Items::find()
        .filter(ItemCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    if existing.created_by != user.user_id {
        return Err(AppError::Forbidden);
    }

    let mut active = <ActiveModel as Default>::default();
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(new_slug) = payload.slug {
        if !is_valid_slug(&new_slug) {
            return Err(AppError::Validation(
                "slug must be a non-empty URL-safe string".into(),
            ));
        }
        if new_slug != existing.slug {
            let taken = Items::find()
                .filter(ItemCol::Slug.eq(new_slug.as_str()))
                .one(&state.orm)
                .await?;
            if taken.is_some() {
                return Err(AppError::Validation("slug is already taken".to_string()));
            }
        }
        active.slug = Set(new_slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        if price < 0 {
            return Err(AppError::Validation("price must not be negative".into()));
        }
        active.price = Set(price);
    }
    if let Some(pieces) = payload.pieces {
        active.pieces = Set(Some(pieces));
    }
    if let Some(instructions) = payload.instructions {
        active.instructions = Set(Some(instructions));
    }
    if let Some(image) = payload.image {
        active.image = Set(Some(image));
    }
    if let Some(label) = payload.label {
        active.label = Set(validate_choice(Some(label), &ITEM_LABELS, "label")?);
    }
    if let Some(label_colour) = payload.label_colour {
        active.label_colour = Set(validate_choice(
            Some(label_colour),
            &LABEL_COLOURS,
            "label colour",
        )?);
    }
    active.updated_at = Set(Utc::now().into());

    // The ownership predicate is part of the UPDATE itself, not only of the
    // read above; the read exists to tell NotFound from Forbidden.
    let result = Items::update_many()
        .set(active)
        .filter(ItemCol::Id.eq(existing.id))
        .filter(ItemCol::CreatedBy.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    let updated = Items::find_by_id(existing.id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_update",
        Some("items"),
        Some(serde_json::json!({ "item_id": updated.id, "slug": updated.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item updated",
        item_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let existing = Items::find()
        .filter(ItemCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let existing = match existing {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };
    if existing.created_by != user.user_id {
        return Err(AppError::Forbidden);
    }

    // Cart lines and reviews go with the item through the cascade.
    let result = Items::delete_many()
        .filter(ItemCol::Id.eq(existing.id))
        .filter(ItemCol::CreatedBy.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "item_delete",
        Some("items"),
        Some(serde_json::json!({ "item_id": existing.id, "slug": existing.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Item deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
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

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        user_id: model.user_id,
        item_id: model.item_id,
        slug: model.slug,
        review: model.review,
        posted_on: model.posted_on.with_timezone(&Utc),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
