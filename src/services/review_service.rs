use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::reviews::AddReviewRequest,
    entity::{
        items::{Column as ItemCol, Entity as Items},
        reviews::{ActiveModel as ReviewActive, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn add_review(
    state: &AppState,
    user: &AuthUser,
    slug: &str,
    payload: AddReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    if payload.review.trim().is_empty() {
        return Err(AppError::Validation(
            "Review text must not be empty".to_string(),
        ));
    }

    let item = Items::find()
        .filter(ItemCol::Slug.eq(slug))
        .one(&state.orm)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    // The slug is copied from the item at posting time; several reviews of
    // the same item share it.
    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        item_id: Set(item.id),
        slug: Set(item.slug.clone()),
        review: Set(payload.review),
        posted_on: Set(Utc::now().into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "review_add",
        Some("reviews"),
        Some(serde_json::json!({ "review_id": review.id, "slug": review.slug })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Thanks for your review!",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
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
