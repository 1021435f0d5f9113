use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::CreateReviewRequest,
    entity::{
        product_reviews::{self, Column as ReviewCol, Entity as ProductReviews},
        products::{self, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Review,
    pricing,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<Vec<Review>>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let items: Vec<Review> = ProductReviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .filter(ReviewCol::IsApproved.eq(true))
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();
    Ok(ApiResponse::success("Reviews", items, Some(Meta::empty())))
}

/// New reviews wait for approval before they count towards the rating.
pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let duplicate = ProductReviews::find()
        .filter(ReviewCol::ProductId.eq(product_id))
        .filter(ReviewCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .is_some();
    if duplicate {
        return Err(AppError::bad_request("You have already reviewed this product"));
    }

    let now = Utc::now();
    let review = product_reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        user_id: Set(user.user_id),
        rating: Set(payload.rating),
        review_text: Set(payload.review_text),
        is_approved: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "review_create",
        Some("product_reviews"),
        Some(serde_json::json!({ "review_id": review.id, "product_id": product_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Review submitted",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

/// Approve a review and recompute the product's rating from approved reviews.
pub async fn approve_review(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Review>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let review = ProductReviews::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Review"))?;

    let mut active: product_reviews::ActiveModel = review.into();
    active.is_approved = Set(true);
    active.updated_at = Set(Utc::now().into());
    let review = active.update(&txn).await?;

    let ratings: Vec<i32> = ProductReviews::find()
        .filter(ReviewCol::ProductId.eq(review.product_id))
        .filter(ReviewCol::IsApproved.eq(true))
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| r.rating)
        .collect();
    let (rating, count) = average_rating(&ratings);

    if let Some(product) = Products::find_by_id(review.product_id).one(&txn).await? {
        let mut product: products::ActiveModel = product.into();
        product.rating = Set(rating);
        product.review_count = Set(count);
        product.updated_at = Set(Utc::now().into());
        product.update(&txn).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "review_approve",
        Some("product_reviews"),
        Some(serde_json::json!({ "review_id": review.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Review approved",
        Review::from(review),
        Some(Meta::empty()),
    ))
}

fn average_rating(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (pricing::round2(mean), ratings.len() as i32)
}
