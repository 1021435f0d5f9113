use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::wishlist::{AddToWishlistRequest, MoveToCartRequest, WishlistCheck},
    entity::{
        products::Entity as Products,
        wishlist_items::{self, Column as WishCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, WishlistItem},
    response::{ApiResponse, Meta},
    services::{cart_service, product_service},
    state::AppState,
};

pub async fn list_wishlist(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<WishlistItem>>> {
    let rows: Vec<_> = WishlistItems::find()
        .filter(WishCol::UserId.eq(user.user_id))
        .order_by_desc(WishCol::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .filter_map(|(item, product)| product.map(|p| (item, p)))
        .collect();

    let (items, models): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let products = product_service::load_products(&state.orm, models).await?;
    let data = items
        .into_iter()
        .zip(products)
        .map(|(item, product)| WishlistItem {
            id: item.id,
            product_id: item.product_id,
            product,
            created_at: item.created_at.with_timezone(&Utc),
        })
        .collect();
    Ok(ApiResponse::success("Wishlist", data, Some(Meta::empty())))
}

pub async fn add_to_wishlist(
    state: &AppState,
    user: &AuthUser,
    payload: AddToWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product = cart_service::sellable_product(&state.orm, payload.product_id).await?;

    let exists = WishlistItems::find()
        .filter(WishCol::UserId.eq(user.user_id))
        .filter(WishCol::ProductId.eq(product.id))
        .one(&state.orm)
        .await?
        .is_some();
    if exists {
        return Err(AppError::bad_request("Product already in wishlist"));
    }

    let item = wishlist_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        product_id: Set(product.id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    let product = product_service::load_product(&state.orm, product).await?;
    Ok(ApiResponse::success(
        "Added to wishlist",
        WishlistItem {
            id: item.id,
            product_id: item.product_id,
            product,
            created_at: item.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = WishlistItems::delete_many()
        .filter(WishCol::Id.eq(id))
        .filter(WishCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::not_found("Wishlist item"));
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Merge the wishlisted product into the cart and drop the wishlist row in one
/// transaction.
pub async fn move_to_cart(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: MoveToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let txn = state.orm.begin().await?;

    let item = WishlistItems::find_by_id(id)
        .filter(WishCol::UserId.eq(user.user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Wishlist item"))?;
    let product = cart_service::sellable_product(&txn, item.product_id).await?;

    let cart_item =
        cart_service::merge_into_cart(&txn, user.user_id, product.id, payload.quantity).await?;
    WishlistItems::delete_by_id(item.id).exec(&txn).await?;

    let loaded = product_service::load_product(&txn, product).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "wishlist_move_to_cart",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": cart_item.product_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Moved to cart",
        CartItem {
            id: cart_item.id,
            product_id: cart_item.product_id,
            quantity: cart_item.quantity,
            total_price: loaded.effective_price * i64::from(cart_item.quantity),
            product: loaded,
            created_at: cart_item.created_at.with_timezone(&Utc),
        },
        Some(Meta::empty()),
    ))
}

pub async fn check_wishlist(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    let in_wishlist = WishlistItems::find()
        .filter(WishCol::UserId.eq(user.user_id))
        .filter(WishCol::ProductId.eq(product_id))
        .one(&state.orm)
        .await?
        .is_some();
    Ok(ApiResponse::success(
        "Wishlist check",
        WishlistCheck { in_wishlist },
        Some(Meta::empty()),
    ))
}
