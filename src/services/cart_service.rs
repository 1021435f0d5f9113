use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, MAX_LINE_QUANTITY, UpdateCartItemRequest},
    entity::{
        cart_items::{self, Column as CartCol, Entity as CartItems},
        products::{self, Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    pricing::{self, CartSummary},
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

/// The user's cart rows paired with their products, oldest first.
pub async fn cart_lines<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<(cart_items::Model, products::Model)>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(item, product)| product.map(|p| (item, p)))
        .collect())
}

async fn to_cart_items<C: ConnectionTrait>(
    conn: &C,
    lines: Vec<(cart_items::Model, products::Model)>,
) -> AppResult<Vec<CartItem>> {
    let (items, models): (Vec<_>, Vec<_>) = lines.into_iter().unzip();
    let products = product_service::load_products(conn, models).await?;
    Ok(items
        .into_iter()
        .zip(products)
        .map(|(item, product)| CartItem {
            id: item.id,
            product_id: item.product_id,
            quantity: item.quantity,
            total_price: product.effective_price.saturating_mul(i64::from(item.quantity)),
            product,
            created_at: item.created_at.with_timezone(&Utc),
        })
        .collect())
}

async fn to_cart_item<C: ConnectionTrait>(
    conn: &C,
    item: cart_items::Model,
    product: products::Model,
) -> AppResult<CartItem> {
    to_cart_items(conn, vec![(item, product)])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Cart item"))
}

/// Product must exist and be active.
pub async fn sellable_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> AppResult<products::Model> {
    Products::find_by_id(product_id)
        .filter(ProductCol::IsActive.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

/// Add `quantity` to the user's line for the product, creating it if absent.
pub async fn merge_into_cart<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> AppResult<cart_items::Model> {
    let existing = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.eq(product_id))
        .one(conn)
        .await?;

    let now = Utc::now();
    let item = match existing {
        Some(item) => {
            let merged = item
                .quantity
                .checked_add(quantity)
                .filter(|merged| *merged <= MAX_LINE_QUANTITY)
                .ok_or_else(|| AppError::bad_request("Quantity is too large"))?;
            let mut active: cart_items::ActiveModel = item.into();
            active.quantity = Set(merged);
            active.updated_at = Set(now.into());
            active.update(conn).await?
        }
        None => {
            cart_items::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                product_id: Set(product_id),
                quantity: Set(quantity),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            }
            .insert(conn)
            .await?
        }
    };
    Ok(item)
}

async fn own_item(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<cart_items::Model> {
    CartItems::find_by_id(id)
        .filter(CartCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item"))
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Vec<CartItem>>> {
    let lines = cart_lines(&state.orm, user.user_id).await?;
    let items = to_cart_items(&state.orm, lines).await?;
    Ok(ApiResponse::success("Cart", items, Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let product = sellable_product(&state.orm, payload.product_id).await?;
    let item = merge_into_cart(&state.orm, user.user_id, product.id, payload.quantity).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product.id, "quantity": payload.quantity })),
    )
    .await;

    let item = to_cart_item(&state.orm, item, product).await?;
    Ok(ApiResponse::success("Added to cart", item, Some(Meta::empty())))
}

pub async fn update_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    let item = own_item(state, user, id).await?;
    let product = Products::find_by_id(item.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    let mut active: cart_items::ActiveModel = item.into();
    active.quantity = Set(payload.quantity);
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    let item = to_cart_item(&state.orm, item, product).await?;
    Ok(ApiResponse::success("Cart updated", item, Some(Meta::empty())))
}

pub async fn remove_cart_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let item = own_item(state, user, id).await?;
    CartItems::delete_by_id(item.id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": item.product_id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;
    Ok(ApiResponse::success(
        "Cart cleared",
        serde_json::json!({ "removed": result.rows_affected }),
        Some(Meta::empty()),
    ))
}

pub fn summarize(lines: &[(cart_items::Model, products::Model)]) -> CartSummary {
    CartSummary::from_lines(lines.iter().map(|(item, product)| {
        (
            pricing::effective_price(product.price, product.discount_price),
            item.quantity,
        )
    }))
}

pub async fn cart_summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CartSummary>> {
    let lines = cart_lines(&state.orm, user.user_id).await?;
    Ok(ApiResponse::success(
        "Cart summary",
        summarize(&lines),
        Some(Meta::empty()),
    ))
}
