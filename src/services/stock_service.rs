use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    entity::{
        products,
        stock_notifications::{self, Column as NoteCol, Entity as StockNotifications},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::StockNotification,
    response::{ApiResponse, Meta},
    routes::params::StockNotificationQuery,
    state::AppState,
};

/// Write a notification row when the product sits at or under its minimum
/// stock level. Returns whether a row was written.
pub async fn notify_if_low<C: ConnectionTrait>(
    conn: &C,
    product: &products::Model,
) -> AppResult<bool> {
    if product.stock > product.min_stock_level {
        return Ok(false);
    }

    let message = if product.stock <= 0 {
        format!("{} (SKU {}) is out of stock", product.name, product.sku)
    } else {
        format!(
            "{} (SKU {}) is low on stock: {} left, minimum {}",
            product.name, product.sku, product.stock, product.min_stock_level
        )
    };

    stock_notifications::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product.id),
        message: Set(message),
        is_read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    tracing::info!(product_id = %product.id, stock = product.stock, "low stock notification");
    Ok(true)
}

pub async fn list_notifications(
    state: &AppState,
    user: &AuthUser,
    query: StockNotificationQuery,
) -> AppResult<ApiResponse<Vec<StockNotification>>> {
    ensure_admin(user)?;
    let mut finder = StockNotifications::find().order_by_desc(NoteCol::CreatedAt);
    if query.unread_only.unwrap_or(true) {
        finder = finder.filter(NoteCol::IsRead.eq(false));
    }
    let items: Vec<StockNotification> = finder
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockNotification::from)
        .collect();
    Ok(ApiResponse::success("Stock notifications", items, Some(Meta::empty())))
}

pub async fn mark_read(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<StockNotification>> {
    ensure_admin(user)?;
    let note = StockNotifications::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Notification"))?;

    let mut active: stock_notifications::ActiveModel = note.into();
    active.is_read = Set(true);
    let note = active.update(&state.orm).await?;

    Ok(ApiResponse::success(
        "Notification marked as read",
        StockNotification::from(note),
        Some(Meta::empty()),
    ))
}
