use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, UpdateOrderStatusRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{self, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderStatus},
    pricing,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{cart_service, coupon_service, stock_service},
    state::AppState,
};

fn build_order_number(id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix: String = id.simple().to_string().chars().take(8).collect();
    format!("ORD-{date}-{}", suffix.to_uppercase())
}

async fn with_items<C: ConnectionTrait>(conn: &C, orders: Vec<OrderModel>) -> AppResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let mut items: HashMap<Uuid, Vec<order_items::Model>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(ids))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(conn)
        .await?
    {
        items.entry(item.order_id).or_default().push(item);
    }
    Ok(orders
        .into_iter()
        .map(|o| {
            let lines = items.remove(&o.id).unwrap_or_default();
            Order::from_parts(o, lines)
        })
        .collect())
}

/// Turn the caller's cart into an order. Validation, stock decrement, coupon
/// bookkeeping and clearing the cart share one transaction.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<Order>> {
    let txn = state.orm.begin().await?;

    let lines = cart_service::cart_lines(&txn, user.user_id).await?;
    if lines.is_empty() {
        return Err(AppError::bad_request("Cart is empty"));
    }

    let product_ids: Vec<Uuid> = lines.iter().map(|(item, _)| item.product_id).collect();
    let locked: HashMap<Uuid, _> = Products::find()
        .filter(ProductCol::Id.is_in(product_ids))
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    for (item, product) in &lines {
        let current = locked.get(&product.id).unwrap_or(product);
        if !current.is_active {
            return Err(AppError::bad_request(format!(
                "{} is no longer available",
                current.name
            )));
        }
        if current.stock < item.quantity {
            return Err(AppError::bad_request(format!(
                "Insufficient stock for {}",
                current.name
            )));
        }
    }

    let summary = cart_service::summarize(&lines);
    let total_amount = summary.total;

    let coupon = match payload.coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(code) => Some(
            coupon_service::resolve_coupon(&txn, user.user_id, code, summary.subtotal, total_amount)
                .await?,
        ),
        None => None,
    };
    let discount_amount = coupon.as_ref().map(|(_, d)| *d).unwrap_or(0);

    let now = Utc::now();
    let order_id = Uuid::new_v4();
    let order = orders::ActiveModel {
        id: Set(order_id),
        user_id: Set(user.user_id),
        order_number: Set(build_order_number(order_id)),
        total_amount: Set(total_amount),
        discount_amount: Set(discount_amount),
        final_amount: Set(total_amount - discount_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        payment_status: Set("Pending".into()),
        payment_method: Set(payload.payment_method),
        shipping_address: Set(payload.shipping_address.trim().to_string()),
        billing_address: Set(payload.billing_address),
        order_date: Set(now.into()),
        shipped_date: Set(None),
        delivered_date: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (item, product) in &lines {
        let unit_price = pricing::effective_price(product.price, product.discount_price);
        let line = order_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            quantity: Set(item.quantity),
            unit_price: Set(unit_price),
            total_price: Set(unit_price * i64::from(item.quantity)),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        items.push(line);

        Products::update_many()
            .col_expr(ProductCol::Stock, Expr::col(ProductCol::Stock).sub(item.quantity))
            .filter(ProductCol::Id.eq(product.id))
            .exec(&txn)
            .await?;

        if let Some(updated) = Products::find_by_id(product.id).one(&txn).await? {
            stock_service::notify_if_low(&txn, &updated).await?;
        }
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    if let Some((coupon, _)) = &coupon {
        coupon_service::record_usage(&txn, user.user_id, coupon.id).await?;
    }

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        final_amount = order.final_amount,
        "order placed"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        Order::from_parts(order, items),
        Some(Meta::empty()),
    ))
}

async fn paged_orders(
    state: &AppState,
    condition: Condition,
    query: &OrderListQuery,
    message: &str,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = condition;
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let finder = Orders::find()
        .filter(condition)
        .order_by_desc(OrderCol::OrderDate);
    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let orders = with_items(&state.orm, models).await?;

    Ok(ApiResponse::success(
        message,
        orders,
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    paged_orders(state, condition, &query, "Orders").await
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<Vec<Order>>> {
    ensure_admin(user)?;
    paged_orders(state, Condition::all(), &query, "All orders").await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .filter(OrderCol::UserId.eq(user.user_id))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let order = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(ApiResponse::success("Order", order, Some(Meta::empty())))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let now = Utc::now();
    let shipped_date = order.shipped_date;
    let delivered_date = order.delivered_date;
    let mut active: orders::ActiveModel = order.into();
    active.status = Set(payload.status.as_str().to_string());
    match payload.status {
        OrderStatus::Shipped => active.shipped_date = Set(shipped_date.or(Some(now.into()))),
        OrderStatus::Delivered => {
            active.shipped_date = Set(shipped_date.or(Some(now.into())));
            active.delivered_date = Set(delivered_date.or(Some(now.into())));
        }
        _ => {}
    }
    if let Some(payment_status) = payload.payment_status.filter(|s| !s.trim().is_empty()) {
        active.payment_status = Set(payment_status);
    }
    active.updated_at = Set(now.into());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await;

    let order = with_items(&state.orm, vec![order])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Order"))?;
    Ok(ApiResponse::success("Order updated", order, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::build_order_number;
    use uuid::Uuid;

    #[test]
    fn order_number_has_date_and_suffix() {
        let number = build_order_number(Uuid::new_v4());
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), "ORD-20260101-ABCDEF12".len());
    }
}
