mod common;

use chrono::{Duration, Utc};
use common::NewProduct;
use home_store_api::{
    dto::{
        cart::AddToCartRequest,
        coupons::{CreateCouponRequest, ValidateCouponQuery},
        orders::{CheckoutRequest, UpdateOrderStatusRequest},
    },
    error::AppError,
    models::{DiscountType, OrderStatus, Role},
    routes::params::{OrderListQuery, StockNotificationQuery},
    services::{cart_service, coupon_service, order_service, product_service, stock_service},
};

fn checkout_request(coupon_code: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "1 Main St, Springfield".into(),
        billing_address: None,
        payment_method: Some("card".into()),
        coupon_code: coupon_code.map(Into::into),
    }
}

fn coupon(code: &str) -> CreateCouponRequest {
    CreateCouponRequest {
        code: code.into(),
        description: Some("Ten percent off".into()),
        discount_type: DiscountType::Percentage,
        discount_value: 10,
        min_order_amount: 5_000,
        max_discount_amount: Some(500),
        usage_limit: Some(100),
        valid_from: Utc::now() - Duration::days(1),
        valid_to: Utc::now() + Duration::days(30),
        is_active: true,
    }
}

// Shopper fills a cart, checks out with a coupon; admin ships the order and
// sees the stock alert raised by the sale.
#[tokio::test]
async fn checkout_with_coupon_then_admin_ships() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;
    let category = common::create_category(&state, "Kitchen").await?;
    let kettle = common::create_product(
        &state,
        NewProduct::new("Kettle", "KT-1", category.id, 4_000).stock(11),
    )
    .await?;

    coupon_service::create_coupon(&state, &admin, coupon("save10")).await?;

    let preview = coupon_service::validate_coupon(
        &state,
        &user,
        ValidateCouponQuery {
            code: "SAVE10".into(),
            subtotal: 8_000,
        },
    )
    .await?
    .data
    .expect("validation");
    assert!(preview.valid);
    assert_eq!(preview.discount_amount, 500);

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: kettle.id,
            quantity: 2,
        },
    )
    .await?;

    let order = order_service::checkout(&state, &user, checkout_request(Some("Save10")))
        .await?
        .data
        .expect("order");
    assert!(order.order_number.starts_with("ORD-"));
    assert_eq!(order.total_amount, 8_640);
    assert_eq!(order.discount_amount, 500);
    assert_eq!(order.final_amount, 8_140);
    assert_eq!(order.status, "Pending");
    assert_eq!(order.payment_status, "Pending");
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 4_000);
    assert_eq!(order.items[0].total_price, 8_000);

    let kettle_now = product_service::get_product(&state, kettle.id)
        .await?
        .data
        .expect("product");
    assert_eq!(kettle_now.stock, 9);
    assert!(cart_service::list_cart(&state, &user).await?.data.expect("items").is_empty());

    let notes = stock_service::list_notifications(&state, &admin, StockNotificationQuery::default())
        .await?
        .data
        .expect("notifications");
    assert!(notes.iter().any(|n| n.product_id == kettle.id));

    let reuse = coupon_service::validate_coupon(
        &state,
        &user,
        ValidateCouponQuery {
            code: "save10".into(),
            subtotal: 8_000,
        },
    )
    .await?
    .data
    .expect("validation");
    assert!(!reuse.valid);
    assert_eq!(reuse.message, "Coupon already used");

    let mine = order_service::list_orders(&state, &user, OrderListQuery::default()).await?;
    assert_eq!(mine.data.expect("orders").len(), 1);
    assert_eq!(mine.meta.and_then(|m| m.total), Some(1));

    let forbidden = order_service::update_order_status(
        &state,
        &user,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
            payment_status: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(forbidden, AppError::Forbidden));

    let shipped = order_service::update_order_status(
        &state,
        &admin,
        order.id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Shipped,
            payment_status: Some("Paid".into()),
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(shipped.status, "Shipped");
    assert_eq!(shipped.payment_status, "Paid");
    assert!(shipped.shipped_date.is_some());
    assert!(shipped.delivered_date.is_none());

    let all = order_service::list_all_orders(
        &state,
        &admin,
        OrderListQuery {
            status: Some("Shipped".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("orders");
    assert_eq!(all.len(), 1);

    // Ordered products cannot be deleted.
    let err = product_service::delete_product(&state, &admin, kettle.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref m) if m == "Cannot delete product with existing orders"));
    Ok(())
}

#[tokio::test]
async fn checkout_refuses_empty_cart_and_short_stock() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let other = common::create_user(&state, "other@example.com", Role::User).await?;
    let category = common::create_category(&state, "Decor").await?;
    let lamp = common::create_product(
        &state,
        NewProduct::new("Lamp", "LM-1", category.id, 12_000).stock(1),
    )
    .await?;

    let empty = order_service::checkout(&state, &user, checkout_request(None))
        .await
        .unwrap_err();
    assert!(matches!(empty, AppError::BadRequest(ref m) if m == "Cart is empty"));

    cart_service::add_to_cart(
        &state,
        &user,
        AddToCartRequest {
            product_id: lamp.id,
            quantity: 2,
        },
    )
    .await?;
    let short = order_service::checkout(&state, &user, checkout_request(None))
        .await
        .unwrap_err();
    assert!(matches!(short, AppError::BadRequest(ref m) if m == "Insufficient stock for Lamp"));

    // Nothing was committed.
    let lamp_now = product_service::get_product(&state, lamp.id)
        .await?
        .data
        .expect("product");
    assert_eq!(lamp_now.stock, 1);
    assert_eq!(cart_service::list_cart(&state, &user).await?.data.expect("items").len(), 1);

    let bad_coupon = {
        cart_service::clear_cart(&state, &user).await?;
        cart_service::add_to_cart(
            &state,
            &user,
            AddToCartRequest {
                product_id: lamp.id,
                quantity: 1,
            },
        )
        .await?;
        order_service::checkout(&state, &user, checkout_request(Some("NOPE")))
            .await
            .unwrap_err()
    };
    assert!(matches!(bad_coupon, AppError::BadRequest(ref m) if m == "Invalid coupon code"));

    let order = order_service::checkout(&state, &user, checkout_request(None))
        .await?
        .data
        .expect("order");
    assert_eq!(order.discount_amount, 0);
    assert_eq!(order.final_amount, order.total_amount);

    let hidden = order_service::get_order(&state, &other, order.id)
        .await
        .unwrap_err();
    assert!(matches!(hidden, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn coupon_usage_limit_holds_across_shoppers() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;
    let first = common::create_user(&state, "first@example.com", Role::User).await?;
    let second = common::create_user(&state, "second@example.com", Role::User).await?;
    let category = common::create_category(&state, "Bath").await?;
    let towel = common::create_product(
        &state,
        NewProduct::new("Towel", "TW-1", category.id, 2_000).stock(10),
    )
    .await?;

    let coupon = coupon_service::create_coupon(
        &state,
        &admin,
        CreateCouponRequest {
            min_order_amount: 0,
            usage_limit: Some(1),
            ..coupon("once")
        },
    )
    .await?
    .data
    .expect("coupon");

    cart_service::add_to_cart(
        &state,
        &first,
        AddToCartRequest {
            product_id: towel.id,
            quantity: 1,
        },
    )
    .await?;
    let order = order_service::checkout(&state, &first, checkout_request(Some("ONCE")))
        .await?
        .data
        .expect("order");
    assert!(order.discount_amount > 0);

    cart_service::add_to_cart(
        &state,
        &second,
        AddToCartRequest {
            product_id: towel.id,
            quantity: 1,
        },
    )
    .await?;
    let refused = order_service::checkout(&state, &second, checkout_request(Some("ONCE")))
        .await
        .unwrap_err();
    assert!(
        matches!(refused, AppError::BadRequest(ref m) if m == "Coupon is expired or no longer available")
    );

    // The counter itself refuses to pass the limit.
    let over = coupon_service::record_usage(&state.orm, second.user_id, coupon.id)
        .await
        .unwrap_err();
    assert!(matches!(over, AppError::BadRequest(_)));
    Ok(())
}

#[tokio::test]
async fn coupon_preview_rejects_out_of_range_subtotal() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;

    for subtotal in [i64::MAX, -1] {
        let err = coupon_service::validate_coupon(
            &state,
            &user,
            ValidateCouponQuery {
                code: "SAVE10".into(),
                subtotal,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
    Ok(())
}
