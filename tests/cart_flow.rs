mod common;

use common::NewProduct;
use home_store_api::{
    dto::{
        cart::{AddToCartRequest, MAX_LINE_QUANTITY, UpdateCartItemRequest},
        wishlist::{AddToWishlistRequest, MoveToCartRequest},
    },
    error::AppError,
    models::Role,
    services::{cart_service, wishlist_service},
};

#[tokio::test]
async fn cart_merges_lines_and_summarizes_totals() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let category = common::create_category(&state, "Kitchen").await?;
    let mugs = common::create_product(
        &state,
        NewProduct::new("Mug Set", "M-1", category.id, 2_000).discount(1_500),
    )
    .await?;
    let skillet = common::create_product(&state, NewProduct::new("Skillet", "S-1", category.id, 4_000)).await?;

    let add = |product_id, quantity| AddToCartRequest {
        product_id,
        quantity,
    };
    let line = cart_service::add_to_cart(&state, &user, add(mugs.id, 1))
        .await?
        .data
        .expect("cart item");
    let merged = cart_service::add_to_cart(&state, &user, add(mugs.id, 1))
        .await?
        .data
        .expect("cart item");
    assert_eq!(merged.id, line.id);
    assert_eq!(merged.quantity, 2);
    assert_eq!(merged.total_price, 3_000);

    let small = cart_service::cart_summary(&state, &user).await?.data.expect("summary");
    assert_eq!(small.subtotal, 3_000);
    assert_eq!(small.tax, 240);
    assert_eq!(small.shipping, 1_000);
    assert_eq!(small.total, 4_240);

    cart_service::add_to_cart(&state, &user, add(skillet.id, 1)).await?;
    let summary = cart_service::cart_summary(&state, &user).await?.data.expect("summary");
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.subtotal, 7_000);
    assert_eq!(summary.tax, 560);
    assert_eq!(summary.shipping, 0);
    assert_eq!(summary.total, 7_560);

    let updated = cart_service::update_cart_item(
        &state,
        &user,
        line.id,
        UpdateCartItemRequest { quantity: 5 },
    )
    .await?
    .data
    .expect("cart item");
    assert_eq!(updated.quantity, 5);

    cart_service::remove_cart_item(&state, &user, line.id).await?;
    let items = cart_service::list_cart(&state, &user).await?.data.expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, skillet.id);

    cart_service::clear_cart(&state, &user).await?;
    let empty = cart_service::cart_summary(&state, &user).await?.data.expect("summary");
    assert_eq!(empty.total_items, 0);
    assert_eq!(empty.shipping, 0);
    assert_eq!(empty.total, 0);
    Ok(())
}

#[tokio::test]
async fn cart_items_are_private_and_products_must_be_sellable() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let owner = common::create_user(&state, "owner@example.com", Role::User).await?;
    let other = common::create_user(&state, "other@example.com", Role::User).await?;
    let category = common::create_category(&state, "Decor").await?;
    let vase = common::create_product(&state, NewProduct::new("Vase", "V-1", category.id, 1_000)).await?;

    let line = cart_service::add_to_cart(
        &state,
        &owner,
        AddToCartRequest {
            product_id: vase.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .expect("cart item");

    let err = cart_service::remove_cart_item(&state, &other, line.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = cart_service::add_to_cart(
        &state,
        &owner,
        AddToCartRequest {
            product_id: uuid::Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn wishlist_rejects_duplicates_and_moves_to_cart() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let category = common::create_category(&state, "Furniture").await?;
    let sofa = common::create_product(&state, NewProduct::new("Sofa", "SO-1", category.id, 80_000)).await?;

    let entry = wishlist_service::add_to_wishlist(
        &state,
        &user,
        AddToWishlistRequest { product_id: sofa.id },
    )
    .await?
    .data
    .expect("wishlist item");

    let dup = wishlist_service::add_to_wishlist(
        &state,
        &user,
        AddToWishlistRequest { product_id: sofa.id },
    )
    .await
    .unwrap_err();
    assert!(matches!(dup, AppError::BadRequest(ref m) if m == "Product already in wishlist"));

    let check = wishlist_service::check_wishlist(&state, &user, sofa.id)
        .await?
        .data
        .expect("check");
    assert!(check.in_wishlist);

    let moved = wishlist_service::move_to_cart(&state, &user, entry.id, MoveToCartRequest { quantity: 2 })
        .await?
        .data
        .expect("cart item");
    assert_eq!(moved.quantity, 2);
    assert_eq!(moved.total_price, 160_000);

    assert!(wishlist_service::list_wishlist(&state, &user).await?.data.expect("items").is_empty());
    let cart = cart_service::list_cart(&state, &user).await?.data.expect("items");
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0].product_id, sofa.id);

    let err = wishlist_service::remove_from_wishlist(&state, &user, entry.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn cart_line_quantity_is_bounded() -> anyhow::Result<()> {
    use validator::Validate;

    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let category = common::create_category(&state, "Garden").await?;
    let pots = common::create_product(&state, NewProduct::new("Pots", "P-1", category.id, 500)).await?;

    let add = |quantity| AddToCartRequest {
        product_id: pots.id,
        quantity,
    };
    assert!(add(MAX_LINE_QUANTITY).validate().is_ok());
    assert!(add(MAX_LINE_QUANTITY + 1).validate().is_err());
    assert!(add(i32::MAX).validate().is_err());
    assert!(UpdateCartItemRequest { quantity: i32::MAX }.validate().is_err());
    assert!(MoveToCartRequest { quantity: i32::MAX }.validate().is_err());

    cart_service::add_to_cart(&state, &user, add(i32::MAX)).await?;
    let err = cart_service::add_to_cart(&state, &user, add(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref m) if m == "Quantity is too large"));

    cart_service::clear_cart(&state, &user).await?;
    cart_service::add_to_cart(&state, &user, add(600)).await?;
    let err = cart_service::add_to_cart(&state, &user, add(600))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let lines = cart_service::list_cart(&state, &user).await?.data.expect("items");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 600);
    Ok(())
}
