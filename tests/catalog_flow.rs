mod common;

use common::NewProduct;
use home_store_api::{
    dto::{
        categories::CategoryRequest,
        products::{
            AddProductImageRequest, BulkDeleteRequest, BulkProductRow, BulkStatusRequest,
            ProductRequest, UpdateStockRequest,
        },
        reviews::CreateReviewRequest,
    },
    error::AppError,
    models::Role,
    routes::params::{ProductQuery, ProductSortBy, SortOrder, StockNotificationQuery},
    services::{category_service, product_service, review_service, stock_service},
};

fn product_request(name: &str, sku: &str, category_id: uuid::Uuid) -> ProductRequest {
    ProductRequest {
        name: name.into(),
        description: None,
        price: 2500,
        discount_price: None,
        sku: sku.into(),
        stock: 30,
        min_stock_level: 10,
        category_id,
        brand: None,
        color: None,
        material: None,
        dimensions: None,
        weight: None,
        image_url: None,
        is_active: true,
        is_featured: false,
    }
}

fn bulk_row(name: &str, sku: &str, category: &str, price: i64) -> BulkProductRow {
    BulkProductRow {
        name: name.into(),
        description: None,
        price,
        discount_price: None,
        sku: sku.into(),
        stock: 5,
        category_name: category.into(),
        brand: None,
        color: None,
        material: None,
        dimensions: None,
        weight: None,
        image_url: None,
        is_featured: false,
    }
}

#[tokio::test]
async fn listing_filters_search_and_sorts() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let furniture = common::create_category(&state, "Furniture").await?;
    let kitchen = common::create_category(&state, "Kitchen").await?;

    common::create_product(&state, NewProduct::new("Oak Table", "T-1", furniture.id, 40_000).discount(35_000)).await?;
    common::create_product(&state, NewProduct::new("Pine Chair", "C-1", furniture.id, 9_000).stock(0)).await?;
    common::create_product(&state, NewProduct::new("Skillet", "K-1", kitchen.id, 4_000)).await?;

    let by_price = product_service::list_products(
        &state,
        ProductQuery {
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        },
    )
    .await?;
    let names: Vec<_> = by_price
        .data
        .expect("products")
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, ["Oak Table", "Pine Chair", "Skillet"]);
    assert_eq!(by_price.meta.and_then(|m| m.total), Some(3));

    let on_sale = product_service::list_products(
        &state,
        ProductQuery {
            is_on_sale: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    assert_eq!(on_sale.len(), 1);
    assert_eq!(on_sale[0].effective_price, 35_000);
    assert_eq!(on_sale[0].discount_percentage, 12.5);
    assert_eq!(on_sale[0].category_name.as_deref(), Some("Furniture"));

    let in_stock = product_service::list_products(
        &state,
        ProductQuery {
            category_id: Some(furniture.id),
            in_stock: Some(true),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    assert_eq!(in_stock.len(), 1);
    assert_eq!(in_stock[0].sku, "T-1");

    // Matches on category name too, case-insensitively.
    let found = product_service::search_products(
        &state,
        ProductQuery {
            search_term: Some("KITCH".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("products");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Skillet");

    let err = product_service::search_products(&state, ProductQuery::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref m) if m == "Search term is required"));

    let page = product_service::list_products(
        &state,
        ProductQuery {
            page: Some(2),
            per_page: Some(2),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.data.expect("products").len(), 1);
    let meta = page.meta.expect("meta");
    assert_eq!(meta.total_pages, Some(2));
    assert_eq!(meta.has_next_page, Some(false));
    Ok(())
}

#[tokio::test]
async fn admin_product_lifecycle() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;
    let shopper = common::create_user(&state, "user@example.com", Role::User).await?;
    let category = common::create_category(&state, "Decor").await?;

    let forbidden = product_service::create_product(
        &state,
        &shopper,
        product_request("Lamp", "L-1", category.id),
    )
    .await
    .unwrap_err();
    assert!(matches!(forbidden, AppError::Forbidden));

    let missing_category = product_service::create_product(
        &state,
        &admin,
        product_request("Lamp", "L-1", uuid::Uuid::new_v4()),
    )
    .await
    .unwrap_err();
    assert!(matches!(missing_category, AppError::BadRequest(ref m) if m == "Category does not exist"));

    let lamp = product_service::create_product(
        &state,
        &admin,
        product_request("Lamp", "L-1", category.id),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(lamp.rating, 0.0);

    let dup = product_service::create_product(
        &state,
        &admin,
        product_request("Other Lamp", "L-1", category.id),
    )
    .await
    .unwrap_err();
    assert!(matches!(dup, AppError::BadRequest(_)));

    let by_sku = product_service::get_product_by_sku(&state, "L-1")
        .await?
        .data
        .expect("product");
    assert_eq!(by_sku.id, lamp.id);

    // Dropping to the minimum level raises a notification.
    let updated = product_service::update_stock(
        &state,
        &admin,
        lamp.id,
        UpdateStockRequest { stock: 3 },
    )
    .await?
    .data
    .expect("product");
    assert!(updated.is_low_stock);

    let low = product_service::low_stock_products(&state, &admin)
        .await?
        .data
        .expect("products");
    assert!(low.iter().any(|p| p.id == lamp.id));

    let notes = stock_service::list_notifications(&state, &admin, StockNotificationQuery::default())
        .await?
        .data
        .expect("notifications");
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].product_id, lamp.id);

    stock_service::mark_read(&state, &admin, notes[0].id).await?;
    let unread = stock_service::list_notifications(&state, &admin, StockNotificationQuery::default())
        .await?
        .data
        .expect("notifications");
    assert!(unread.is_empty());

    product_service::delete_product(&state, &admin, lamp.id).await?;
    assert!(matches!(
        product_service::get_product(&state, lamp.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    Ok(())
}

#[tokio::test]
async fn images_keep_exactly_one_primary() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;
    let category = common::create_category(&state, "Decor").await?;
    let rug = common::create_product(&state, NewProduct::new("Rug", "R-1", category.id, 9_900)).await?;

    let image = |url: &str| AddProductImageRequest {
        image_url: url.into(),
        alt_text: None,
        is_primary: false,
        display_order: None,
    };

    let first = product_service::add_image(&state, &admin, rug.id, image("a.jpg"))
        .await?
        .data
        .expect("image");
    assert!(first.is_primary);
    let second = product_service::add_image(&state, &admin, rug.id, image("b.jpg"))
        .await?
        .data
        .expect("image");
    assert!(!second.is_primary);

    product_service::set_primary_image(&state, &admin, rug.id, second.id).await?;
    let product = product_service::get_product(&state, rug.id)
        .await?
        .data
        .expect("product");
    let primaries: Vec<_> = product.images.iter().filter(|i| i.is_primary).collect();
    assert_eq!(primaries.len(), 1);
    assert_eq!(primaries[0].id, second.id);

    product_service::delete_image(&state, &admin, rug.id, second.id).await?;
    let product = product_service::get_product(&state, rug.id)
        .await?
        .data
        .expect("product");
    assert_eq!(product.images.len(), 1);
    assert!(product.images[0].is_primary);
    Ok(())
}

#[tokio::test]
async fn categories_count_products_and_refuse_delete_when_in_use() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;

    let request = |name: &str| CategoryRequest {
        name: name.into(),
        description: None,
        image_url: None,
        is_active: true,
    };
    let lighting = category_service::create_category(&state, &admin, request("Lighting"))
        .await?
        .data
        .expect("category");
    let empty = category_service::create_category(&state, &admin, request("Outdoor"))
        .await?
        .data
        .expect("category");

    let dup = category_service::create_category(&state, &admin, request("Lighting"))
        .await
        .unwrap_err();
    assert!(matches!(dup, AppError::BadRequest(_)));

    common::create_product(&state, NewProduct::new("Lamp", "L-1", lighting.id, 5_000)).await?;

    let listed = category_service::list_categories(&state)
        .await?
        .data
        .expect("categories");
    let count_of = |name: &str| listed.iter().find(|c| c.name == name).map(|c| c.product_count);
    assert_eq!(count_of("Lighting"), Some(1));
    assert_eq!(count_of("Outdoor"), Some(0));

    let err = category_service::delete_category(&state, &admin, lighting.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(ref m) if m == "Cannot delete category with existing products"));

    category_service::delete_category(&state, &admin, empty.id).await?;
    assert!(matches!(
        category_service::get_category(&state, empty.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    Ok(())
}

#[tokio::test]
async fn approved_reviews_drive_rating() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;
    let alice = common::create_user(&state, "alice@example.com", Role::User).await?;
    let bob = common::create_user(&state, "bob@example.com", Role::User).await?;
    let category = common::create_category(&state, "Kitchen").await?;
    let pan = common::create_product(&state, NewProduct::new("Pan", "P-1", category.id, 3_000)).await?;

    let review = |rating| CreateReviewRequest {
        rating,
        review_text: None,
    };
    let first = review_service::create_review(&state, &alice, pan.id, review(5))
        .await?
        .data
        .expect("review");
    assert!(!first.is_approved);

    let again = review_service::create_review(&state, &alice, pan.id, review(1))
        .await
        .unwrap_err();
    assert!(matches!(again, AppError::BadRequest(ref m) if m == "You have already reviewed this product"));

    let second = review_service::create_review(&state, &bob, pan.id, review(4))
        .await?
        .data
        .expect("review");

    assert!(review_service::list_reviews(&state, pan.id).await?.data.expect("reviews").is_empty());

    review_service::approve_review(&state, &admin, first.id).await?;
    review_service::approve_review(&state, &admin, second.id).await?;

    let product = product_service::get_product(&state, pan.id)
        .await?
        .data
        .expect("product");
    assert_eq!(product.rating, 4.5);
    assert_eq!(product.review_count, 2);
    assert_eq!(review_service::list_reviews(&state, pan.id).await?.data.expect("reviews").len(), 2);
    Ok(())
}

#[tokio::test]
async fn bulk_operations_report_per_row() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let admin = common::create_user(&state, "admin@example.com", Role::Admin).await?;

    let result = product_service::bulk_upload(
        &state,
        &admin,
        vec![
            bulk_row("Vase", "V-1", "Decor", 2_000),
            bulk_row("Bad Price", "V-2", "Decor", 0),
            bulk_row("Vase Copy", "V-1", "Decor", 2_000),
            bulk_row("Bowl", "B-1", "Kitchen", 1_500),
        ],
    )
    .await?
    .data
    .expect("result");
    assert_eq!(result.total_processed, 4);
    assert_eq!(result.success_count, 2);
    assert_eq!(result.error_count, 2);
    assert!(result.errors[0].starts_with("Row 2:"));
    assert!(result.errors[1].starts_with("Row 3:"));

    let counts = product_service::category_product_counts(&state, &admin)
        .await?
        .data
        .expect("counts");
    assert_eq!(counts.counts.get("Decor"), Some(&1));
    assert_eq!(counts.counts.get("Kitchen"), Some(&1));

    let ids: Vec<_> = result.created_products.iter().map(|p| p.id).collect();
    let hidden = product_service::bulk_update_status(
        &state,
        &admin,
        BulkStatusRequest {
            product_ids: ids.clone(),
            is_active: false,
        },
    )
    .await?
    .data
    .expect("result");
    assert_eq!(hidden.affected, 2);

    let deleted = product_service::bulk_delete(&state, &admin, BulkDeleteRequest { product_ids: ids })
        .await?
        .data
        .expect("result");
    assert_eq!(deleted.affected, 2);
    Ok(())
}
