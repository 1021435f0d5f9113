use chrono::Utc;
use home_store_api::{
    client::{ClientError, ShopClient},
    models::{CartItem, Product},
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(message: &str, data: Value) -> Value {
    json!({ "message": message, "data": data, "meta": null })
}

fn user_json(role: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "first_name": "Jane",
        "last_name": "Doe",
        "full_name": "Jane Doe",
        "email": "jane@example.com",
        "phone_number": null,
        "address": null,
        "city": null,
        "state": null,
        "zip_code": null,
        "country": null,
        "role": role,
        "is_active": true,
        "created_at": Utc::now(),
    })
}

fn product(id: Uuid, price: i64) -> Product {
    let now = Utc::now();
    Product {
        id,
        name: "Mug".into(),
        description: None,
        price,
        discount_price: None,
        effective_price: price,
        is_on_sale: false,
        discount_percentage: 0.0,
        sku: "MUG-1".into(),
        stock: 20,
        min_stock_level: 10,
        is_low_stock: false,
        is_out_of_stock: false,
        category_id: Uuid::new_v4(),
        category_name: Some("Kitchen".into()),
        brand: None,
        color: None,
        material: None,
        dimensions: None,
        weight: None,
        rating: 0.0,
        review_count: 0,
        image_url: None,
        is_active: true,
        is_featured: false,
        images: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn cart_line(item_id: Uuid, product_id: Uuid, quantity: i32, price: i64) -> CartItem {
    CartItem {
        id: item_id,
        product_id,
        quantity,
        total_price: price * i64::from(quantity),
        product: product(product_id, price),
        created_at: Utc::now(),
    }
}

async fn signed_in(server: &MockServer, role: &str) -> ShopClient {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Login successful",
            json!({
                "token": "test-token",
                "expires_at": Utc::now(),
                "user": user_json(role),
            }),
        )))
        .mount(server)
        .await;

    let client = ShopClient::new(server.uri());
    client
        .login("jane@example.com", "secret123")
        .await
        .expect("login");
    client
}

#[tokio::test]
async fn login_stores_session_and_logout_clears_it() {
    let server = MockServer::start().await;
    let client = signed_in(&server, "Admin").await;

    assert!(client.is_authenticated().await);
    assert!(client.is_admin().await);
    assert_eq!(
        client.current_user().await.map(|u| u.email),
        Some("jane@example.com".to_string())
    );

    client.logout().await;
    assert!(!client.is_authenticated().await);
    assert!(!client.is_admin().await);
    assert!(matches!(
        client.cart_items().await,
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn server_errors_surface_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(envelope(
            "Invalid email or password",
            json!({ "error": "Invalid email or password" }),
        )))
        .mount(&server)
        .await;

    let client = ShopClient::new(server.uri());
    let err = client.login("jane@example.com", "wrong").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!client.is_authenticated().await);
}

#[tokio::test]
async fn categories_are_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "Categories",
            json!([{
                "id": Uuid::new_v4(),
                "name": "Kitchen",
                "description": null,
                "image_url": null,
                "is_active": true,
                "product_count": 3,
                "created_at": Utc::now(),
            }]),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = ShopClient::new(server.uri());
    let first = client.categories().await.expect("categories");
    let second = client.categories().await.expect("categories");
    assert_eq!(first.len(), 1);
    assert_eq!(second[0].product_count, 3);
}

#[tokio::test]
async fn quick_add_bumps_an_existing_line() {
    let server = MockServer::start().await;
    let client = signed_in(&server, "User").await;

    let item_id = Uuid::new_v4();
    let product_id = Uuid::new_v4();
    let before = vec![cart_line(item_id, product_id, 1, 1_200)];
    let after = vec![cart_line(item_id, product_id, 3, 1_200)];

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope("Cart", json!(before))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/api/cart/{item_id}")))
        .and(body_json(json!({ "quantity": 3 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Cart item updated", json!({}))))
        .expect(1)
        .mount(&server)
        .await;

    let items = client.cart_items().await.expect("cart");
    assert_eq!(items.len(), 1);
    assert!(client.is_in_cart(product_id).await);
    assert!(!client.is_in_cart(Uuid::new_v4()).await);

    Mock::given(method("GET"))
        .and(path("/api/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Cart", json!(after))))
        .mount(&server)
        .await;

    client
        .quick_add_to_cart(product_id, 2)
        .await
        .expect("quick add");
    assert_eq!(client.cart_item_count().await, 3);
    assert_eq!(client.cart_subtotal().await, 3_600);
}

#[tokio::test]
async fn toggle_wishlist_adds_then_removes() {
    let server = MockServer::start().await;
    let client = signed_in(&server, "User").await;

    let entry_id = Uuid::new_v4();
    let product_id = Uuid::new_v4();
    let entry = json!([{
        "id": entry_id,
        "product_id": product_id,
        "product": product(product_id, 900),
        "created_at": Utc::now(),
    }]);

    Mock::given(method("POST"))
        .and(path("/api/wishlist"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope("Added to wishlist", json!({}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Wishlist", entry)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    assert!(client.toggle_wishlist(product_id).await.expect("toggle"));
    assert!(client.is_in_wishlist(product_id).await);

    Mock::given(method("DELETE"))
        .and(path(format!("/api/wishlist/{entry_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Removed from wishlist", json!({}))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope("Wishlist", json!([]))))
        .mount(&server)
        .await;

    assert!(!client.toggle_wishlist(product_id).await.expect("toggle"));
    assert!(!client.is_in_wishlist(product_id).await);
}
