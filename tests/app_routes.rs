mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use home_store_api::{app::build_app, models::Role, services::auth_service};
use sea_orm::EntityTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

const ORIGIN: &str = "http://localhost:4200";

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_and_unknown_routes() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = build_app(state, ORIGIN)?;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await?;
    assert_eq!(body["data"]["status"], "ok");

    let response = app
        .oneshot(Request::get("/nowhere").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = build_app(state, ORIGIN)?;

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await?;
    assert_eq!(body["message"], "Missing Authorization header");

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_shoppers() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let user = common::create_user(&state, "user@example.com", Role::User).await?;
    let model = home_store_api::entity::Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .expect("user row");
    let (token, _) = auth_service::issue_token(&state.jwt, &model)?;
    let app = build_app(state, ORIGIN)?;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/products/low-stock")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn invalid_bodies_are_rejected_with_field_errors() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = build_app(state, ORIGIN)?;

    let response = app
        .oneshot(
            Request::post("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "first_name": "Jane",
                        "last_name": "Doe",
                        "email": "not-an-email",
                        "password": "secret123",
                        "confirm_password": "different",
                    })
                    .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert!(body["data"]["fields"]["email"].is_array());
    assert!(body["data"]["fields"]["confirm_password"].is_array());
    Ok(())
}

#[tokio::test]
async fn malformed_path_and_query_values_get_json_errors() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let app = build_app(state, ORIGIN)?;

    let response = app
        .clone()
        .oneshot(Request::get("/api/products/not-a-uuid").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert!(body["message"].is_string());
    assert!(body["data"]["error"].is_string());

    let response = app
        .clone()
        .oneshot(Request::get("/api/products?page=abc").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert!(body["message"].is_string());

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/products?sort_by=bogus&sort_order=sideways")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/api/products?page=9223372036854775807&per_page=9223372036854775807")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}
