use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::wishlist::{AddToWishlistRequest, MoveToCartRequest, WishlistCheck},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        validation::{ValidPath, ValidatedJson},
    },
    models::{CartItem, WishlistItem},
    response::ApiResponse,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlist).post(add_to_wishlist))
        .route("/check/{product_id}", get(check_wishlist))
        .route("/{id}", delete(remove_from_wishlist))
        .route("/{id}/move-to-cart", post(move_to_cart))
}

#[utoipa::path(
    get,
    path = "/api/wishlist",
    responses((status = 200, description = "Wishlist for current user", body = ApiResponse<Vec<WishlistItem>>)),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn list_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<WishlistItem>>>> {
    let resp = wishlist_service::list_wishlist(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist",
    request_body = AddToWishlistRequest,
    responses(
        (status = 201, description = "Added", body = ApiResponse<WishlistItem>),
        (status = 400, description = "Product already in wishlist"),
        (status = 404, description = "Product not found or inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<AddToWishlistRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<WishlistItem>>)> {
    let resp = wishlist_service::add_to_wishlist(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/wishlist/{id}",
    params(("id" = Uuid, Path, description = "Wishlist item id")),
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Wishlist item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::remove_from_wishlist(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlist/{id}/move-to-cart",
    params(("id" = Uuid, Path, description = "Wishlist item id")),
    request_body = MoveToCartRequest,
    responses(
        (status = 200, description = "Moved to cart", body = ApiResponse<CartItem>),
        (status = 404, description = "Wishlist item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn move_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<MoveToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = wishlist_service::move_to_cart(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlist/check/{product_id}",
    params(("product_id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Whether the product is wishlisted", body = ApiResponse<WishlistCheck>)),
    security(("bearer_auth" = [])),
    tag = "Wishlist"
)]
pub async fn check_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(product_id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistCheck>>> {
    let resp = wishlist_service::check_wishlist(&state, &user, product_id).await?;
    Ok(Json(resp))
}
