use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        products::{
            AddProductImageRequest, BulkDeleteRequest, BulkResult, BulkStatusRequest,
            BulkUploadRequest, BulkUploadResult, CategoryCounts, ProductRequest,
            UpdateStockRequest,
        },
        reviews::CreateReviewRequest,
    },
    error::AppResult,
    middleware::{
        auth::AuthUser,
        validation::{ValidPath, ValidQuery, ValidatedJson},
    },
    models::{Product, ProductImage, Review, StockNotification},
    response::ApiResponse,
    routes::params::{CountQuery, ProductQuery, StockNotificationQuery},
    services::{product_service, review_service, stock_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/featured", get(featured_products))
        .route("/top-rated", get(top_rated_products))
        .route("/best-selling", get(best_selling_products))
        .route("/low-stock", get(low_stock_products))
        .route("/sku/{sku}", get(get_product_by_sku))
        .route("/category/{category_id}", get(products_by_category))
        .route("/bulk", delete(bulk_delete))
        .route("/bulk/upload", post(bulk_upload))
        .route("/bulk/status", patch(bulk_update_status))
        .route("/analytics/category-count", get(category_count))
        .route("/stock-notifications", get(list_stock_notifications))
        .route("/stock-notifications/{id}/read", patch(mark_notification_read))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/stock", patch(update_stock))
        .route("/{id}/related", get(related_products))
        .route("/{id}/reviews", get(list_reviews).post(create_review))
        .route("/{id}/images", post(add_image))
        .route("/{id}/images/{image_id}", delete(delete_image))
        .route("/{id}/images/{image_id}/primary", patch(set_primary_image))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Filtered, sorted, paginated products", body = ApiResponse<Vec<Product>>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::list_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(ProductQuery),
    responses(
        (status = 200, description = "Search results", body = ApiResponse<Vec<Product>>),
        (status = 400, description = "Missing search term")
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    ValidQuery(query): ValidQuery<ProductQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::search_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/sku/{sku}",
    params(("sku" = String, Path, description = "Stock keeping unit")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn get_product_by_sku(
    State(state): State<AppState>,
    ValidPath(sku): ValidPath<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::get_product_by_sku(&state, &sku).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/featured",
    params(CountQuery),
    responses((status = 200, description = "Featured products", body = ApiResponse<Vec<Product>>)),
    tag = "Products"
)]
pub async fn featured_products(
    State(state): State<AppState>,
    ValidQuery(count): ValidQuery<CountQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::featured_products(&state, count.or(10)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/category/{category_id}",
    params(("category_id" = Uuid, Path, description = "Category id"), CountQuery),
    responses((status = 200, description = "Products in category", body = ApiResponse<Vec<Product>>)),
    tag = "Products"
)]
pub async fn products_by_category(
    State(state): State<AppState>,
    ValidPath(category_id): ValidPath<Uuid>,
    ValidQuery(count): ValidQuery<CountQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::products_by_category(&state, category_id, count.or(20)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/related",
    params(("id" = Uuid, Path, description = "Product id"), CountQuery),
    responses(
        (status = 200, description = "Related products", body = ApiResponse<Vec<Product>>),
        (status = 404, description = "Product not found")
    ),
    tag = "Products"
)]
pub async fn related_products(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
    ValidQuery(count): ValidQuery<CountQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::related_products(&state, id, count.or(5)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/top-rated",
    params(CountQuery),
    responses((status = 200, description = "Top rated products", body = ApiResponse<Vec<Product>>)),
    tag = "Products"
)]
pub async fn top_rated_products(
    State(state): State<AppState>,
    ValidQuery(count): ValidQuery<CountQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::top_rated_products(&state, count.or(10)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/best-selling",
    params(CountQuery),
    responses((status = 200, description = "Best selling products", body = ApiResponse<Vec<Product>>)),
    tag = "Products"
)]
pub async fn best_selling_products(
    State(state): State<AppState>,
    ValidQuery(count): ValidQuery<CountQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::best_selling_products(&state, count.or(10)).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    responses((status = 200, description = "Approved reviews", body = ApiResponse<Vec<Review>>)),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<Vec<Review>>>> {
    let resp = review_service::list_reviews(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/reviews",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review submitted", body = ApiResponse<Review>),
        (status = 400, description = "Already reviewed")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Review>>)> {
    let resp = review_service::create_review(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Product>>)> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/stock",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateStockRequest,
    responses((status = 200, description = "Stock updated", body = ApiResponse<Product>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateStockRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_stock(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/low-stock",
    responses((status = 200, description = "Products at or below their minimum stock", body = ApiResponse<Vec<Product>>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn low_stock_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let resp = product_service::low_stock_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = AddProductImageRequest,
    responses((status = 201, description = "Image added", body = ApiResponse<ProductImage>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn add_image(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddProductImageRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ProductImage>>)> {
    let resp = product_service::add_image(&state, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses((status = 200, description = "Image deleted")),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath((id, image_id)): ValidPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = product_service::delete_image(&state, &user, id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/images/{image_id}/primary",
    params(
        ("id" = Uuid, Path, description = "Product id"),
        ("image_id" = Uuid, Path, description = "Image id")
    ),
    responses((status = 200, description = "Primary image set", body = ApiResponse<ProductImage>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn set_primary_image(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath((id, image_id)): ValidPath<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<ProductImage>>> {
    let resp = product_service::set_primary_image(&state, &user, id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/bulk/upload",
    request_body = BulkUploadRequest,
    responses((status = 200, description = "Per-row upload report", body = ApiResponse<BulkUploadResult>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn bulk_upload(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<BulkUploadRequest>,
) -> AppResult<Json<ApiResponse<BulkUploadResult>>> {
    let resp = product_service::bulk_upload(&state, &user, payload.products).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/bulk/status",
    request_body = BulkStatusRequest,
    responses((status = 200, description = "Products updated", body = ApiResponse<BulkResult>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn bulk_update_status(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<BulkStatusRequest>,
) -> AppResult<Json<ApiResponse<BulkResult>>> {
    let resp = product_service::bulk_update_status(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/products/bulk",
    request_body = BulkDeleteRequest,
    responses((status = 200, description = "Products deleted", body = ApiResponse<BulkResult>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn bulk_delete(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> AppResult<Json<ApiResponse<BulkResult>>> {
    let resp = product_service::bulk_delete(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/analytics/category-count",
    responses((status = 200, description = "Active products per category", body = ApiResponse<CategoryCounts>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn category_count(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryCounts>>> {
    let resp = product_service::category_product_counts(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/products/stock-notifications",
    params(StockNotificationQuery),
    responses((status = 200, description = "Stock notifications", body = ApiResponse<Vec<StockNotification>>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn list_stock_notifications(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(query): ValidQuery<StockNotificationQuery>,
) -> AppResult<Json<ApiResponse<Vec<StockNotification>>>> {
    let resp = stock_service::list_notifications(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/products/stock-notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification id")),
    responses((status = 200, description = "Marked as read", body = ApiResponse<StockNotification>)),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<StockNotification>>> {
    let resp = stock_service::mark_read(&state, &user, id).await?;
    Ok(Json(resp))
}
