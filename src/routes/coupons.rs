use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::coupons::{CouponValidation, CreateCouponRequest, ValidateCouponQuery},
    error::AppResult,
    middleware::{
        auth::AuthUser,
        validation::{ValidQuery, ValidatedJson},
    },
    models::Coupon,
    response::ApiResponse,
    services::coupon_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route("/validate", get(validate_coupon))
}

#[utoipa::path(
    post,
    path = "/api/coupons",
    request_body = CreateCouponRequest,
    responses(
        (status = 201, description = "Coupon created", body = ApiResponse<Coupon>),
        (status = 400, description = "Invalid coupon or duplicate code")
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateCouponRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Coupon>>)> {
    let resp = coupon_service::create_coupon(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/coupons",
    responses((status = 200, description = "All coupons", body = ApiResponse<Vec<Coupon>>)),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<Coupon>>>> {
    let resp = coupon_service::list_coupons(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/coupons/validate",
    params(ValidateCouponQuery),
    responses((status = 200, description = "Whether the coupon applies", body = ApiResponse<CouponValidation>)),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn validate_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    ValidQuery(query): ValidQuery<ValidateCouponQuery>,
) -> AppResult<Json<ApiResponse<CouponValidation>>> {
    let resp = coupon_service::validate_coupon(&state, &user, query).await?;
    Ok(Json(resp))
}
