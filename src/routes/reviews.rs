use axum::{
    Json, Router,
    extract::State,
    routing::patch,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::{auth::AuthUser, validation::ValidPath},
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/approve", patch(approve_review))
}

#[utoipa::path(
    patch,
    path = "/api/reviews/{id}/approve",
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 200, description = "Review approved, product rating recomputed", body = ApiResponse<Review>),
        (status = 404, description = "Review not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn approve_review(
    State(state): State<AppState>,
    user: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::approve_review(&state, &user, id).await?;
    Ok(Json(resp))
}
