use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::categories::CategoryRequest,
    entity::{
        categories::{self, Column as CategoryCol, Entity as Categories},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    services::product_service,
    state::AppState,
};

async fn find_category(state: &AppState, id: Uuid) -> AppResult<categories::Model> {
    Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))
}

async fn active_product_count(state: &AppState, id: Uuid) -> AppResult<i64> {
    let count = Products::find()
        .filter(ProductCol::CategoryId.eq(id))
        .filter(ProductCol::IsActive.eq(true))
        .count(&state.orm)
        .await?;
    Ok(count as i64)
}

async fn ensure_unique_name(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Categories::find().filter(CategoryCol::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(CategoryCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::bad_request(format!(
            "Category '{name}' already exists"
        )));
    }
    Ok(())
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<Vec<Category>>> {
    let counts = product_service::active_counts_by_category(&state.orm).await?;
    let items: Vec<Category> = Categories::find()
        .filter(CategoryCol::IsActive.eq(true))
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| {
            let count = counts.get(&c.id).copied().unwrap_or(0);
            Category::from_model(c, count)
        })
        .collect();
    Ok(ApiResponse::success("Categories", items, Some(Meta::empty())))
}

pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Category>> {
    let category = find_category(state, id).await?;
    let count = active_product_count(state, id).await?;
    Ok(ApiResponse::success(
        "Category",
        Category::from_model(category, count),
        None,
    ))
}

pub async fn category_products(
    state: &AppState,
    id: Uuid,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    find_category(state, id).await?;
    product_service::products_by_category(state, id, count).await
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    ensure_unique_name(state, &name, None).await?;

    let now = Utc::now();
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(payload.description),
        image_url: Set(payload.image_url),
        is_active: Set(payload.is_active),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        Category::from_model(category, 0),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = find_category(state, id).await?;
    let name = payload.name.trim().to_string();
    ensure_unique_name(state, &name, Some(id)).await?;

    let mut active: categories::ActiveModel = existing.into();
    active.name = Set(name);
    active.description = Set(payload.description);
    active.image_url = Set(payload.image_url);
    active.is_active = Set(payload.is_active);
    active.updated_at = Set(Utc::now().into());
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await;

    let count = active_product_count(state, id).await?;
    Ok(ApiResponse::success(
        "Category updated",
        Category::from_model(category, count),
        Some(Meta::empty()),
    ))
}

/// Refuses while any product, active or not, still references the category.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    find_category(state, id).await?;

    let referenced = Products::find()
        .filter(ProductCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if referenced > 0 {
        return Err(AppError::bad_request(
            "Cannot delete category with existing products",
        ));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Category deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
