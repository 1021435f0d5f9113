use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, Func, IntoIden, LikeExpr, Query, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{
        AddProductImageRequest, BulkDeleteRequest, BulkProductRow, BulkResult, BulkStatusRequest,
        BulkUploadResult, CategoryCounts, ProductRequest, UpdateStockRequest,
    },
    entity::{
        categories::{self, Column as CategoryCol, Entity as Categories},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_images::{self, Column as ImageCol, Entity as ProductImages},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, ProductImage},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    services::stock_service,
    state::AppState,
};

/// Attach category names and images to a batch of product rows, keeping order.
pub async fn load_products<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let category_ids: Vec<Uuid> = models.iter().map(|m| m.category_id).collect();

    let names: HashMap<Uuid, String> = Categories::find()
        .filter(CategoryCol::Id.is_in(category_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut images: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
    for image in ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids))
        .order_by_asc(ImageCol::DisplayOrder)
        .order_by_asc(ImageCol::CreatedAt)
        .all(conn)
        .await?
    {
        images
            .entry(image.product_id)
            .or_default()
            .push(ProductImage::from(image));
    }

    Ok(models
        .into_iter()
        .map(|m| {
            let name = names.get(&m.category_id).cloned();
            let imgs = images.remove(&m.id).unwrap_or_default();
            Product::from_parts(m, name, imgs)
        })
        .collect())
}

pub async fn load_product<C: ConnectionTrait>(conn: &C, model: ProductModel) -> AppResult<Product> {
    load_products(conn, vec![model])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Product"))
}

async fn find_product<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<ProductModel> {
    Products::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))
}

fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn contains_ci<E, C>(entity: E, column: C, pattern: &str) -> SimpleExpr
where
    E: IntoIden + 'static,
    C: IntoIden + 'static,
{
    Expr::expr(Func::lower(Expr::col((entity, column))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

fn on_sale() -> SimpleExpr {
    Expr::col(Column::DiscountPrice)
        .is_not_null()
        .and(Expr::col(Column::DiscountPrice).lt(Expr::col(Column::Price)))
}

fn product_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(term) = query.search_term.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = like_pattern(term);
        let matching_categories = Query::select()
            .column(CategoryCol::Id)
            .from(Categories)
            .and_where(contains_ci(Categories, CategoryCol::Name, &pattern))
            .to_owned();
        condition = condition.add(
            Condition::any()
                .add(contains_ci(Products, Column::Name, &pattern))
                .add(contains_ci(Products, Column::Description, &pattern))
                .add(contains_ci(Products, Column::Brand, &pattern))
                .add(Column::CategoryId.in_subquery(matching_categories)),
        );
    }

    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }
    if let Some(min_rating) = query.min_rating {
        condition = condition.add(Column::Rating.gte(min_rating));
    }
    for (value, column) in [
        (&query.brand, Column::Brand),
        (&query.color, Column::Color),
        (&query.material, Column::Material),
    ] {
        if let Some(value) = value.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(contains_ci(Products, column, &like_pattern(value)));
        }
    }
    match query.is_on_sale {
        Some(true) => condition = condition.add(on_sale()),
        Some(false) => condition = condition.add(on_sale().not()),
        None => {}
    }
    if let Some(featured) = query.is_featured {
        condition = condition.add(Column::IsFeatured.eq(featured));
    }
    match query.in_stock {
        Some(true) => condition = condition.add(Column::Stock.gt(0)),
        Some(false) => condition = condition.add(Column::Stock.lte(0)),
        None => {}
    }
    if let Some(active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(active));
    }

    condition
}

fn sorted(finder: Select<Products>, sort_by: ProductSortBy, order: SortOrder) -> Select<Products> {
    let column = match sort_by {
        ProductSortBy::Name => Column::Name,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Rating => Column::Rating,
        ProductSortBy::Created => Column::CreatedAt,
    };
    finder
        .order_by(column, order.as_order())
        .order_by_asc(Column::Id)
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let (page, limit, offset) = query.pagination().normalize();
    let finder = sorted(
        Products::find().filter(product_condition(&query)),
        query.sort_by.unwrap_or_default(),
        query.sort_order.unwrap_or_default(),
    );

    let total = finder.clone().count(&state.orm).await? as i64;
    let models = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = load_products(&state.orm, models).await?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", items, Some(meta)))
}

pub async fn search_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<Vec<Product>>> {
    if query
        .search_term
        .as_deref()
        .is_none_or(|s| s.trim().is_empty())
    {
        return Err(AppError::bad_request("Search term is required"));
    }
    list_products(state, query).await
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let model = find_product(&state.orm, id).await?;
    let product = load_product(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn get_product_by_sku(state: &AppState, sku: &str) -> AppResult<ApiResponse<Product>> {
    let model = Products::find()
        .filter(Column::Sku.eq(sku))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;
    let product = load_product(&state.orm, model).await?;
    Ok(ApiResponse::success("Product", product, None))
}

async fn active_list(
    state: &AppState,
    finder: Select<Products>,
    count: u64,
    message: &str,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let models = finder
        .filter(Column::IsActive.eq(true))
        .limit(count)
        .all(&state.orm)
        .await?;
    let items = load_products(&state.orm, models).await?;
    Ok(ApiResponse::success(message, items, Some(Meta::empty())))
}

pub async fn featured_products(
    state: &AppState,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let finder = Products::find()
        .filter(Column::IsFeatured.eq(true))
        .order_by_desc(Column::Rating)
        .order_by_asc(Column::Name);
    active_list(state, finder, count, "Featured products").await
}

pub async fn products_by_category(
    state: &AppState,
    category_id: Uuid,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let finder = Products::find()
        .filter(Column::CategoryId.eq(category_id))
        .order_by_asc(Column::Name);
    active_list(state, finder, count, "Products").await
}

pub async fn related_products(
    state: &AppState,
    id: Uuid,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let product = find_product(&state.orm, id).await?;
    let finder = Products::find()
        .filter(Column::CategoryId.eq(product.category_id))
        .filter(Column::Id.ne(product.id))
        .order_by_desc(Column::Rating)
        .order_by_asc(Column::Name);
    active_list(state, finder, count, "Related products").await
}

pub async fn top_rated_products(
    state: &AppState,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let finder = Products::find()
        .filter(Column::Rating.gt(0.0))
        .order_by_desc(Column::Rating)
        .order_by_desc(Column::ReviewCount);
    active_list(state, finder, count, "Top rated products").await
}

/// Ranked by review count; there is no sales ledger to rank by.
pub async fn best_selling_products(
    state: &AppState,
    count: u64,
) -> AppResult<ApiResponse<Vec<Product>>> {
    let finder = Products::find()
        .order_by_desc(Column::ReviewCount)
        .order_by_desc(Column::Rating);
    active_list(state, finder, count, "Best selling products").await
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, category_id: Uuid) -> AppResult<()> {
    let exists = Categories::find_by_id(category_id).one(conn).await?.is_some();
    if !exists {
        return Err(AppError::bad_request("Category does not exist"));
    }
    Ok(())
}

async fn ensure_unique_sku<C: ConnectionTrait>(
    conn: &C,
    sku: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = Products::find().filter(Column::Sku.eq(sku));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::bad_request(format!("SKU '{sku}' already exists")));
    }
    Ok(())
}

fn apply_request(active: &mut ActiveModel, payload: ProductRequest) {
    active.name = Set(payload.name.trim().to_string());
    active.description = Set(payload.description);
    active.price = Set(payload.price);
    active.discount_price = Set(payload.discount_price);
    active.sku = Set(payload.sku.trim().to_string());
    active.stock = Set(payload.stock);
    active.min_stock_level = Set(payload.min_stock_level);
    active.category_id = Set(payload.category_id);
    active.brand = Set(payload.brand);
    active.color = Set(payload.color);
    active.material = Set(payload.material);
    active.dimensions = Set(payload.dimensions);
    active.weight = Set(payload.weight);
    active.image_url = Set(payload.image_url);
    active.is_active = Set(payload.is_active);
    active.is_featured = Set(payload.is_featured);
    active.updated_at = Set(Utc::now().into());
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    ensure_category(&state.orm, payload.category_id).await?;
    ensure_unique_sku(&state.orm, payload.sku.trim(), None).await?;

    let now = Utc::now();
    let mut active = ActiveModel {
        id: Set(Uuid::new_v4()),
        rating: Set(0.0),
        review_count: Set(0),
        created_at: Set(now.into()),
        ..Default::default()
    };
    apply_request(&mut active, payload);
    let product = active.insert(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "sku": product.sku })),
    )
    .await;

    let product = load_product(&state.orm, product).await?;
    Ok(ApiResponse::success("Product created", product, Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = find_product(&state.orm, id).await?;
    ensure_category(&state.orm, payload.category_id).await?;
    ensure_unique_sku(&state.orm, payload.sku.trim(), Some(id)).await?;

    let previous_stock = existing.stock;
    let mut active: ActiveModel = existing.into();
    apply_request(&mut active, payload);
    let product = active.update(&state.orm).await?;

    if product.stock != previous_stock {
        stock_service::notify_if_low(&state.orm, &product).await?;
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await;

    let product = load_product(&state.orm, product).await?;
    Ok(ApiResponse::success("Product updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    find_product(&state.orm, id).await?;

    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::bad_request(
            "Cannot delete product with existing orders",
        ));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn update_stock(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateStockRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = find_product(&state.orm, id).await?;

    let mut active: ActiveModel = existing.into();
    active.stock = Set(payload.stock);
    active.updated_at = Set(Utc::now().into());
    let product = active.update(&state.orm).await?;

    stock_service::notify_if_low(&state.orm, &product).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_stock_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id, "stock": product.stock })),
    )
    .await;

    let product = load_product(&state.orm, product).await?;
    Ok(ApiResponse::success("Stock updated", product, Some(Meta::empty())))
}

pub async fn low_stock_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Vec<Product>>> {
    ensure_admin(user)?;
    let models = Products::find()
        .filter(Column::IsActive.eq(true))
        .filter(Expr::col(Column::Stock).lte(Expr::col(Column::MinStockLevel)))
        .order_by_asc(Column::Stock)
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;
    let items = load_products(&state.orm, models).await?;
    Ok(ApiResponse::success("Low stock products", items, Some(Meta::empty())))
}

pub async fn add_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: AddProductImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    find_product(&txn, product_id).await?;

    let existing = ProductImages::find()
        .filter(ImageCol::ProductId.eq(product_id))
        .count(&txn)
        .await?;
    let is_primary = payload.is_primary || existing == 0;
    if is_primary {
        clear_primary(&txn, product_id).await?;
    }

    let image = product_images::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        image_url: Set(payload.image_url),
        alt_text: Set(payload.alt_text),
        is_primary: Set(is_primary),
        display_order: Set(payload.display_order.unwrap_or(existing as i32)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Image added",
        ProductImage::from(image),
        Some(Meta::empty()),
    ))
}

async fn clear_primary<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> AppResult<()> {
    ProductImages::update_many()
        .col_expr(ImageCol::IsPrimary, Expr::value(false))
        .filter(ImageCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    Ok(())
}

async fn find_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<product_images::Model> {
    ProductImages::find_by_id(image_id)
        .filter(ImageCol::ProductId.eq(product_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found("Image"))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let image = find_image(&txn, product_id, image_id).await?;
    ProductImages::delete_by_id(image.id).exec(&txn).await?;

    if image.is_primary {
        let next = ProductImages::find()
            .filter(ImageCol::ProductId.eq(product_id))
            .order_by_asc(ImageCol::DisplayOrder)
            .order_by_asc(ImageCol::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: product_images::ActiveModel = next.into();
            active.is_primary = Set(true);
            active.update(&txn).await?;
        }
    }
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Image deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn set_primary_image(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    image_id: Uuid,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;
    let image = find_image(&txn, product_id, image_id).await?;
    clear_primary(&txn, product_id).await?;

    let mut active: product_images::ActiveModel = image.into();
    active.is_primary = Set(true);
    let image = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Primary image set",
        ProductImage::from(image),
        Some(Meta::empty()),
    ))
}

fn check_row(row: &BulkProductRow) -> Result<(), String> {
    if row.name.trim().is_empty() {
        return Err("name is required".into());
    }
    if row.sku.trim().is_empty() {
        return Err("SKU is required".into());
    }
    if row.category_name.trim().is_empty() {
        return Err("category name is required".into());
    }
    if row.price <= 0 {
        return Err("price must be greater than zero".into());
    }
    if row.stock < 0 {
        return Err("stock cannot be negative".into());
    }
    if row.discount_price.is_some_and(|d| d < 0 || d >= row.price) {
        return Err("discount price must be less than price".into());
    }
    Ok(())
}

async fn find_or_create_category<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> AppResult<categories::Model> {
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(conn)
        .await?
    {
        return Ok(existing);
    }
    let now = Utc::now();
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        image_url: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(category)
}

async fn insert_row<C: ConnectionTrait>(conn: &C, row: BulkProductRow) -> AppResult<ProductModel> {
    let sku = row.sku.trim().to_string();
    if Products::find()
        .filter(Column::Sku.eq(sku.as_str()))
        .one(conn)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request(format!("SKU '{sku}' already exists")));
    }

    let category = find_or_create_category(conn, row.category_name.trim()).await?;
    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(row.name.trim().to_string()),
        description: Set(row.description),
        price: Set(row.price),
        discount_price: Set(row.discount_price),
        sku: Set(sku),
        stock: Set(row.stock),
        min_stock_level: Set(10),
        category_id: Set(category.id),
        brand: Set(row.brand),
        color: Set(row.color),
        material: Set(row.material),
        dimensions: Set(row.dimensions),
        weight: Set(row.weight),
        rating: Set(0.0),
        review_count: Set(0),
        image_url: Set(row.image_url),
        is_active: Set(true),
        is_featured: Set(row.is_featured),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(conn)
    .await?;
    Ok(product)
}

/// Insert each row independently; failures are reported per row and do not
/// stop the batch.
pub async fn bulk_upload(
    state: &AppState,
    user: &AuthUser,
    rows: Vec<BulkProductRow>,
) -> AppResult<ApiResponse<BulkUploadResult>> {
    ensure_admin(user)?;
    let total_processed = rows.len();
    let mut errors = Vec::new();
    let mut created = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let line = index + 1;
        if let Err(reason) = check_row(&row) {
            errors.push(format!("Row {line}: {reason}"));
            continue;
        }
        match insert_row(&state.orm, row).await {
            Ok(product) => created.push(product),
            Err(AppError::BadRequest(reason)) => errors.push(format!("Row {line}: {reason}")),
            Err(err) => {
                tracing::warn!(error = %err, row = line, "bulk upload row failed");
                errors.push(format!("Row {line}: {err}"));
            }
        }
    }

    let created_products = load_products(&state.orm, created).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_bulk_upload",
        Some("products"),
        Some(serde_json::json!({
            "total": total_processed,
            "created": created_products.len(),
        })),
    )
    .await;

    let result = BulkUploadResult {
        total_processed,
        success_count: created_products.len(),
        error_count: errors.len(),
        errors,
        created_products,
    };
    Ok(ApiResponse::success("Bulk upload processed", result, Some(Meta::empty())))
}

pub async fn bulk_update_status(
    state: &AppState,
    user: &AuthUser,
    payload: BulkStatusRequest,
) -> AppResult<ApiResponse<BulkResult>> {
    ensure_admin(user)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let result = Products::update_many()
        .col_expr(Column::IsActive, Expr::value(payload.is_active))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.is_in(payload.product_ids.clone()))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_bulk_status",
        Some("products"),
        Some(serde_json::json!({
            "product_ids": payload.product_ids,
            "is_active": payload.is_active,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Products updated",
        BulkResult {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Products referenced by an order are skipped.
pub async fn bulk_delete(
    state: &AppState,
    user: &AuthUser,
    payload: BulkDeleteRequest,
) -> AppResult<ApiResponse<BulkResult>> {
    ensure_admin(user)?;
    let ordered = Query::select()
        .column(OrderItemCol::ProductId)
        .from(OrderItems)
        .to_owned();
    let result = Products::delete_many()
        .filter(Column::Id.is_in(payload.product_ids.clone()))
        .filter(Column::Id.not_in_subquery(ordered))
        .exec(&state.orm)
        .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_bulk_delete",
        Some("products"),
        Some(serde_json::json!({
            "product_ids": payload.product_ids,
            "deleted": result.rows_affected,
        })),
    )
    .await;

    Ok(ApiResponse::success(
        "Products deleted",
        BulkResult {
            affected: result.rows_affected,
        },
        Some(Meta::empty()),
    ))
}

/// Active product count per active category, zero counts included.
pub async fn category_product_counts(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<CategoryCounts>> {
    ensure_admin(user)?;
    let mut counts: BTreeMap<String, i64> = Categories::find()
        .filter(CategoryCol::IsActive.eq(true))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|c| (c.name, 0))
        .collect();

    let rows: Vec<(String, i64)> = Products::find()
        .select_only()
        .column(CategoryCol::Name)
        .column_as(Expr::col((Products, Column::Id)).count(), "count")
        .inner_join(Categories)
        .filter(Column::IsActive.eq(true))
        .filter(CategoryCol::IsActive.eq(true))
        .group_by(CategoryCol::Name)
        .into_tuple()
        .all(&state.orm)
        .await?;
    for (name, count) in rows {
        counts.insert(name, count);
    }

    Ok(ApiResponse::success(
        "Category product counts",
        CategoryCounts { counts },
        Some(Meta::empty()),
    ))
}

/// Count of active products per category id.
pub async fn active_counts_by_category<C: ConnectionTrait>(
    conn: &C,
) -> AppResult<HashMap<Uuid, i64>> {
    let rows: Vec<(Uuid, i64)> = Products::find()
        .select_only()
        .column(Column::CategoryId)
        .column_as(Expr::col((Products, Column::Id)).count(), "count")
        .filter(Column::IsActive.eq(true))
        .group_by(Column::CategoryId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows.into_iter().collect())
}
