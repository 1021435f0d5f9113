#![allow(dead_code)]

use chrono::Utc;
use home_store_api::{
    config::JwtConfig,
    db::{create_orm_conn, run_migrations},
    entity::{categories, products, users},
    middleware::auth::AuthUser,
    models::Role,
    services::auth_service::hash_password,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

pub const PASSWORD: &str = "secret123";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-key".into(),
        issuer: "home-store-api".into(),
        audience: "home-store-client".into(),
        expiry_minutes: 60,
    }
}

/// Fresh in-memory database with the full schema.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:").await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, jwt_config()))
}

pub async fn create_user(state: &AppState, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set("Test".into()),
        last_name: Set(role.as_str().to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(PASSWORD)),
        phone_number: Set(None),
        address: Set(None),
        city: Set(None),
        state: Set(None),
        zip_code: Set(None),
        country: Set(None),
        role: Set(role.as_str().to_string()),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role,
    })
}

pub async fn create_category(state: &AppState, name: &str) -> anyhow::Result<categories::Model> {
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
    .insert(&state.orm)
    .await?;
    Ok(category)
}

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub sku: &'a str,
    pub category_id: Uuid,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub stock: i32,
}

impl<'a> NewProduct<'a> {
    pub fn new(name: &'a str, sku: &'a str, category_id: Uuid, price: i64) -> Self {
        Self {
            name,
            sku,
            category_id,
            price,
            discount_price: None,
            stock: 50,
        }
    }

    pub fn discount(mut self, discount_price: i64) -> Self {
        self.discount_price = Some(discount_price);
        self
    }

    pub fn stock(mut self, stock: i32) -> Self {
        self.stock = stock;
        self
    }
}

pub async fn create_product(
    state: &AppState,
    new: NewProduct<'_>,
) -> anyhow::Result<products::Model> {
    let now = Utc::now();
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(new.name.to_string()),
        description: Set(Some(format!("{} for testing", new.name))),
        price: Set(new.price),
        discount_price: Set(new.discount_price),
        sku: Set(new.sku.to_string()),
        stock: Set(new.stock),
        min_stock_level: Set(10),
        category_id: Set(new.category_id),
        brand: Set(None),
        color: Set(None),
        material: Set(None),
        dimensions: Set(None),
        weight: Set(None),
        rating: Set(0.0),
        review_count: Set(0),
        image_url: Set(None),
        is_active: Set(true),
        is_featured: Set(false),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}
