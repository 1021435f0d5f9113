use chrono::Utc;
use home_store_api::{
    config,
    db::{create_orm_conn, run_migrations},
    entity::{
        Categories, Products, Users,
        categories::{self, Column as CategoryCol},
        products::{self, Column as ProductCol},
        users::{self, Column as UserCol},
    },
    models::Role,
    services::auth_service::hash_password,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = config::database_url()?;
    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@homestore.com", "Admin@123", Role::Admin).await?;
    let user_id = ensure_user(&orm, "user@homestore.com", "User@123", Role::User).await?;
    seed_catalog(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        println!("User {email} already present");
        return Ok(existing.id);
    }

    let now = Utc::now();
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(role.as_str().to_string()),
        last_name: Set("Account".into()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(password)),
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
    .insert(orm)
    .await?;

    println!("Created user {email} (role={role})");
    Ok(user.id)
}

async fn ensure_category(
    orm: &DatabaseConnection,
    name: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Categories::find()
        .filter(CategoryCol::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }
    let now = Utc::now();
    let category = categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(Some(description.to_string())),
        image_url: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;
    Ok(category.id)
}

async fn seed_catalog(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let furniture = ensure_category(orm, "Furniture", "Sofas, tables and chairs").await?;
    let kitchen = ensure_category(orm, "Kitchen", "Cookware and dining").await?;
    let decor = ensure_category(orm, "Decor", "Lamps, rugs and wall art").await?;

    // (name, sku, category, price, discount, stock, brand, featured)
    let rows = [
        ("Oak Dining Table", "FUR-TBL-001", furniture, 49_900, Some(44_900), 12, "Nordwood", true),
        ("Linen Sofa", "FUR-SOF-002", furniture, 89_900, None, 5, "Casa", true),
        ("Cast Iron Skillet", "KIT-SKL-001", kitchen, 4_000, None, 40, "Forge", false),
        ("Ceramic Mug Set", "KIT-MUG-002", kitchen, 2_000, Some(1_500), 60, "Kiln", false),
        ("Brass Floor Lamp", "DEC-LMP-001", decor, 12_900, None, 8, "Lumen", true),
        ("Wool Area Rug", "DEC-RUG-002", decor, 19_900, Some(17_900), 3, "Loom", false),
    ];

    for (name, sku, category_id, price, discount, stock, brand, featured) in rows {
        let exists = Products::find()
            .filter(ProductCol::Sku.eq(sku))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }
        let now = Utc::now();
        products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(format!("{name} by {brand}"))),
            price: Set(price),
            discount_price: Set(discount),
            sku: Set(sku.to_string()),
            stock: Set(stock),
            min_stock_level: Set(10),
            category_id: Set(category_id),
            brand: Set(Some(brand.to_string())),
            color: Set(None),
            material: Set(None),
            dimensions: Set(None),
            weight: Set(None),
            rating: Set(0.0),
            review_count: Set(0),
            image_url: Set(None),
            is_active: Set(true),
            is_featured: Set(featured),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
