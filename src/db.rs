use std::time::Duration;

use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};

use crate::entity::{
    AuditLogs, CartItems, Categories, DiscountCoupons, OrderItems, Orders, ProductImages,
    ProductReviews, Products, StockNotifications, UserCoupons, Users, WishlistItems, cart_items,
    product_reviews, user_coupons, wishlist_items,
};

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection.
///
/// SQLite is pinned to a single pooled connection so an in-memory database
/// survives for the life of the pool.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    if database_url.starts_with("sqlite") {
        options.max_connections(1).min_connections(1);
    } else {
        options.max_connections(20);
    }
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Create every table (parents before children) and the composite unique
/// indexes. Safe to run repeatedly.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    create_table(conn, Users).await?;
    create_table(conn, Categories).await?;
    create_table(conn, Products).await?;
    create_table(conn, ProductImages).await?;
    create_table(conn, CartItems).await?;
    create_table(conn, WishlistItems).await?;
    create_table(conn, DiscountCoupons).await?;
    create_table(conn, UserCoupons).await?;
    create_table(conn, Orders).await?;
    create_table(conn, OrderItems).await?;
    create_table(conn, ProductReviews).await?;
    create_table(conn, StockNotifications).await?;
    create_table(conn, AuditLogs).await?;

    let indexes: [IndexCreateStatement; 4] = [
        Index::create()
            .name("ux_cart_items_user_product")
            .table(CartItems)
            .col(cart_items::Column::UserId)
            .col(cart_items::Column::ProductId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_wishlist_items_user_product")
            .table(WishlistItems)
            .col(wishlist_items::Column::UserId)
            .col(wishlist_items::Column::ProductId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_user_coupons_user_coupon")
            .table(UserCoupons)
            .col(user_coupons::Column::UserId)
            .col(user_coupons::Column::CouponId)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("ux_product_reviews_product_user")
            .table(ProductReviews)
            .col(product_reviews::Column::ProductId)
            .col(product_reviews::Column::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ];

    let backend = conn.get_database_backend();
    for index in indexes {
        conn.execute(backend.build(&index)).await?;
    }

    tracing::debug!("schema is up to date");
    Ok(())
}

async fn create_table<E: EntityTrait>(conn: &DatabaseConnection, entity: E) -> Result<()> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    conn.execute(backend.build(&stmt)).await?;
    Ok(())
}
