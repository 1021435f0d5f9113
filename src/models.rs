use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        categories, discount_coupons, order_items, orders, product_images, product_reviews,
        products, stock_notifications, users,
    },
    pricing::{self, DiscountKind},
};

fn utc(at: DateTime<FixedOffset>) -> DateTime<Utc> {
    at.with_timezone(&Utc)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    /// Unknown stored roles are treated as the least privileged one.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DiscountType {
    Percentage,
    FixedAmount,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "Percentage",
            DiscountType::FixedAmount => "FixedAmount",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Percentage" => Some(DiscountType::Percentage),
            "FixedAmount" => Some(DiscountType::FixedAmount),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(m: users::Model) -> Self {
        Self {
            full_name: m.full_name(),
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            email: m.email,
            phone_number: m.phone_number,
            address: m.address,
            city: m.city,
            state: m.state,
            zip_code: m.zip_code,
            country: m.country,
            role: m.role,
            is_active: m.is_active,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn from_model(m: categories::Model, product_count: i64) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            image_url: m.image_url,
            is_active: m.is_active,
            product_count,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub is_primary: bool,
    pub display_order: i32,
}

impl From<product_images::Model> for ProductImage {
    fn from(m: product_images::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            image_url: m.image_url,
            alt_text: m.alt_text,
            is_primary: m.is_primary,
            display_order: m.display_order,
        }
    }
}

/// Product as served to clients, with its derived pricing and stock flags.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub effective_price: i64,
    pub is_on_sale: bool,
    pub discount_percentage: f64,
    pub sku: String,
    pub stock: i32,
    pub min_stock_level: i32,
    pub is_low_stock: bool,
    pub is_out_of_stock: bool,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<f64>,
    pub rating: f64,
    pub review_count: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn from_parts(
        m: products::Model,
        category_name: Option<String>,
        images: Vec<ProductImage>,
    ) -> Self {
        Self {
            effective_price: pricing::effective_price(m.price, m.discount_price),
            is_on_sale: pricing::is_on_sale(m.price, m.discount_price),
            discount_percentage: pricing::discount_percentage(m.price, m.discount_price),
            is_low_stock: m.stock <= m.min_stock_level,
            is_out_of_stock: m.stock <= 0,
            id: m.id,
            name: m.name,
            description: m.description,
            price: m.price,
            discount_price: m.discount_price,
            sku: m.sku,
            stock: m.stock,
            min_stock_level: m.min_stock_level,
            category_id: m.category_id,
            category_name,
            brand: m.brand,
            color: m.color,
            material: m.material,
            dimensions: m.dimensions,
            weight: m.weight,
            rating: m.rating,
            review_count: m.review_count,
            image_url: m.image_url,
            is_active: m.is_active,
            is_featured: m.is_featured,
            images,
            created_at: utc(m.created_at),
            updated_at: utc(m.updated_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub total_price: i64,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product: Product,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub total_price: i64,
}

impl From<order_items::Model> for OrderItem {
    fn from(m: order_items::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            quantity: m.quantity,
            unit_price: m.unit_price,
            total_price: m.total_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub shipping_address: String,
    pub billing_address: Option<String>,
    pub order_date: DateTime<Utc>,
    pub shipped_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn from_parts(m: orders::Model, items: Vec<order_items::Model>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            order_number: m.order_number,
            total_amount: m.total_amount,
            discount_amount: m.discount_amount,
            final_amount: m.final_amount,
            status: m.status,
            payment_status: m.payment_status,
            payment_method: m.payment_method,
            shipping_address: m.shipping_address,
            billing_address: m.billing_address,
            order_date: utc(m.order_date),
            shipped_date: m.shipped_date.map(utc),
            delivered_date: m.delivered_date.map(utc),
            items: items.into_iter().map(OrderItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: i64,
    pub min_order_amount: i64,
    pub max_discount_amount: Option<i64>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
}

impl From<discount_coupons::Model> for Coupon {
    fn from(m: discount_coupons::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            description: m.description,
            discount_type: m.discount_type,
            discount_value: m.discount_value,
            min_order_amount: m.min_order_amount,
            max_discount_amount: m.max_discount_amount,
            usage_limit: m.usage_limit,
            used_count: m.used_count,
            is_active: m.is_active,
            valid_from: utc(m.valid_from),
            valid_to: utc(m.valid_to),
        }
    }
}

impl discount_coupons::Model {
    /// Active, inside its validity window and under its usage limit.
    pub fn can_be_used(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && utc(self.valid_from) <= now
            && now <= utc(self.valid_to)
            && self.usage_limit.is_none_or(|limit| self.used_count < limit)
    }

    pub fn discount_kind(&self) -> Option<DiscountKind> {
        match DiscountType::parse(&self.discount_type)? {
            DiscountType::Percentage => Some(DiscountKind::Percentage(self.discount_value)),
            DiscountType::FixedAmount => Some(DiscountKind::Fixed(self.discount_value)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub review_text: Option<String>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<product_reviews::Model> for Review {
    fn from(m: product_reviews::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            user_id: m.user_id,
            rating: m.rating,
            review_text: m.review_text,
            is_approved: m.is_approved,
            created_at: utc(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockNotification {
    pub id: Uuid,
    pub product_id: Uuid,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<stock_notifications::Model> for StockNotification {
    fn from(m: stock_notifications::Model) -> Self {
        Self {
            id: m.id,
            product_id: m.product_id,
            message: m.message,
            is_read: m.is_read,
            created_at: utc(m.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    use super::*;

    fn coupon() -> discount_coupons::Model {
        let now = Utc::now();
        discount_coupons::Model {
            id: Uuid::new_v4(),
            code: "SAVE10".into(),
            description: None,
            discount_type: "Percentage".into(),
            discount_value: 10,
            min_order_amount: 0,
            max_discount_amount: None,
            usage_limit: Some(2),
            used_count: 0,
            is_active: true,
            valid_from: (now - Duration::days(1)).into(),
            valid_to: (now + Duration::days(1)).into(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn coupon_usability_window_and_limit() {
        let now = Utc::now();
        assert!(coupon().can_be_used(now));
        assert!(!coupon().can_be_used(now + Duration::days(2)));

        let exhausted = discount_coupons::Model {
            used_count: 2,
            ..coupon()
        };
        assert!(!exhausted.can_be_used(now));

        let inactive = discount_coupons::Model {
            is_active: false,
            ..coupon()
        };
        assert!(!inactive.can_be_used(now));
    }

    #[test]
    fn role_parsing_defaults_to_user() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("admin"), Role::Admin);
        assert_eq!(Role::parse("superuser"), Role::User);
    }
}
