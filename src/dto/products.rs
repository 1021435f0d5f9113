use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::Product;

fn default_min_stock_level() -> i32 {
    10
}

fn default_true() -> bool {
    true
}

/// Body of both create and full update.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_discount"))]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Price must be greater than zero"))]
    pub price: i64,
    #[validate(range(min = 0))]
    pub discount_price: Option<i64>,
    #[validate(length(min = 1, max = 50, message = "SKU is required"))]
    pub sku: String,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    #[serde(default = "default_min_stock_level")]
    #[validate(range(min = 0))]
    pub min_stock_level: i32,
    pub category_id: Uuid,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
}

fn validate_discount(req: &ProductRequest) -> Result<(), ValidationError> {
    match req.discount_price {
        Some(discount) if discount >= req.price => {
            let mut err = ValidationError::new("discount_price");
            err.message = Some("Discount price must be less than price".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateStockRequest {
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddProductImageRequest {
    #[validate(length(min = 1, max = 500, message = "Image URL is required"))]
    pub image_url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub display_order: Option<i32>,
}

/// One row of a bulk upload. Rows are checked individually so one bad row
/// does not reject the batch.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct BulkProductRow {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount_price: Option<i64>,
    pub sku: String,
    pub stock: i32,
    pub category_name: String,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub weight: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct BulkUploadRequest {
    #[validate(length(min = 1, message = "At least one product is required"))]
    pub products: Vec<BulkProductRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkUploadResult {
    pub total_processed: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<String>,
    pub created_products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct BulkStatusRequest {
    #[validate(length(min = 1, message = "At least one product id is required"))]
    pub product_ids: Vec<Uuid>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "At least one product id is required"))]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkResult {
    pub affected: u64,
}

/// Active category name to active product count.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCounts {
    pub counts: BTreeMap<String, i64>,
}
