use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::DiscountType;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
#[validate(schema(function = "validate_window"))]
pub struct CreateCouponRequest {
    #[validate(length(min = 3, max = 50, message = "Code must be 3 to 50 characters"))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Whole percent for `Percentage`, cents for `FixedAmount`.
    #[validate(range(min = 1, message = "Discount value must be positive"))]
    pub discount_value: i64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_order_amount: i64,
    #[validate(range(min = 1))]
    pub max_discount_amount: Option<i64>,
    #[validate(range(min = 1))]
    pub usage_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn validate_window(req: &CreateCouponRequest) -> Result<(), ValidationError> {
    if req.valid_to <= req.valid_from {
        let mut err = ValidationError::new("valid_to");
        err.message = Some("valid_to must be after valid_from".into());
        return Err(err);
    }
    if req.discount_type == DiscountType::Percentage && req.discount_value > 100 {
        let mut err = ValidationError::new("discount_value");
        err.message = Some("Percentage cannot exceed 100".into());
        return Err(err);
    }
    Ok(())
}

/// Upper bound on a subtotal a caller may ask to price, in cents.
pub const MAX_SUBTOTAL: i64 = 100_000_000_000;

#[derive(Debug, Deserialize, IntoParams, ToSchema, Validate)]
pub struct ValidateCouponQuery {
    #[validate(length(min = 1, max = 50, message = "Code must be 1 to 50 characters"))]
    pub code: String,
    #[validate(range(min = 0, max = MAX_SUBTOTAL, message = "Subtotal is out of range"))]
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub discount_amount: i64,
    pub message: String,
}
