use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::OrderStatus;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 500, message = "Shipping address is required"))]
    pub shipping_address: String,
    #[validate(length(max = 500))]
    pub billing_address: Option<String>,
    pub payment_method: Option<String>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    pub payment_status: Option<String>,
}
