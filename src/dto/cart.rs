use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

fn one() -> i32 {
    1
}

/// Most units of one product a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 1_000;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    #[validate(range(
        min = 1,
        max = MAX_LINE_QUANTITY,
        message = "Quantity must be between 1 and 1000"
    ))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(
        min = 1,
        max = MAX_LINE_QUANTITY,
        message = "Quantity must be between 1 and 1000"
    ))]
    pub quantity: i32,
}
