use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::dto::cart::MAX_LINE_QUANTITY;

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct AddToWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct MoveToCartRequest {
    #[serde(default = "one")]
    #[validate(range(
        min = 1,
        max = MAX_LINE_QUANTITY,
        message = "Quantity must be between 1 and 1000"
    ))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WishlistCheck {
    pub in_wishlist: bool,
}
