use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CartItem;

/// Either a product line (`product_id` + `quantity`) or a domain line
/// (`domain_name` + `extension` + `years`). Mixing the two shapes is a
/// validation error.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    pub domain_name: Option<String>,
    pub extension: Option<String>,
    pub years: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartItem>,
}
