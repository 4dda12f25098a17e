use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::DomainExtension;

#[derive(Serialize, ToSchema)]
pub struct ExtensionList {
    pub items: Vec<DomainExtension>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteQuery {
    /// Extension name including the leading dot, e.g. ".ao".
    pub extension: String,
    pub years: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DomainQuote {
    pub extension: String,
    pub years: u32,
    pub base_price: i64,
    pub total_price: i64,
    pub total_display: String,
}
