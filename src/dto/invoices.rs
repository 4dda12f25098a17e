use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Invoice;

#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceList {
    pub items: Vec<Invoice>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DocumentQuery {
    /// When true, assembly fails instead of emitting a document without a
    /// payment reference.
    pub require_reference: Option<bool>,
}

/// Typed structure handed to the external PDF renderer.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub customer: DocumentCustomer,
    pub lines: Vec<DocumentLine>,
    pub grand_total: i64,
    pub grand_total_display: String,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentCustomer {
    pub name: String,
    pub email: String,
    pub nif: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub unit_price_display: String,
    pub line_total: i64,
    pub line_total_display: String,
}
