use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::PaymentReference;

/// Exactly one of `order_id` / `invoice_id` must be set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReferenceRequest {
    pub order_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceCreated {
    pub reference: String,
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReferenceStatus {
    pub reference: PaymentReference,
}

/// Inbound webhook body from the gateway, keyed by reference string.
#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookPayload {
    pub reference: String,
    pub status: String,
}
