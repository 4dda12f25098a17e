//! Inbound gateway webhook: the one-shot confirmation of a pending
//! payment reference. Replays are answered with the current state rather
//! than re-applied.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::{
    audit::log_audit,
    dto::payments::{ReferenceStatus, WebhookPayload},
    entity::{
        invoices::{ActiveModel as InvoiceActive, Column as InvoiceCol, Entity as Invoices},
        orders::{ActiveModel as OrderActive, Entity as Orders},
        payment_references::{
            ActiveModel as ReferenceActive, Column as RefCol, Entity as PaymentReferences,
        },
    },
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::convert::reference_from_entity,
    state::AppState,
    status,
};

pub async fn handle_callback(
    state: &AppState,
    payload: WebhookPayload,
) -> AppResult<ApiResponse<ReferenceStatus>> {
    let target_status = match payload.status.as_str() {
        "confirmed" | "paid" => "confirmed",
        "failed" | "expired" | "rejected" => "failed",
        other => {
            return Err(AppError::Validation(format!(
                "unknown payment status '{other}'"
            )));
        }
    };

    let txn = state.orm.begin().await?;

    let row = PaymentReferences::find()
        .filter(RefCol::Reference.eq(payload.reference.as_str()))
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    // Duplicate delivery: report the already-settled state.
    if !status::reference_can_transition(&row.status, target_status) {
        txn.commit().await?;
        tracing::info!(reference = %row.reference, status = %row.status, "webhook replay ignored");
        return Ok(ApiResponse::success(
            "Already processed",
            ReferenceStatus {
                reference: reference_from_entity(row),
            },
            Some(Meta::empty()),
        ));
    }

    let order_id = row.order_id;
    let invoice_id = row.invoice_id;
    let reference_code = row.reference.clone();

    let mut active: ReferenceActive = row.into();
    active.status = Set(target_status.into());
    active.updated_at = Set(Utc::now().into());
    let row = active.update(&txn).await?;

    if target_status == "confirmed" {
        settle_order(&txn, order_id, invoice_id).await?;
    }

    txn.commit().await?;

    log_audit(
        &state.pool,
        None,
        "payment_callback",
        Some("payment_references"),
        Some(serde_json::json!({ "reference": reference_code, "status": target_status })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment status recorded",
        ReferenceStatus {
            reference: reference_from_entity(row),
        },
        Some(Meta::empty()),
    ))
}

/// Mark the owning order paid and walk its invoice forward to `paid`.
async fn settle_order(
    txn: &sea_orm::DatabaseTransaction,
    order_id: Option<uuid::Uuid>,
    invoice_id: Option<uuid::Uuid>,
) -> AppResult<()> {
    // Resolve the order either directly or through the invoice.
    let invoice = match invoice_id {
        Some(id) => Invoices::find_by_id(id).one(txn).await?,
        None => match order_id {
            Some(oid) => {
                Invoices::find()
                    .filter(InvoiceCol::OrderId.eq(oid))
                    .one(txn)
                    .await?
            }
            None => None,
        },
    };

    let order_id = order_id.or_else(|| invoice.as_ref().map(|i| i.order_id));

    if let Some(order_id) = order_id {
        let order = Orders::find_by_id(order_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::MissingData("order not found for reference".into()))?;
        if !status::order_is_terminal(&order.status) && order.status != "paid" {
            let mut active: OrderActive = order.into();
            active.status = Set("paid".into());
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await?;
        }
    }

    if let Some(invoice) = invoice {
        let mut next = invoice.status.clone();
        if status::invoice_can_transition(&next, "issued") {
            next = "issued".into();
        }
        if status::invoice_can_transition(&next, "paid") {
            next = "paid".into();
        }
        if next != invoice.status {
            let mut active: InvoiceActive = invoice.into();
            active.status = Set(next);
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await?;
        }
    }

    Ok(())
}
