//! Payment reference issuance.
//!
//! The pending reference row is committed before the gateway is called, so
//! a webhook racing the outbound request always finds a matching row. A
//! gateway failure marks the row `failed` rather than leaving it pending.

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payments::{CreateReferenceRequest, ReferenceCreated, ReferenceStatus},
    entity::{
        invoices::{ActiveModel as InvoiceActive, Entity as Invoices},
        orders::Entity as Orders,
        payment_references::{
            ActiveModel as ReferenceActive, Column as RefCol, Entity as PaymentReferences,
            Model as ReferenceModel,
        },
    },
    error::{AppError, AppResult},
    gateway::ChargeRequest,
    middleware::auth::AuthUser,
    reference, status,
    response::{ApiResponse, Meta},
    services::convert::reference_from_entity,
    state::AppState,
};

const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Why a single insert attempt did not produce a row.
enum AttemptError {
    /// Unique-index conflict on the reference column; worth a fresh code.
    Conflict,
    Fatal(AppError),
}

/// Run `insert` with freshly generated references until it sticks, giving
/// up after a bounded number of conflicts.
async fn allocate_reference<T, F, Fut>(mut insert: F) -> AppResult<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    for _ in 0..MAX_REFERENCE_ATTEMPTS {
        match insert(reference::generate()).await {
            Ok(value) => return Ok(value),
            Err(AttemptError::Conflict) => continue,
            Err(AttemptError::Fatal(err)) => return Err(err),
        }
    }
    Err(AppError::Persistence(
        "could not allocate a unique payment reference".into(),
    ))
}

pub async fn create_reference(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReferenceRequest,
) -> AppResult<ApiResponse<ReferenceCreated>> {
    if payload.amount <= 0 {
        return Err(AppError::Validation("amount must be greater than 0".into()));
    }

    let (order_id, invoice) = match (payload.order_id, payload.invoice_id) {
        (Some(order_id), None) => {
            ensure_order_access(state, user, order_id).await?;
            (Some(order_id), None)
        }
        (None, Some(invoice_id)) => {
            let invoice = Invoices::find_by_id(invoice_id)
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound)?;
            ensure_order_access(state, user, invoice.order_id).await?;
            (None, Some(invoice))
        }
        _ => {
            return Err(AppError::Validation(
                "exactly one of order_id or invoice_id must be set".into(),
            ));
        }
    };

    let invoice_id = invoice.as_ref().map(|i| i.id);
    let amount = payload.amount;
    let row = allocate_reference(|code| {
        let orm = state.orm.clone();
        async move {
            let attempt = ReferenceActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                invoice_id: Set(invoice_id),
                reference: Set(code),
                amount: Set(amount),
                status: Set("pending".into()),
                gateway_token: Set(None),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&orm)
            .await;

            attempt.map_err(|err| match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => AttemptError::Conflict,
                _ => AttemptError::Fatal(err.into()),
            })
        }
    })
    .await?;

    // Invoice flow: surface the reference on the invoice and issue it.
    let expires_at = if let Some(invoice) = invoice {
        let due_date = invoice.due_date.with_timezone(&Utc);
        let issue = status::invoice_can_transition(&invoice.status, "issued");
        let mut active: InvoiceActive = invoice.into();
        active.payment_reference = Set(Some(row.reference.clone()));
        if issue {
            active.status = Set("issued".into());
        }
        active.updated_at = Set(Utc::now().into());
        active.update(&state.orm).await?;
        Some(due_date)
    } else {
        None
    };

    let credentials = state.credentials.get().await.map_err(AppError::Internal)?;
    let charge = ChargeRequest::new(
        row.reference.clone(),
        payload.amount,
        credentials.token,
        state.callback_url.clone(),
    );

    let session = match state.gateway.charge(&charge).await {
        Ok(response) => response,
        Err(err) => {
            mark_failed(state, &row).await;
            return Err(err);
        }
    };

    let mut active: ReferenceActive = row.clone().into();
    active.gateway_token = Set(Some(session.id.clone()));
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "reference_create",
        Some("payment_references"),
        Some(serde_json::json!({ "reference": row.reference, "amount": payload.amount })),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment reference created",
        ReferenceCreated {
            reference: row.reference,
            token: Some(session.id),
            expires_at,
        },
        Some(Meta::empty()),
    ))
}

/// Best effort: the caller is already returning a GatewayError.
async fn mark_failed(state: &AppState, row: &ReferenceModel) {
    if !status::reference_can_transition(&row.status, "failed") {
        return;
    }
    let mut active: ReferenceActive = row.clone().into();
    active.status = Set("failed".into());
    active.updated_at = Set(Utc::now().into());
    if let Err(err) = active.update(&state.orm).await {
        tracing::warn!(error = %err, reference = %row.reference, "could not mark reference failed");
    }
}

/// Status poll for the checkout UI.
pub async fn get_reference(
    state: &AppState,
    user: &AuthUser,
    code: &str,
) -> AppResult<ApiResponse<ReferenceStatus>> {
    let row = PaymentReferences::find()
        .filter(RefCol::Reference.eq(code))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let owning_order = match (row.order_id, row.invoice_id) {
        (Some(order_id), _) => Some(order_id),
        (None, Some(invoice_id)) => Invoices::find_by_id(invoice_id)
            .one(&state.orm)
            .await?
            .map(|i| i.order_id),
        (None, None) => None,
    };
    match owning_order {
        Some(order_id) => ensure_order_access(state, user, order_id).await?,
        None => {
            return Err(AppError::MissingData(
                "payment reference is not linked to an order or invoice".into(),
            ));
        }
    }

    Ok(ApiResponse::success(
        "OK",
        ReferenceStatus {
            reference: reference_from_entity(row),
        },
        Some(Meta::empty()),
    ))
}

/// The order must exist and belong to the caller; admins may act on any.
async fn ensure_order_access(state: &AppState, user: &AuthUser, order_id: Uuid) -> AppResult<()> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.role != "admin" && order.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn retries_past_conflicts() {
        let attempts = AtomicUsize::new(0);
        let result = allocate_reference(|code| {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(AttemptError::Conflict)
                } else {
                    Ok(code)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(result.len(), 10);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let attempts = AtomicUsize::new(0);
        let result: AppResult<String> = allocate_reference(|_code| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::Conflict) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), MAX_REFERENCE_ATTEMPTS);
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }

    #[tokio::test]
    async fn fatal_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result: AppResult<String> = allocate_reference(|_code| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(AttemptError::Fatal(AppError::Forbidden)) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(AppError::Forbidden)));
    }
}
