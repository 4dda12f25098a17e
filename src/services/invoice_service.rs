//! Invoice reads and document assembly for the external PDF renderer.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    currency::format_kwanza,
    dto::invoices::{DocumentCustomer, DocumentLine, InvoiceDocument, InvoiceList},
    entity::{
        invoices::{Column as InvoiceCol, Entity as Invoices, Model as InvoiceModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems, Model as OrderItemModel},
        orders::{Column as OrderCol, Entity as Orders, Model as OrderModel},
        payment_references::{Column as RefCol, Entity as PaymentReferences, Model as ReferenceModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::convert::invoice_from_entity,
    state::AppState,
};

pub async fn list_invoices(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<InvoiceList>> {
    let (page, limit, offset) = pagination.normalize();

    let finder = Invoices::find()
        .inner_join(Orders)
        .filter(OrderCol::UserId.eq(user.user_id));
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .order_by_desc(InvoiceCol::CreatedAt)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(invoice_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Invoices", InvoiceList { items }, Some(meta)))
}

pub async fn get_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<crate::models::Invoice>> {
    let (invoice, _order) = load_owned_invoice(state, user, id).await?;
    Ok(ApiResponse::success(
        "Invoice",
        invoice_from_entity(invoice),
        Some(Meta::empty()),
    ))
}

/// Assemble the typed document handed to the PDF renderer.
pub async fn assemble_document(
    state: &AppState,
    user: &AuthUser,
    invoice_id: Uuid,
    require_reference: bool,
) -> AppResult<ApiResponse<InvoiceDocument>> {
    let (invoice, order) = load_owned_invoice(state, user, invoice_id).await?;

    let customer = Users::find_by_id(order.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::MissingData("customer not found for order".into()))?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?;

    let references = PaymentReferences::find()
        .filter(
            sea_orm::Condition::any()
                .add(RefCol::OrderId.eq(order.id))
                .add(RefCol::InvoiceId.eq(invoice.id)),
        )
        .all(&state.orm)
        .await?;

    let document = build_document(
        &invoice,
        &order,
        &customer,
        &items,
        &references,
        require_reference,
    )?;

    Ok(ApiResponse::success(
        "Invoice document",
        document,
        Some(Meta::empty()),
    ))
}

async fn load_owned_invoice(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<(InvoiceModel, OrderModel)> {
    let invoice = Invoices::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let order = Orders::find_by_id(invoice.order_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::MissingData("order not found for invoice".into()))?;

    if user.role != "admin" && order.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    Ok((invoice, order))
}

/// A stored subtotal wins; otherwise the line is priced on the spot.
fn line_total(item: &OrderItemModel) -> i64 {
    item.subtotal
        .unwrap_or(item.unit_price * item.quantity as i64)
}

/// Most recent reference: created_at descending, id descending as the
/// tiebreak within one timestamp.
pub fn latest_reference(references: &[ReferenceModel]) -> Option<&ReferenceModel> {
    references
        .iter()
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        })
}

fn build_document(
    invoice: &InvoiceModel,
    order: &OrderModel,
    customer: &UserModel,
    items: &[OrderItemModel],
    references: &[ReferenceModel],
    require_reference: bool,
) -> AppResult<InvoiceDocument> {
    let payment_reference = latest_reference(references).map(|r| r.reference.clone());
    if require_reference && payment_reference.is_none() {
        return Err(AppError::MissingReference);
    }

    let lines: Vec<DocumentLine> = items
        .iter()
        .map(|item| {
            let total = line_total(item);
            DocumentLine {
                description: item.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                unit_price_display: format_kwanza(Some(item.unit_price)),
                line_total: total,
                line_total_display: format_kwanza(Some(total)),
            }
        })
        .collect();

    // An invoice without stored lines falls back to the order total.
    let grand_total = if lines.is_empty() {
        order.total_amount
    } else {
        lines.iter().map(|l| l.line_total).sum()
    };

    Ok(InvoiceDocument {
        invoice_number: invoice.invoice_number.clone(),
        status: invoice.status.clone(),
        issued_at: invoice.created_at.with_timezone(&chrono::Utc),
        due_date: invoice.due_date.with_timezone(&chrono::Utc),
        customer: DocumentCustomer {
            name: customer
                .name
                .clone()
                .unwrap_or_else(|| customer.email.clone()),
            email: customer.email.clone(),
            nif: customer.nif.clone(),
        },
        lines,
        grand_total,
        grand_total_display: format_kwanza(Some(grand_total)),
        payment_reference,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn reference_at(offset_secs: i64, id_byte: u8, code: &str) -> ReferenceModel {
        let created = Utc::now() + Duration::seconds(offset_secs);
        ReferenceModel {
            id: Uuid::from_bytes([id_byte; 16]),
            order_id: Some(Uuid::nil()),
            invoice_id: None,
            reference: code.to_string(),
            amount: 1000,
            status: "pending".into(),
            gateway_token: None,
            created_at: created.into(),
            updated_at: created.into(),
        }
    }

    fn item(unit_price: i64, quantity: i32, subtotal: Option<i64>) -> OrderItemModel {
        OrderItemModel {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            product_id: None,
            name: "Hosting Plan M".into(),
            unit_price,
            quantity,
            duration: Some(1),
            duration_unit: Some("year".into()),
            subtotal,
            created_at: Utc::now().into(),
        }
    }

    fn invoice() -> InvoiceModel {
        InvoiceModel {
            id: Uuid::new_v4(),
            order_id: Uuid::nil(),
            invoice_number: "INV-20260830-fa3c0de1".into(),
            status: "issued".into(),
            due_date: (Utc::now() + Duration::days(3)).into(),
            payment_reference: None,
            pdf_url: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn order(total_amount: i64) -> OrderModel {
        OrderModel {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            total_amount,
            status: "pending".into(),
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn customer() -> UserModel {
        UserModel {
            id: Uuid::new_v4(),
            email: "cliente@example.ao".into(),
            password_hash: "x".into(),
            name: Some("Cliente Teste".into()),
            nif: Some("5000088927".into()),
            created_at: Utc::now().into(),
            role: "user".into(),
        }
    }

    #[test]
    fn picks_most_recent_reference() {
        let refs = vec![
            reference_at(-30, 1, "old0000001"),
            reference_at(10, 2, "new0000001"),
            reference_at(-5, 3, "mid0000001"),
        ];
        assert_eq!(latest_reference(&refs).unwrap().reference, "new0000001");
    }

    #[test]
    fn reference_tiebreak_is_by_id() {
        let t = Utc::now();
        let mut a = reference_at(0, 1, "aaaa000001");
        let mut b = reference_at(0, 9, "bbbb000001");
        a.created_at = t.into();
        b.created_at = t.into();
        assert_eq!(latest_reference(&[a, b]).unwrap().reference, "bbbb000001");
    }

    #[test]
    fn no_references_means_none() {
        assert!(latest_reference(&[]).is_none());
    }

    #[test]
    fn stored_subtotal_wins_over_recalculation() {
        assert_eq!(line_total(&item(1000, 3, Some(2700))), 2700);
        assert_eq!(line_total(&item(1000, 3, None)), 3000);
    }

    #[test]
    fn single_item_round_trip() {
        let items = vec![item(25_000, 1, None)];
        let doc = build_document(&invoice(), &order(0), &customer(), &items, &[], false).unwrap();
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].line_total, 25_000);
        assert_eq!(doc.grand_total, 25_000);
        assert_eq!(doc.grand_total_display, "KZ 25.000,00");
    }

    #[test]
    fn empty_items_fall_back_to_order_total() {
        let doc =
            build_document(&invoice(), &order(35_000), &customer(), &[], &[], false).unwrap();
        assert!(doc.lines.is_empty());
        assert_eq!(doc.grand_total, 35_000);
        assert_eq!(doc.grand_total_display, "KZ 35.000,00");
    }

    #[test]
    fn required_reference_missing_is_an_error() {
        let err = build_document(&invoice(), &order(1000), &customer(), &[], &[], true)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingReference));
    }

    #[test]
    fn document_carries_customer_nif_and_reference() {
        let refs = vec![reference_at(0, 1, "ab1c212345")];
        let doc = build_document(&invoice(), &order(1000), &customer(), &[], &refs, true).unwrap();
        assert_eq!(doc.payment_reference.as_deref(), Some("ab1c212345"));
        assert_eq!(doc.customer.nif.as_deref(), Some("5000088927"));
    }
}
