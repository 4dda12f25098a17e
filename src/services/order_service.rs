use chrono::{Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        domain_extensions::{Column as ExtCol, Entity as DomainExtensions},
        invoices::ActiveModel as InvoiceActive,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    pricing,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::convert::{invoice_from_entity, order_from_entity, order_item_from_entity},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

/// Priced order line derived from one cart row.
struct PricedLine {
    product_id: Option<Uuid>,
    name: String,
    unit_price: i64,
    quantity: i32,
    duration: Option<i32>,
    duration_unit: Option<String>,
    subtotal: i64,
}

pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    _payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    let txn = state.orm.begin().await?;

    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if rows.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }

    let mut lines: Vec<PricedLine> = Vec::with_capacity(rows.len());
    for row in &rows {
        let line = match row.kind.as_str() {
            "product" => {
                let product_id = row.product_id.ok_or_else(|| {
                    AppError::MissingData("product cart line without product id".into())
                })?;
                let product = Products::find()
                    .filter(
                        Condition::all()
                            .add(ProdCol::Id.eq(product_id))
                            .add(ProdCol::Active.eq(true)),
                    )
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation("product no longer available".into())
                    })?;
                if row.quantity <= 0 {
                    return Err(AppError::Validation("Cart has invalid quantity".into()));
                }
                PricedLine {
                    product_id: Some(product.id),
                    name: product.name,
                    unit_price: product.price,
                    quantity: row.quantity,
                    duration: Some(1),
                    duration_unit: Some("year".into()),
                    subtotal: product.price * row.quantity as i64,
                }
            }
            "domain" => {
                let (Some(domain_name), Some(extension), Some(years)) =
                    (row.domain_name.as_ref(), row.extension.as_ref(), row.years)
                else {
                    return Err(AppError::MissingData(
                        "domain cart line missing name, extension or term".into(),
                    ));
                };
                if years < 1 {
                    return Err(AppError::Validation("Cart has invalid domain term".into()));
                }
                let ext = DomainExtensions::find()
                    .filter(ExtCol::Name.eq(extension.as_str()))
                    .one(&txn)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation(format!("unknown domain extension '{extension}'"))
                    })?;
                let total = pricing::multi_year_price(ext.base_price, years as u32);
                PricedLine {
                    product_id: None,
                    name: format!("Domain {domain_name}{extension} ({years} year(s))"),
                    unit_price: total,
                    quantity: 1,
                    duration: Some(years),
                    duration_unit: Some("year".into()),
                    subtotal: total,
                }
            }
            other => {
                return Err(AppError::MissingData(format!(
                    "unknown cart line kind '{other}'"
                )));
            }
        };
        lines.push(line);
    }

    let total_amount: i64 = lines.iter().map(|l| l.subtotal).sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total_amount: Set(total_amount),
        status: Set("pending".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut order_items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            name: Set(line.name),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            duration: Set(line.duration),
            duration_unit: Set(line.duration_unit),
            subtotal: Set(Some(line.subtotal)),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        order_items.push(order_item_from_entity(item));
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    let invoice_id = Uuid::new_v4();
    let invoice = InvoiceActive {
        id: Set(invoice_id),
        order_id: Set(order.id),
        invoice_number: Set(build_invoice_number(invoice_id)),
        status: Set("draft".into()),
        due_date: Set((Utc::now() + Duration::days(3)).into()),
        payment_reference: Set(None),
        pdf_url: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "invoice_id": invoice.id })),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        CheckoutResponse {
            order: order_from_entity(order),
            items: order_items,
            invoice: invoice_from_entity(invoice),
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

fn build_invoice_number(invoice_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = invoice_id.to_string();
    let short = &suffix[..8];
    format!("INV-{}-{}", date, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_numbers_embed_date_and_id_prefix() {
        let id = Uuid::parse_str("fa3c0de1-0000-0000-0000-000000000000").unwrap();
        let number = build_invoice_number(id);
        assert!(number.starts_with("INV-"));
        assert!(number.ends_with("-fa3c0de1"));
        assert_eq!(number.len(), "INV-".len() + 8 + 1 + 8);
    }
}
