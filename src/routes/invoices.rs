use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::invoices::{DocumentQuery, InvoiceDocument, InvoiceList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Invoice,
    response::ApiResponse,
    routes::params::Pagination,
    services::invoice_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invoices))
        .route("/{id}", get(get_invoice))
        .route("/{id}/document", get(get_document))
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List own invoices", body = ApiResponse<InvoiceList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<InvoiceList>>> {
    let resp = invoice_service::list_invoices(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    params(
        ("id" = Uuid, Path, description = "Invoice ID")
    ),
    responses(
        (status = 200, description = "Own invoice", body = ApiResponse<Invoice>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Invoice>>> {
    let resp = invoice_service::get_invoice(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/document",
    params(
        ("id" = Uuid, Path, description = "Invoice ID"),
        ("require_reference" = Option<bool>, Query, description = "Fail instead of emitting a document without a payment reference")
    ),
    responses(
        (status = 200, description = "Renderer-ready invoice document", body = ApiResponse<InvoiceDocument>),
        (status = 422, description = "Missing order or required reference"),
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_document(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DocumentQuery>,
) -> AppResult<Json<ApiResponse<InvoiceDocument>>> {
    let require_reference = query.require_reference.unwrap_or(false);
    let resp = invoice_service::assemble_document(&state, &user, id, require_reference).await?;
    Ok(Json(resp))
}
