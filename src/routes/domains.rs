use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::domains::{DomainQuote, ExtensionList, QuoteQuery},
    error::AppResult,
    response::ApiResponse,
    services::domain_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/extensions", get(list_extensions))
        .route("/quote", get(quote))
}

#[utoipa::path(
    get,
    path = "/api/domains/extensions",
    responses(
        (status = 200, description = "Domain pricing table", body = ApiResponse<ExtensionList>)
    ),
    tag = "Domains"
)]
pub async fn list_extensions(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<ExtensionList>>> {
    let resp = domain_service::list_extensions(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/domains/quote",
    params(
        ("extension" = String, Query, description = "Extension name, e.g. .ao"),
        ("years" = u32, Query, description = "Registration term in years"),
    ),
    responses(
        (status = 200, description = "Multi-year registration quote", body = ApiResponse<DomainQuote>),
        (status = 400, description = "Invalid term"),
        (status = 404, description = "Unknown extension"),
    ),
    tag = "Domains"
)]
pub async fn quote(
    State(state): State<AppState>,
    Query(query): Query<QuoteQuery>,
) -> AppResult<Json<ApiResponse<DomainQuote>>> {
    let resp = domain_service::quote(&state, query).await?;
    Ok(Json(resp))
}
