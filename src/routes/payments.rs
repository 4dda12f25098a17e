use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::payments::{CreateReferenceRequest, ReferenceCreated, ReferenceStatus},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/references", post(create_reference))
        .route("/references/{reference}", get(get_reference))
}

#[utoipa::path(
    post,
    path = "/api/payments/references",
    request_body = CreateReferenceRequest,
    responses(
        (status = 200, description = "Reference issued and gateway session opened", body = ApiResponse<ReferenceCreated>),
        (status = 400, description = "Invalid amount or target"),
        (status = 502, description = "Payment gateway failure"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReferenceRequest>,
) -> AppResult<Json<ApiResponse<ReferenceCreated>>> {
    let resp = payment_service::create_reference(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/references/{reference}",
    params(
        ("reference" = String, Path, description = "10-character payment reference")
    ),
    responses(
        (status = 200, description = "Current reference state", body = ApiResponse<ReferenceStatus>),
        (status = 404, description = "Not Found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_reference(
    State(state): State<AppState>,
    user: AuthUser,
    Path(reference): Path<String>,
) -> AppResult<Json<ApiResponse<ReferenceStatus>>> {
    let resp = payment_service::get_reference(&state, &user, &reference).await?;
    Ok(Json(resp))
}
