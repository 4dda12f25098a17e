use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{ReferenceStatus, WebhookPayload},
    error::AppResult,
    response::ApiResponse,
    services::webhook_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/appypay", post(appypay_callback))
}

/// Inbound gateway callback; no bearer auth, keyed by reference string.
#[utoipa::path(
    post,
    path = "/api/webhooks/appypay",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Status recorded (idempotent on replay)", body = ApiResponse<ReferenceStatus>),
        (status = 404, description = "Unknown reference"),
    ),
    tag = "Webhooks"
)]
pub async fn appypay_callback(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<ApiResponse<ReferenceStatus>>> {
    let resp = webhook_service::handle_callback(&state, payload).await?;
    Ok(Json(resp))
}
