use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::nif::NifValidateRequest,
    nif::{self, NifCheck},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/validate", post(validate))
}

/// Validation never fails the request: bad input comes back as an invalid
/// result the form can render.
#[utoipa::path(
    post,
    path = "/api/nif/validate",
    request_body = NifValidateRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ApiResponse<NifCheck>)
    ),
    tag = "Nif"
)]
pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<NifValidateRequest>,
) -> Json<ApiResponse<NifCheck>> {
    let check = nif::validate(state.registry.as_ref(), &payload.nif).await;
    Json(ApiResponse::success(
        "NIF validation",
        check,
        Some(Meta::empty()),
    ))
}
