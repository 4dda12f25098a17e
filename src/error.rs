use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("No payment reference exists for this invoice")]
    MissingReference,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable code surfaced next to the user-facing message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Forbidden => "FORBIDDEN",
            AppError::MissingData(_) => "MISSING_DATA",
            AppError::MissingReference => "MISSING_REFERENCE",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Gateway(_) => "GATEWAY_ERROR",
            AppError::DbError(_) | AppError::OrmError(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::MissingData(_) | AppError::MissingReference => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(_)
            | AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
                code: self.code(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_taxonomy() {
        assert_eq!(AppError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(AppError::Gateway("down".into()).code(), "GATEWAY_ERROR");
        assert_eq!(AppError::MissingReference.code(), "MISSING_REFERENCE");
        assert_eq!(
            AppError::Persistence("conflict".into()).code(),
            "PERSISTENCE_ERROR"
        );
    }

    #[test]
    fn gateway_errors_map_to_bad_gateway() {
        assert_eq!(
            AppError::Gateway("timeout".into()).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::MissingReference.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
