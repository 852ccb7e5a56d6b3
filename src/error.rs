use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::models::OrderStatus;
use crate::response::{ApiResponse, Meta};

/// Closed error taxonomy for the whole API. Every failure a handler can
/// produce is one of these variants; the single `IntoResponse` impl below
/// owns the mapping to transport status codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No tenants assigned to this account")]
    NoTenantsAssigned,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Restaurant not found")]
    RestaurantNotFound,

    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    Validation(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("File exceeds the {limit_mb}MB limit")]
    FileTooLarge { limit_mb: usize },

    #[error("Order status cannot change from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order was modified by another request")]
    VersionConflict,

    #[error("Image optimization failed")]
    ImageOptimization(#[source] image::ImageError),

    #[error("Upload to object storage failed")]
    Upload(#[from] reqwest::Error),

    #[error("Database error")]
    Db(#[from] sqlx::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidCredentials
            | AppError::NoTenantsAssigned
            | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RestaurantNotFound | AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::UnsupportedFileType(_)
            | AppError::FileTooLarge { .. } => StatusCode::BAD_REQUEST,
            AppError::IllegalTransition { .. } | AppError::VersionConflict => {
                StatusCode::CONFLICT
            }
            AppError::ImageOptimization(_)
            | AppError::Upload(_)
            | AppError::Db(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Full detail stays server-side; the body only carries the
            // generic variant message.
            tracing::error!(error = ?self, "request failed");
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
