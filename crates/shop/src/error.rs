//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers should return
//! `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use petal_market_cart::{CartError, CatalogError, FormDecodeError};

/// Application-level error type for the shop.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Catalog access failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The submitted cart form field could not be decoded.
    #[error("Cart form error: {0}")]
    CartForm(#[from] FormDecodeError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(CartError::Catalog(err)) | Self::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Cart(CartError::Persistence(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::CartForm(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match (&self, status) {
            (_, StatusCode::INTERNAL_SERVER_ERROR) => "Internal server error".to_string(),
            (_, StatusCode::BAD_GATEWAY) => "Catalog unavailable".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use petal_market_core::FlowerId;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("flower 9".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Catalog(CatalogError::NotFound(FlowerId::new(9)))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BadRequest("nope".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::CartForm(FormDecodeError::MalformedEntry(
                "x".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let response =
            AppError::Internal("secret connection string".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
