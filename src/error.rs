//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::StoreError;

/// Message returned for every failure that is not one of the recognized kinds.
pub const GENERIC_ERROR_MESSAGE: &str = "Request cannot be processed";

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Not found**: a customer or card id does not resolve to a stored record
/// - **Ownership mismatch**: a card exists but belongs to another customer
/// - **Unclassified**: storage faults and unreadable requests; details are logged, never returned
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Returns HTTP 404 Not Found.
    #[error("Customer not found")]
    CustomerNotFound,

    /// Returns HTTP 404 Not Found.
    #[error("Card not found")]
    CardNotFound,

    /// The card's owner differs from the customer in the request path.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Card does not belong to customer")]
    OwnershipMismatch,

    /// Storage layer failure (connection loss, constraint violation, ...).
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Request body was not valid JSON for the expected shape.
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    /// A path segment could not be parsed (e.g. a non-numeric id).
    #[error("Malformed request path: {0}")]
    MalformedPath(#[from] PathRejection),
}

impl AppError {
    /// Status code for this error. Only the recognized kinds escape the 500 class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::CustomerNotFound | AppError::CardNotFound | AppError::OwnershipMismatch => {
                StatusCode::NOT_FOUND
            }
            AppError::Store(_) | AppError::MalformedBody(_) | AppError::MalformedPath(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// JSON body of every error response.
///
/// ```json
/// {
///   "errorMessage": "Customer not found",
///   "errorCode": 404,
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub error_message: String,
    pub error_code: u16,
    pub timestamp: DateTime<Utc>,
}

/// Convert AppError into an HTTP response.
///
/// # Status Code Mapping
///
/// - `CustomerNotFound`, `CardNotFound`, `OwnershipMismatch` → 404 Not Found
/// - everything else → 500 Internal Server Error with a fixed message
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = if status == StatusCode::NOT_FOUND {
            tracing::warn!(error = %self, "Request rejected");
            self.to_string()
        } else {
            // Internal details stay in the logs
            tracing::error!(error = %self, "Request failed");
            GENERIC_ERROR_MESSAGE.to_string()
        };

        let body = Json(ErrorInfo {
            error_message: message,
            error_code: status.as_u16(),
            timestamp: Utc::now(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: AppError) -> (StatusCode, ErrorInfo) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn recognized_kinds_map_to_not_found_with_their_message() {
        for (error, message) in [
            (AppError::CustomerNotFound, "Customer not found"),
            (AppError::CardNotFound, "Card not found"),
            (AppError::OwnershipMismatch, "Card does not belong to customer"),
        ] {
            let (status, info) = body_of(error).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(info.error_code, 404);
            assert_eq!(info.error_message, message);
        }
    }

    #[tokio::test]
    async fn storage_failures_hide_their_details() {
        let error = AppError::Store(StoreError::DuplicateKey(
            "customer 1 already exists".to_string(),
        ));
        let (status, info) = body_of(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(info.error_code, 500);
        assert_eq!(info.error_message, GENERIC_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn database_failures_hide_their_details() {
        let error = AppError::Store(StoreError::Database(sqlx::Error::PoolTimedOut));
        let (status, info) = body_of(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(info.error_message, GENERIC_ERROR_MESSAGE);
    }
}
