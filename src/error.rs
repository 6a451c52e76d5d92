//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::ledger::LedgerError;

/// Postgres SQLSTATE raised when a `SUM(...)::BIGINT` no longer fits.
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Authentication Errors**: Bad credentials, missing or expired sessions
/// - **Authorization Errors**: Role not allowed on the route
/// - **Resource Errors**: Requested resources not found
/// - **Ledger Errors**: Postings that violate double-entry rules
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Unique-constraint violations surface as 409, everything else as 500.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Email/password pair did not match an active user.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Bearer token is missing, unknown, expired or revoked.
    #[error("Invalid or expired session")]
    InvalidSession,

    /// Authenticated, but the role may not use this route.
    #[error("You do not have permission to perform this action")]
    Forbidden,

    /// The named entity does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Request body or parameters are invalid.
    #[error("Invalid request")]
    InvalidRequest(String),

    /// Posting rejected by the ledger rules.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A deposit does not hold enough to cover the deduction.
    #[error("Insufficient deposit balance")]
    InsufficientDeposit,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidCredentials`, `InvalidSession` → 401 Unauthorized
/// - `Forbidden` → 403 Forbidden
/// - `NotFound` → 404 Not Found
/// - `Conflict`, unique violations → 409 Conflict
/// - `Ledger`, `InsufficientDeposit`, numeric overflow in SQL → 422 Unprocessable Entity (malformed lines → 400)
/// - `InvalidRequest` → 400 Bad Request
/// - `Database`, `Backup`, `Internal` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                self.to_string(),
            ),
            AppError::InvalidSession => (
                StatusCode::UNAUTHORIZED,
                "invalid_session",
                self.to_string(),
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Ledger(ref err) => {
                let (status, code) = match err {
                    LedgerError::Unbalanced { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "unbalanced_entry")
                    }
                    LedgerError::PeriodLocked { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "period_locked")
                    }
                    LedgerError::InvalidTransition { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "invalid_status_transition")
                    }
                    LedgerError::AmountTooLarge => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "amount_too_large")
                    }
                    _ => (StatusCode::BAD_REQUEST, "invalid_entry"),
                };
                (status, code, err.to_string())
            }
            AppError::InsufficientDeposit => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "insufficient_deposit",
                self.to_string(),
            ),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Database(ref err)
                if err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation()) =>
            {
                (
                    StatusCode::CONFLICT,
                    "conflict",
                    "A record with the same unique value already exists".to_string(),
                )
            }
            AppError::Database(ref err)
                if err
                    .as_database_error()
                    .and_then(|db_err| db_err.code())
                    .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE) =>
            {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "amount_too_large",
                    LedgerError::AmountTooLarge.to_string(),
                )
            }
            AppError::Database(ref err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Backup(ref msg) | AppError::Internal(ref msg) => {
                tracing::error!("{}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
