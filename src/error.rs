//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type of the HTTP layer. Ledger
//! rejections travel inside [`GatewayError::Ledger`] with their contract
//! message intact and a status derived from their [`ErrorKind`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ErrorKind, LedgerError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "Investment amount larger than pool availability.",
///     "details": "capacity_exceeded"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Ledger error kind, when the failure came from the ledger.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict| 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 Internal Server Error    |
/// | 4000–4999 | Ledger rejection  | 403 / 422                    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Pool with the given ID was not found.
    #[error("pool not found: {0}")]
    PoolNotFound(uuid::Uuid),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::PoolNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::Ledger(err) => match err.kind() {
                ErrorKind::InvalidInput => 1002,
                ErrorKind::NotFound => 2002,
                ErrorKind::IdInUse => 2003,
                ErrorKind::Unauthorized => 4000,
                ErrorKind::CapacityExceeded => 4001,
                ErrorKind::InsufficientFunds => 4002,
                ErrorKind::BelowMinimumTicket => 4003,
                ErrorKind::AmountMismatch => 4004,
            },
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PoolNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Ledger(err) => match err.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::IdInUse => StatusCode::CONFLICT,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::CapacityExceeded
                | ErrorKind::InsufficientFunds
                | ErrorKind::BelowMinimumTicket
                | ErrorKind::AmountMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            },
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Ledger(err) => serde_json::to_value(err.kind())
                .ok()
                .and_then(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PositionId;

    #[test]
    fn ledger_errors_keep_contract_message() {
        let err = GatewayError::from(LedgerError::CapacityExceeded {
            requested: 11,
            available: 10,
        });
        assert_eq!(
            err.to_string(),
            "Investment amount larger than pool availability."
        );
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.error_code(), 4001);
        assert_eq!(err.details().as_deref(), Some("capacity_exceeded"));
    }

    #[test]
    fn ledger_kinds_map_to_statuses() {
        let not_found = GatewayError::from(LedgerError::PositionNotFound(PositionId::new(1)));
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        let in_use = GatewayError::from(LedgerError::PositionIdInUse(PositionId::new(1)));
        assert_eq!(in_use.status_code(), StatusCode::CONFLICT);
        let invalid = GatewayError::from(LedgerError::InvalidInput("x".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn gateway_errors_have_no_details() {
        let err = GatewayError::InvalidRequest("missing X-Caller header".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.details().is_none());
    }
}
