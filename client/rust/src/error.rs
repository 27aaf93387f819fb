//! Error taxonomy shared by the business layer, both transports and both clients.
//!
//! Every kind maps to exactly one gRPC code and one HTTP status, and each client
//! inverts that mapping, so callers never branch on which transport was used.

use http::StatusCode;
use tonic::{Code, Status};

/// Result type for billing operations.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Errors that can occur anywhere in the billing pipeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BillingError {
    /// Malformed or out-of-range input. Never retried.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// No invoice state exists for the vehicle.
    #[error("no invoice for obu {0}")]
    NotFound(i64),

    /// Network or connection failure talking to the aggregator.
    #[error("transport error: {0}")]
    Transport(String),

    /// Unexpected failure inside the store or aggregator.
    #[error("internal error: {0}")]
    Internal(String),

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's deadline elapsed before a response arrived.
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Non-standard "client closed request" status used for cancellations.
const CLIENT_CLOSED_REQUEST: u16 = 499;

impl BillingError {
    pub fn validation(msg: impl Into<String>) -> Self {
        BillingError::Validation(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        BillingError::Transport(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        BillingError::Internal(msg.into())
    }

    /// Returns true if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::NotFound(_))
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, BillingError::Validation(_))
    }

    /// Returns true if redelivering the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::Transport(_) | BillingError::DeadlineExceeded
        )
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BillingError::Validation(_) => "validation",
            BillingError::NotFound(_) => "not_found",
            BillingError::Transport(_) => "transport",
            BillingError::Internal(_) => "internal",
            BillingError::Cancelled => "cancelled",
            BillingError::DeadlineExceeded => "deadline_exceeded",
        }
    }

    /// gRPC code for this error kind.
    pub fn grpc_code(&self) -> Code {
        match self {
            BillingError::Validation(_) => Code::InvalidArgument,
            BillingError::NotFound(_) => Code::NotFound,
            BillingError::Transport(_) => Code::Unavailable,
            BillingError::Internal(_) => Code::Internal,
            BillingError::Cancelled => Code::Cancelled,
            BillingError::DeadlineExceeded => Code::DeadlineExceeded,
        }
    }

    /// HTTP status for this error kind.
    pub fn http_status(&self) -> StatusCode {
        match self {
            BillingError::Validation(_) => StatusCode::BAD_REQUEST,
            BillingError::NotFound(_) => StatusCode::NOT_FOUND,
            BillingError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            BillingError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BillingError::Cancelled => StatusCode::from_u16(CLIENT_CLOSED_REQUEST)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            BillingError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Rebuild an error from a non-success HTTP response.
    ///
    /// `vehicle_id` is attached to 404s, since the body only carries a message.
    pub fn from_http(status: StatusCode, message: String, vehicle_id: i64) -> Self {
        match status.as_u16() {
            400 => BillingError::Validation(message),
            404 => BillingError::NotFound(vehicle_id),
            CLIENT_CLOSED_REQUEST => BillingError::Cancelled,
            502 | 503 => BillingError::Transport(message),
            504 => BillingError::DeadlineExceeded,
            _ => BillingError::Internal(message),
        }
    }

    /// Rebuild an error from a gRPC status returned by the aggregator.
    pub fn from_status(status: &Status, vehicle_id: i64) -> Self {
        let message = status.message().to_string();
        match status.code() {
            Code::InvalidArgument => BillingError::Validation(message),
            Code::NotFound => BillingError::NotFound(vehicle_id),
            Code::Unavailable => BillingError::Transport(message),
            Code::Cancelled => BillingError::Cancelled,
            Code::DeadlineExceeded => BillingError::DeadlineExceeded,
            _ => BillingError::Internal(message),
        }
    }
}

impl From<BillingError> for Status {
    fn from(err: BillingError) -> Self {
        Status::new(err.grpc_code(), err.to_string())
    }
}

impl From<tonic::transport::Error> for BillingError {
    fn from(err: tonic::transport::Error) -> Self {
        BillingError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for BillingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BillingError::DeadlineExceeded
        } else if err.is_decode() {
            BillingError::Transport(format!("malformed response: {err}"))
        } else {
            BillingError::Transport(err.to_string())
        }
    }
}
