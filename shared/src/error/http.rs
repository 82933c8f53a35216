//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::UserNotFound
            | Self::ServiceNotFound
            | Self::CaseNotFound
            | Self::CouponNotFound
            | Self::PaymentOrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::DuplicateRecord => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::CashNotPermitted
            | Self::TestPaymentsDisabled
            | Self::OrderOwnerMismatch => StatusCode::FORBIDDEN,

            // 502 Bad Gateway (upstream payment processor)
            Self::GatewayError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::PaymentFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
