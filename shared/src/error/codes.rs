//! Unified error codes for the enrollment platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Enrollment errors (users, services, cases)
//! - 4xxx: Coupon errors
//! - 5xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 6,
    /// Value out of range
    ValueOutOfRange = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1002,
    /// Token is invalid
    TokenInvalid = 1003,
    /// Account is disabled
    AccountDisabled = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Role may not accept cash payments
    CashNotPermitted = 2002,
    /// Test payments are disabled in this environment
    TestPaymentsDisabled = 2003,
    /// Pending order belongs to another enroller
    OrderOwnerMismatch = 2004,

    // ==================== 3xxx: Enrollment ====================
    /// Target user not found
    UserNotFound = 3001,
    /// Target user is deactivated
    UserInactive = 3002,
    /// Service not found
    ServiceNotFound = 3101,
    /// Service is not active
    ServiceInactive = 3102,
    /// Case not found
    CaseNotFound = 3201,

    // ==================== 4xxx: Coupon ====================
    /// Coupon not found
    CouponNotFound = 4001,
    /// Coupon is not active
    CouponInactive = 4002,
    /// Coupon validity window has not started
    CouponNotYetValid = 4003,
    /// Coupon validity window has ended
    CouponExpired = 4004,
    /// Coupon total usage limit reached
    CouponLimitReached = 4005,
    /// Coupon per-user usage limit reached
    CouponUserLimitReached = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment processing failed
    PaymentFailed = 5001,
    /// Invalid payment method
    PaymentInvalidMethod = 5002,
    /// Payment signature verification failed
    InvalidPayment = 5003,
    /// Upstream payment gateway error
    GatewayError = 5004,
    /// Pending payment order not found (or already consumed)
    PaymentOrderNotFound = 5005,
    /// Pending payment order expired
    PaymentOrderExpired = 5006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Unique key collision in the store
    DuplicateRecord = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CashNotPermitted => "Only admins and employees can accept cash payments",
            ErrorCode::TestPaymentsDisabled => "Test payments are disabled",
            ErrorCode::OrderOwnerMismatch => "Payment order was created by another user",

            // Enrollment
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::UserInactive => "User account is not active",
            ErrorCode::ServiceNotFound => "Service not found",
            ErrorCode::ServiceInactive => "Service is not available",
            ErrorCode::CaseNotFound => "Case not found",

            // Coupon
            ErrorCode::CouponNotFound => "Coupon not found",
            ErrorCode::CouponInactive => "Coupon is not active",
            ErrorCode::CouponNotYetValid => "Coupon is not yet valid",
            ErrorCode::CouponExpired => "Coupon has expired",
            ErrorCode::CouponLimitReached => "Coupon usage limit reached",
            ErrorCode::CouponUserLimitReached => "You have already used this coupon",

            // Payment
            ErrorCode::PaymentFailed => "Payment processing failed",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::InvalidPayment => "Invalid payment",
            ErrorCode::GatewayError => "Payment gateway error",
            ErrorCode::PaymentOrderNotFound => "Payment order not found or already completed",
            ErrorCode::PaymentOrderExpired => "Payment order has expired",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::DuplicateRecord => "Duplicate record",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::RequiredField),
            7 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::TokenExpired),
            1003 => Ok(ErrorCode::TokenInvalid),
            1004 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::CashNotPermitted),
            2003 => Ok(ErrorCode::TestPaymentsDisabled),
            2004 => Ok(ErrorCode::OrderOwnerMismatch),

            // Enrollment
            3001 => Ok(ErrorCode::UserNotFound),
            3002 => Ok(ErrorCode::UserInactive),
            3101 => Ok(ErrorCode::ServiceNotFound),
            3102 => Ok(ErrorCode::ServiceInactive),
            3201 => Ok(ErrorCode::CaseNotFound),

            // Coupon
            4001 => Ok(ErrorCode::CouponNotFound),
            4002 => Ok(ErrorCode::CouponInactive),
            4003 => Ok(ErrorCode::CouponNotYetValid),
            4004 => Ok(ErrorCode::CouponExpired),
            4005 => Ok(ErrorCode::CouponLimitReached),
            4006 => Ok(ErrorCode::CouponUserLimitReached),

            // Payment
            5001 => Ok(ErrorCode::PaymentFailed),
            5002 => Ok(ErrorCode::PaymentInvalidMethod),
            5003 => Ok(ErrorCode::InvalidPayment),
            5004 => Ok(ErrorCode::GatewayError),
            5005 => Ok(ErrorCode::PaymentOrderNotFound),
            5006 => Ok(ErrorCode::PaymentOrderExpired),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::DuplicateRecord),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}
