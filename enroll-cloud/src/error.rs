//! Unified service-layer error type for enroll-cloud
//!
//! `ServiceError` bridges store and gateway failures to the API-layer
//! `AppError`, so handlers and the orchestrator can use `?` throughout.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::StoreError;
use crate::razorpay::GatewayError;

#[derive(Debug)]
pub enum ServiceError {
    /// Store failure (auto-logged, mapped to a generic code)
    Db(StoreError),
    /// Payment gateway failure (auto-logged, mapped to `GatewayError`)
    Gateway(GatewayError),
    /// Business-rule error (passed through to the client)
    App(AppError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<GatewayError> for ServiceError {
    fn from(e: GatewayError) -> Self {
        ServiceError::Gateway(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(StoreError::Duplicate(constraint)) => {
                tracing::warn!(%constraint, "Unique key collision");
                AppError::new(ErrorCode::DuplicateRecord)
            }
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Store error");
                AppError::new(ErrorCode::InternalError)
            }
            ServiceError::Gateway(gw_err) => {
                tracing::error!(error = %gw_err, "Payment gateway error");
                AppError::new(ErrorCode::GatewayError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;
