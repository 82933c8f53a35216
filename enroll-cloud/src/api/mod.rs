//! API routes for enroll-cloud

pub mod coupon;
pub mod enrollment;
pub mod health;
pub mod notification;
pub mod payment;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use serde::de::DeserializeOwned;
use shared::error::{ApiResponse, AppError};
use tower_http::trace::TraceLayer;
use validator::Validate;

use crate::auth::actor_auth_middleware;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// JSON body that is deserialized and then checked with its `Validate` rules.
///
/// Both failure kinds reject with `ValidationFailed` (400) in the usual
/// `ApiResponse` envelope; serde's message is only logged.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| {
                tracing::debug!(error = %rejection.body_text(), "Rejected request body");
                AppError::validation("Invalid request body")
            })?;
        body.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(Self(body))
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Everything below requires a bearer JWT
    let authenticated = Router::new()
        .route("/api/enrollment/create", post(enrollment::create_enrollment))
        .route(
            "/api/enrollment/payment-methods",
            get(enrollment::payment_methods),
        )
        .route(
            "/api/payment/verify-enrollment",
            post(payment::verify_enrollment),
        )
        .route("/api/payments/history", get(payment::history))
        .route("/api/coupons/preview", post(coupon::preview))
        .route("/api/notifications", get(notification::list))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            actor_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(authenticated)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
