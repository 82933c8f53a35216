//! Enrollment API handlers
//!
//! - `POST /api/enrollment/create`: cash commit (201) or gateway quote (200)
//! - `GET /api/enrollment/payment-methods`: channels available to the caller

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::PaymentMethod;
use validator::Validate;

use super::{ApiResult, ValidatedJson};
use crate::auth::Actor;
use crate::enrollment::{
    CashDetailsInput, EnrollmentOutcome, EnrollmentRequest, PaymentMethodOption,
};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CashDetailsBody {
    #[validate(length(max = 64, message = "receiptNumber is too long"))]
    pub receipt_number: Option<String>,
    #[validate(length(max = 1000, message = "notes is too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEnrollmentBody {
    pub end_user_id: Option<String>,
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,
    pub payment_method: PaymentMethod,
    #[validate(nested)]
    pub cash_details: Option<CashDetailsBody>,
    #[validate(length(max = 64, message = "couponCode is too long"))]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub is_test_mode: bool,
}

impl From<CreateEnrollmentBody> for EnrollmentRequest {
    fn from(body: CreateEnrollmentBody) -> Self {
        Self {
            target_user_id: body.end_user_id,
            service_id: body.service_id,
            payment_method: body.payment_method,
            coupon_code: body.coupon_code,
            cash_details: body.cash_details.map(|c| CashDetailsInput {
                receipt_number: c.receipt_number,
                notes: c.notes,
            }),
            test_mode: body.is_test_mode,
        }
    }
}

pub async fn create_enrollment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<CreateEnrollmentBody>,
) -> Result<Response, AppError> {
    let outcome = state
        .enrollments
        .create_enrollment(&actor, body.into())
        .await?;

    Ok(match outcome {
        EnrollmentOutcome::Committed(committed) => (
            StatusCode::CREATED,
            Json(ApiResponse::success_with_message(
                "Enrollment completed",
                committed,
            )),
        )
            .into_response(),
        EnrollmentOutcome::AwaitingPayment(quoted) => Json(ApiResponse::success_with_message(
            "Payment order created",
            quoted,
        ))
        .into_response(),
    })
}

pub async fn payment_methods(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<PaymentMethodOption>> {
    Ok(Json(ApiResponse::success(
        state.enrollments.payment_methods(&actor),
    )))
}
