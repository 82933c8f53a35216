//! Payment API handlers
//!
//! - `POST /api/payment/verify-enrollment`: phase 2 of a gateway enrollment
//! - `GET /api/payments/history`: role-scoped payment history

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;
use shared::error::{ApiResponse, AppError};
use shared::models::{PaymentMethod, PaymentStatus};
use validator::Validate;

use super::{ApiResult, ValidatedJson};
use crate::auth::Actor;
use crate::enrollment::{CommittedEnrollment, VerificationRequest};
use crate::history::{self, HistoryFilter, PaymentHistory};
use crate::state::AppState;

/// Checkout callback fields as Razorpay names them
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEnrollmentBody {
    #[validate(length(min = 1, message = "razorpay_order_id is required"))]
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
}

pub async fn verify_enrollment(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<VerifyEnrollmentBody>,
) -> Result<(StatusCode, Json<ApiResponse<CommittedEnrollment>>), AppError> {
    let committed = state
        .enrollments
        .complete_verified_enrollment(
            &actor,
            VerificationRequest {
                order_id: body.razorpay_order_id,
                payment_id: body.razorpay_payment_id,
                signature: body.razorpay_signature,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Payment verified and enrollment completed",
            committed,
        )),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub page: Option<u32>,
    #[serde(alias = "perPage")]
    pub per_page: Option<u32>,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<PaymentHistory> {
    if let (Some(from), Some(to)) = (params.from, params.to)
        && from > to
    {
        return Err(AppError::validation("from must not be after to"));
    }

    let filter = HistoryFilter {
        search: params.search,
        status: params.status,
        method: params.method,
        from: params.from,
        to: params.to,
        page: params.page,
        per_page: params.per_page,
    };
    let result = history::payment_history(state.store.as_ref(), &actor, filter)
        .await
        .map_err(crate::error::ServiceError::from)?;
    Ok(Json(ApiResponse::success(result)))
}
