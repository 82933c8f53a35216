//! Coupon API handlers
//!
//! - `POST /api/coupons/preview`: price a service with a coupon before enrolling

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;
use shared::error::ApiResponse;
use validator::Validate;

use super::{ApiResult, ValidatedJson};
use crate::auth::Actor;
use crate::enrollment::DiscountPreview;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreviewBody {
    #[validate(length(min = 1, message = "serviceId is required"))]
    pub service_id: String,
    #[validate(length(min = 1, max = 64, message = "couponCode is required"))]
    pub coupon_code: String,
    pub end_user_id: Option<String>,
}

pub async fn preview(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    ValidatedJson(body): ValidatedJson<PreviewBody>,
) -> ApiResult<DiscountPreview> {
    let preview = state
        .enrollments
        .preview_discount(&actor, &body.service_id, &body.coupon_code, body.end_user_id)
        .await?;
    Ok(Json(ApiResponse::success(preview)))
}
