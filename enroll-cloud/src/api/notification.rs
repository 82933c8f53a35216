//! Notification API handlers
//!
//! - `GET /api/notifications`: the caller's own notifications, newest first

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use shared::error::ApiResponse;
use shared::models::Notification;

use super::ApiResult;
use crate::auth::Actor;
use crate::error::ServiceError;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Notification>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let list = state
        .store
        .notifications_for(&actor.id, limit)
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(ApiResponse::success(list)))
}
