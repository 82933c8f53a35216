//! Notification Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum NotificationKind {
    Enrollment,
    Payment,
}

/// Notification record (delivery is handled elsewhere)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// References `Case::id`
    pub related_case_id: Option<String>,
    pub is_read: bool,
    pub created_at: i64,
}
