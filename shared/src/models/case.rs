//! Case Model

use serde::{Deserialize, Serialize};

use super::user::Role;

/// Case lifecycle status
///
/// Enrollment only ever creates cases at `New`; later transitions belong to
/// the employee/admin workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum CaseStatus {
    New,
    InProgress,
    Completed,
    Cancelled,
}

/// Who initiated the enrollment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum EnrollmentType {
    #[serde(rename = "self")]
    #[cfg_attr(feature = "db", sqlx(rename = "self"))]
    SelfEnrolled,
    Admin,
    Employee,
    Agent,
    Associate,
}

impl EnrollmentType {
    /// Enrollment type for an enroller acting on `target_user_id`
    pub fn for_enroller(enroller_id: &str, enroller_role: Role, target_user_id: &str) -> Self {
        if enroller_id == target_user_id {
            return Self::SelfEnrolled;
        }
        match enroller_role {
            Role::Admin => Self::Admin,
            Role::Employee => Self::Employee,
            Role::Agent => Self::Agent,
            Role::Associate => Self::Associate,
            Role::User => Self::SelfEnrolled,
        }
    }
}

/// One instance of a user being serviced
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Case {
    /// Opaque primary key (UUID v4)
    pub id: String,
    /// Human-readable id, `CASE-<millis>-<seq>-<suffix>`
    pub case_id: String,
    pub end_user_id: String,
    pub service_id: String,
    pub employee_id: Option<String>,
    pub status: CaseStatus,
    pub current_step: i32,
    pub deadline: i64,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub notes: Vec<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub documents: Vec<String>,
    pub enrolled_by: String,
    pub enrollment_type: EnrollmentType,
    pub enrolled_at: i64,
}
