//! User Model

use serde::{Deserialize, Serialize};

/// Actor role
///
/// Immutable after creation as far as enrollment is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum Role {
    /// End user being serviced
    User,
    Employee,
    Agent,
    Associate,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Employee => "employee",
            Self::Agent => "agent",
            Self::Associate => "associate",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity (any actor: end user, employee, agent, associate, admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    /// How / by whom the account was created (e.g. "self", "agent:<id>")
    pub source_tag: Option<String>,
    /// Onboarding agent, for end users
    pub agent_id: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}
