//! Service Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Purchasable offering (trademark filing, registration, ...)
///
/// Read-only from the enrollment core's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    /// Base price before any discount
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub is_active: bool,
    /// Drives the case deadline; `None` falls back to the configured default
    pub sla_hours: Option<i32>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub documents_required: Vec<String>,
}
