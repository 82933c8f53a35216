//! Data models
//!
//! Shared between enroll-cloud and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! IDs are opaque strings (UUID v4); timestamps are Unix milliseconds.

pub mod case;
pub mod coupon;
pub mod notification;
pub mod payment;
pub mod pending_order;
pub mod service;
pub mod user;

// Re-exports
pub use case::*;
pub use coupon::*;
pub use notification::*;
pub use payment::*;
pub use pending_order::*;
pub use service::*;
pub use user::*;
