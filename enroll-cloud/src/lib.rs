//! enroll-cloud: enrollment and payment reconciliation service
//!
//! - Turns an enrollment request into a case, its payment, the coupon
//!   redemption and notifications, committed as one unit
//! - Cash is committed immediately; Razorpay runs a quote / verify cycle
//!   backed by server-side pending orders
//! - Role-scoped payment history with an analytics rollup

pub mod api;
pub mod auth;
pub mod config;
pub mod coupon;
pub mod db;
pub mod enrollment;
pub mod error;
pub mod history;
pub mod ids;
pub mod notify;
pub mod razorpay;
pub mod state;

#[cfg(test)]
mod test_support;
