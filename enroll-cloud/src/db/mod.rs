//! Persistence layer
//!
//! The enrollment core talks to a [`Store`] so the same orchestration runs
//! against PostgreSQL in production and the in-memory store in development
//! and tests. All writes of one enrollment go through a single [`StoreTx`];
//! dropping it without [`StoreTx::commit`] rolls everything back.

pub mod cases;
pub mod coupons;
pub mod memory;
pub mod notifications;
pub mod payments;
pub mod pending_orders;
pub mod pg;
pub mod services;
pub mod users;

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{
    Case, Coupon, CouponUsage, Notification, Payment, PaymentMethod, PaymentStatus, PendingOrder,
    Service, User,
};

pub use memory::MemoryStore;
pub use pg::PgStore;

/// Store-level failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated (constraint name when known)
    #[error("duplicate key: {0}")]
    Duplicate(String),
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db_err) = e.as_database_error()
            && db_err.is_unique_violation()
        {
            return StoreError::Duplicate(db_err.constraint().unwrap_or("unknown").to_string());
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which payments an actor may see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryScope {
    /// Every payment
    All,
    /// Cases assigned to or enrolled by this employee
    AssignedOrEnrolled(String),
    /// Payments of users onboarded by this agent, plus its own enrollments
    AgentNetwork(String),
    /// Cases enrolled by this actor
    EnrolledBy(String),
    /// The actor's own payments
    Own(String),
}

/// Payment history filter, already scoped
#[derive(Debug, Clone)]
pub struct PaymentQuery {
    pub scope: HistoryScope,
    /// Case-insensitive substring over ids, coupon code, user and service names
    pub search: Option<String>,
    pub status: Option<PaymentStatus>,
    pub method: Option<PaymentMethod>,
    /// Inclusive lower bound on `paid_at`
    pub from: Option<i64>,
    /// Inclusive upper bound on `paid_at`
    pub to: Option<i64>,
}

impl PaymentQuery {
    pub fn scoped(scope: HistoryScope) -> Self {
        Self {
            scope,
            search: None,
            status: None,
            method: None,
            from: None,
            to: None,
        }
    }
}

/// Payment joined with its case, payer and service for display
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    /// Human-readable case id
    pub case_number: String,
    pub user_name: String,
    pub user_email: String,
    pub service_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Rollup over every payment matching a [`PaymentQuery`], independent of paging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_original_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Decimal,
    /// Payments that carried a coupon discount
    pub discounted_count: u64,
    /// Keyed by `PaymentMethod::as_str`
    pub by_method: BTreeMap<String, Bucket>,
    /// Keyed by `PaymentStatus::as_str`
    pub by_status: BTreeMap<String, Bucket>,
}

/// Read side and transaction factory
///
/// Implementations must not be called while the same task holds an open
/// [`StoreTx`]; gather reads before [`Store::begin`].
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    async fn find_service(&self, id: &str) -> StoreResult<Option<Service>>;

    /// Lookup by normalized (uppercase) code, usage history included
    async fn find_coupon_by_code(&self, code: &str) -> StoreResult<Option<Coupon>>;

    /// Ids of all active admins
    async fn active_admin_ids(&self) -> StoreResult<Vec<String>>;

    async fn count_cases(&self) -> StoreResult<i64>;

    async fn insert_pending_order(&self, order: &PendingOrder) -> StoreResult<()>;

    async fn find_pending_order(&self, order_id: &str) -> StoreResult<Option<PendingOrder>>;

    /// Remove quotes that expired before `now`; returns the number removed
    async fn purge_expired_pending_orders(&self, now: i64) -> StoreResult<u64>;

    /// One page of matching payments, newest first
    async fn query_payments(
        &self,
        query: &PaymentQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentView>>;

    /// Totals over all matching payments
    async fn summarize_payments(&self, query: &PaymentQuery) -> StoreResult<PaymentSummary>;

    /// Notifications for one recipient, newest first
    async fn notifications_for(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Notification>>;

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// One atomic unit of work
#[async_trait]
pub trait StoreTx: Send {
    /// Delete and return a pending order; `None` when already consumed
    async fn take_pending_order(&mut self, order_id: &str) -> StoreResult<Option<PendingOrder>>;

    async fn insert_case(&mut self, case: &Case) -> StoreResult<()>;

    async fn insert_payment(&mut self, payment: &Payment) -> StoreResult<()>;

    /// Load a coupon with its usage history, holding a write lock on it
    /// until the transaction ends
    async fn lock_coupon(&mut self, coupon_id: &str) -> StoreResult<Option<Coupon>>;

    /// Append a usage and bump `current_uses` together.
    /// Returns `false` when the case already carries a usage.
    async fn append_coupon_usage(&mut self, usage: &CouponUsage) -> StoreResult<bool>;

    async fn insert_notification(&mut self, notification: &Notification) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Escape `%`, `_` and `\` for use inside an ILIKE pattern
pub(crate) fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
