//! PostgreSQL-backed store

use async_trait::async_trait;
use shared::models::{
    Case, Coupon, CouponUsage, Notification, Payment, PendingOrder, Service, User,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, Transaction};

use super::{
    PaymentQuery, PaymentSummary, PaymentView, Store, StoreResult, StoreTx, cases, coupons,
    notifications, payments, pending_orders, services, users,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database connected and migrations applied");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(users::find_by_id(&self.pool, id).await?)
    }

    async fn find_service(&self, id: &str) -> StoreResult<Option<Service>> {
        Ok(services::find_by_id(&self.pool, id).await?)
    }

    async fn find_coupon_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let Some(mut coupon) = coupons::find_by_code(&self.pool, code).await? else {
            return Ok(None);
        };
        coupon.usage_history = coupons::usages(&self.pool, &coupon.id).await?;
        Ok(Some(coupon))
    }

    async fn active_admin_ids(&self) -> StoreResult<Vec<String>> {
        Ok(users::active_admin_ids(&self.pool).await?)
    }

    async fn count_cases(&self) -> StoreResult<i64> {
        Ok(cases::count(&self.pool).await?)
    }

    async fn insert_pending_order(&self, order: &PendingOrder) -> StoreResult<()> {
        Ok(pending_orders::create(&self.pool, order).await?)
    }

    async fn find_pending_order(&self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        Ok(pending_orders::find(&self.pool, order_id).await?)
    }

    async fn purge_expired_pending_orders(&self, now: i64) -> StoreResult<u64> {
        Ok(pending_orders::delete_expired(&self.pool, now).await?)
    }

    async fn query_payments(
        &self,
        query: &PaymentQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentView>> {
        Ok(payments::query(&self.pool, query, limit, offset).await?)
    }

    async fn summarize_payments(&self, query: &PaymentQuery) -> StoreResult<PaymentSummary> {
        Ok(payments::summarize(&self.pool, query).await?)
    }

    async fn notifications_for(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        Ok(notifications::list_for_recipient(&self.pool, recipient_id, limit).await?)
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

/// Open PostgreSQL transaction; rolled back by sqlx on drop
pub struct PgTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgTx {
    async fn take_pending_order(&mut self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        Ok(pending_orders::take(&mut *self.tx, order_id).await?)
    }

    async fn insert_case(&mut self, case: &Case) -> StoreResult<()> {
        Ok(cases::create(&mut *self.tx, case).await?)
    }

    async fn insert_payment(&mut self, payment: &Payment) -> StoreResult<()> {
        Ok(payments::create(&mut *self.tx, payment).await?)
    }

    async fn lock_coupon(&mut self, coupon_id: &str) -> StoreResult<Option<Coupon>> {
        let Some(mut coupon) = coupons::lock_by_id(&mut self.tx, coupon_id).await? else {
            return Ok(None);
        };
        coupon.usage_history = coupons::usages(&mut *self.tx, coupon_id).await?;
        Ok(Some(coupon))
    }

    async fn append_coupon_usage(&mut self, usage: &CouponUsage) -> StoreResult<bool> {
        Ok(coupons::append_usage(&mut self.tx, usage).await?)
    }

    async fn insert_notification(&mut self, notification: &Notification) -> StoreResult<()> {
        Ok(notifications::create(&mut *self.tx, notification).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
