//! In-memory store for development and tests
//!
//! A transaction takes the table lock for its whole lifetime and works on a
//! copy of the tables; commit swaps the copy in, drop discards it. That gives
//! the same all-or-nothing behaviour as the PostgreSQL store, with
//! transactions fully serialized.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::{
    Case, Coupon, CouponUsage, Notification, Payment, PendingOrder, Role, Service, User,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{
    HistoryScope, PaymentQuery, PaymentSummary, PaymentView, Store, StoreError, StoreResult,
    StoreTx,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: HashMap<String, User>,
    services: HashMap<String, Service>,
    /// Keyed by coupon id; usage history kept inline
    coupons: HashMap<String, Coupon>,
    cases: Vec<Case>,
    payments: Vec<Payment>,
    notifications: Vec<Notification>,
    pending_orders: HashMap<String, PendingOrder>,
}

/// Seed data loaded at startup (catalog maintenance lives elsewhere)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedData {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub coupons: Vec<Coupon>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, data: SeedData) {
        let mut t = self.tables.lock().await;
        for user in data.users {
            t.users.insert(user.id.clone(), user);
        }
        for service in data.services {
            t.services.insert(service.id.clone(), service);
        }
        for mut coupon in data.coupons {
            coupon.code = Coupon::normalize_code(&coupon.code);
            coupon.current_uses = coupon.usage_history.len() as i32;
            t.coupons.insert(coupon.id.clone(), coupon);
        }
    }

    pub async fn insert_user(&self, user: User) {
        self.tables.lock().await.users.insert(user.id.clone(), user);
    }

    pub async fn insert_service(&self, service: Service) {
        self.tables
            .lock()
            .await
            .services
            .insert(service.id.clone(), service);
    }

    pub async fn insert_coupon(&self, coupon: Coupon) {
        self.seed(SeedData {
            coupons: vec![coupon],
            ..Default::default()
        })
        .await;
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn view(t: &Tables, p: &Payment) -> Option<(PaymentView, Option<String>, String)> {
    let case = t.cases.iter().find(|c| c.id == p.case_id)?;
    let user = t.users.get(&p.user_id)?;
    let service = t.services.get(&p.service_id)?;
    Some((
        PaymentView {
            payment: p.clone(),
            case_number: case.case_id.clone(),
            user_name: user.name.clone(),
            user_email: user.email.clone(),
            service_name: service.name.clone(),
        },
        case.employee_id.clone(),
        case.enrolled_by.clone(),
    ))
}

fn in_scope(
    scope: &HistoryScope,
    t: &Tables,
    v: &PaymentView,
    employee_id: Option<&str>,
    enrolled_by: &str,
) -> bool {
    match scope {
        HistoryScope::All => true,
        HistoryScope::AssignedOrEnrolled(id) => {
            employee_id == Some(id.as_str()) || enrolled_by == id
        }
        HistoryScope::AgentNetwork(id) => {
            let onboarded = t
                .users
                .get(&v.payment.user_id)
                .and_then(|u| u.agent_id.as_deref())
                == Some(id.as_str());
            onboarded || enrolled_by == id
        }
        HistoryScope::EnrolledBy(id) => enrolled_by == id,
        HistoryScope::Own(id) => v.payment.user_id == *id,
    }
}

fn matches_search(v: &PaymentView, needle: &str) -> bool {
    let p = &v.payment;
    contains_ci(&p.transaction_id, needle)
        || contains_ci(&p.invoice_number, needle)
        || p.coupon_code.as_deref().is_some_and(|c| contains_ci(c, needle))
        || contains_ci(&v.case_number, needle)
        || contains_ci(&v.user_name, needle)
        || contains_ci(&v.user_email, needle)
        || contains_ci(&v.service_name, needle)
}

/// Scoped, filtered payments, newest first
fn matching(t: &Tables, query: &PaymentQuery) -> Vec<PaymentView> {
    let needle = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut rows: Vec<PaymentView> = t
        .payments
        .iter()
        .filter_map(|p| view(t, p))
        .filter(|(v, employee_id, enrolled_by)| {
            in_scope(&query.scope, t, v, employee_id.as_deref(), enrolled_by)
        })
        .map(|(v, _, _)| v)
        .filter(|v| needle.as_deref().is_none_or(|n| matches_search(v, n)))
        .filter(|v| query.status.is_none_or(|s| v.payment.status == s))
        .filter(|v| query.method.is_none_or(|m| v.payment.payment_method == m))
        .filter(|v| query.from.is_none_or(|from| v.payment.paid_at >= from))
        .filter(|v| query.to.is_none_or(|to| v.payment.paid_at <= to))
        .collect();
    rows.sort_by(|a, b| {
        b.payment
            .paid_at
            .cmp(&a.payment.paid_at)
            .then_with(|| b.payment.id.cmp(&a.payment.id))
    });
    rows
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(id).cloned())
    }

    async fn find_service(&self, id: &str) -> StoreResult<Option<Service>> {
        Ok(self.tables.lock().await.services.get(id).cloned())
    }

    async fn find_coupon_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let t = self.tables.lock().await;
        Ok(t.coupons.values().find(|c| c.code == code).cloned())
    }

    async fn active_admin_ids(&self) -> StoreResult<Vec<String>> {
        let t = self.tables.lock().await;
        let mut ids: Vec<String> = t
            .users
            .values()
            .filter(|u| u.role == Role::Admin && u.is_active)
            .map(|u| u.id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn count_cases(&self) -> StoreResult<i64> {
        Ok(self.tables.lock().await.cases.len() as i64)
    }

    async fn insert_pending_order(&self, order: &PendingOrder) -> StoreResult<()> {
        let mut t = self.tables.lock().await;
        if t.pending_orders.contains_key(&order.order_id) {
            return Err(StoreError::Duplicate("pending_orders_pkey".into()));
        }
        t.pending_orders
            .insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn find_pending_order(&self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        Ok(self.tables.lock().await.pending_orders.get(order_id).cloned())
    }

    async fn purge_expired_pending_orders(&self, now: i64) -> StoreResult<u64> {
        let mut t = self.tables.lock().await;
        let before = t.pending_orders.len();
        t.pending_orders.retain(|_, o| o.expires_at >= now);
        Ok((before - t.pending_orders.len()) as u64)
    }

    async fn query_payments(
        &self,
        query: &PaymentQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentView>> {
        let t = self.tables.lock().await;
        Ok(matching(&t, query)
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn summarize_payments(&self, query: &PaymentQuery) -> StoreResult<PaymentSummary> {
        let t = self.tables.lock().await;
        let mut summary = PaymentSummary::default();
        for row in matching(&t, query) {
            let p = &row.payment;
            summary.count += 1;
            summary.total_amount += p.amount;
            summary.total_original_amount += p.original_amount;
            summary.total_discount += p.discount_amount;
            if p.discount_amount > Decimal::ZERO {
                summary.discounted_count += 1;
            }
            for bucket in [
                summary
                    .by_method
                    .entry(p.payment_method.as_str().to_string())
                    .or_default(),
                summary.by_status.entry(p.status.as_str().to_string()).or_default(),
            ] {
                bucket.count += 1;
                bucket.amount += p.amount;
            }
        }
        Ok(summary)
    }

    async fn notifications_for(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        let t = self.tables.lock().await;
        let mut list: Vec<Notification> = t
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list.truncate(limit.max(0) as usize);
        Ok(list)
    }

    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.tables.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTx { guard, work }))
    }
}

pub struct MemoryTx {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn take_pending_order(&mut self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        Ok(self.work.pending_orders.remove(order_id))
    }

    async fn insert_case(&mut self, case: &Case) -> StoreResult<()> {
        if self
            .work
            .cases
            .iter()
            .any(|c| c.id == case.id || c.case_id == case.case_id)
        {
            return Err(StoreError::Duplicate("cases_case_id_key".into()));
        }
        self.work.cases.push(case.clone());
        Ok(())
    }

    async fn insert_payment(&mut self, payment: &Payment) -> StoreResult<()> {
        if self.work.payments.iter().any(|p| {
            p.id == payment.id
                || p.transaction_id == payment.transaction_id
                || p.invoice_number == payment.invoice_number
        }) {
            return Err(StoreError::Duplicate("payments_transaction_id_key".into()));
        }
        self.work.payments.push(payment.clone());
        Ok(())
    }

    async fn lock_coupon(&mut self, coupon_id: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.work.coupons.get(coupon_id).cloned())
    }

    async fn append_coupon_usage(&mut self, usage: &CouponUsage) -> StoreResult<bool> {
        let case_taken = self
            .work
            .coupons
            .values()
            .flat_map(|c| c.usage_history.iter())
            .any(|u| u.case_id == usage.case_id);
        if case_taken {
            return Ok(false);
        }
        let Some(coupon) = self.work.coupons.get_mut(&usage.coupon_id) else {
            return Ok(false);
        };
        coupon.usage_history.push(usage.clone());
        coupon.current_uses += 1;
        Ok(true)
    }

    async fn insert_notification(&mut self, notification: &Notification) -> StoreResult<()> {
        self.work.notifications.push(notification.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{case, coupon, usage, user};

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_case(&case("c1", "CASE-1")).await.unwrap();
        }
        assert_eq!(store.count_cases().await.unwrap(), 0);

        let mut tx = store.begin().await.unwrap();
        tx.insert_case(&case("c1", "CASE-1")).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(store.count_cases().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_case_id_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_case(&case("c1", "CASE-1")).await.unwrap();
        let err = tx.insert_case(&case("c2", "CASE-1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_usage_appended_once_per_case() {
        let store = MemoryStore::new();
        store.insert_coupon(coupon("cp1", "save20", 20, None)).await;

        let mut tx = store.begin().await.unwrap();
        assert!(tx.append_coupon_usage(&usage("cp1", "u1", "c1")).await.unwrap());
        assert!(!tx.append_coupon_usage(&usage("cp1", "u1", "c1")).await.unwrap());
        tx.commit().await.unwrap();

        let c = store.find_coupon_by_code("SAVE20").await.unwrap().unwrap();
        assert_eq!(c.current_uses, 1);
        assert_eq!(c.usage_history.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_ids_skip_inactive() {
        let store = MemoryStore::new();
        store.insert_user(user("a1", Role::Admin)).await;
        let mut retired = user("a2", Role::Admin);
        retired.is_active = false;
        store.insert_user(retired).await;
        store.insert_user(user("e1", Role::Employee)).await;

        assert_eq!(store.active_admin_ids().await.unwrap(), vec!["a1".to_string()]);
    }
}
