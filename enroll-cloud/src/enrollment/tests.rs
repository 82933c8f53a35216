use std::time::Duration;

use async_trait::async_trait;
use shared::models::Notification;

use super::*;
use crate::db::{
    HistoryScope, MemoryStore, PaymentQuery, PaymentSummary, PaymentView, StoreError,
    StoreResult,
};
use crate::razorpay::payment_signature;
use crate::test_support::{coupon, service, user};

const SECRET: &str = "rzp_secret";

// ==================== Fixture ====================

/// Memory store with optional fault injection
#[derive(Clone)]
struct TestStore {
    inner: MemoryStore,
    fail_notifications: bool,
    /// Coupon lookups ignore recorded usage, as if read before a concurrent
    /// redemption committed
    stale_coupons: bool,
}

struct TestTx {
    inner: Box<dyn StoreTx>,
    fail_notifications: bool,
}

#[async_trait]
impl Store for TestStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.inner.find_user(id).await
    }
    async fn find_service(&self, id: &str) -> StoreResult<Option<Service>> {
        self.inner.find_service(id).await
    }
    async fn find_coupon_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        let found = self.inner.find_coupon_by_code(code).await?;
        Ok(found.map(|mut c| {
            if self.stale_coupons {
                c.current_uses = 0;
                c.usage_history.clear();
            }
            c
        }))
    }
    async fn active_admin_ids(&self) -> StoreResult<Vec<String>> {
        self.inner.active_admin_ids().await
    }
    async fn count_cases(&self) -> StoreResult<i64> {
        self.inner.count_cases().await
    }
    async fn insert_pending_order(&self, order: &PendingOrder) -> StoreResult<()> {
        self.inner.insert_pending_order(order).await
    }
    async fn find_pending_order(&self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        self.inner.find_pending_order(order_id).await
    }
    async fn purge_expired_pending_orders(&self, now: i64) -> StoreResult<u64> {
        self.inner.purge_expired_pending_orders(now).await
    }
    async fn query_payments(
        &self,
        query: &PaymentQuery,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<PaymentView>> {
        self.inner.query_payments(query, limit, offset).await
    }
    async fn summarize_payments(&self, query: &PaymentQuery) -> StoreResult<PaymentSummary> {
        self.inner.summarize_payments(query).await
    }
    async fn notifications_for(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> StoreResult<Vec<Notification>> {
        self.inner.notifications_for(recipient_id, limit).await
    }
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        Ok(Box::new(TestTx {
            inner: self.inner.begin().await?,
            fail_notifications: self.fail_notifications,
        }))
    }
}

#[async_trait]
impl StoreTx for TestTx {
    async fn take_pending_order(&mut self, order_id: &str) -> StoreResult<Option<PendingOrder>> {
        self.inner.take_pending_order(order_id).await
    }
    async fn insert_case(&mut self, case: &Case) -> StoreResult<()> {
        self.inner.insert_case(case).await
    }
    async fn insert_payment(&mut self, payment: &Payment) -> StoreResult<()> {
        self.inner.insert_payment(payment).await
    }
    async fn lock_coupon(&mut self, coupon_id: &str) -> StoreResult<Option<Coupon>> {
        self.inner.lock_coupon(coupon_id).await
    }
    async fn append_coupon_usage(&mut self, usage: &CouponUsage) -> StoreResult<bool> {
        self.inner.append_coupon_usage(usage).await
    }
    async fn insert_notification(&mut self, notification: &Notification) -> StoreResult<()> {
        if self.fail_notifications {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "notification insert failed".into(),
            )));
        }
        self.inner.insert_notification(notification).await
    }
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.inner.commit().await
    }
}

struct Fixture {
    store: MemoryStore,
    svc: EnrollmentService,
}

fn settings(allow_test_payments: bool) -> EnrollmentSettings {
    EnrollmentSettings {
        default_sla_hours: 24,
        pending_order_ttl_minutes: 30,
        allow_test_payments,
    }
}

fn gateway() -> Arc<RazorpayGateway> {
    Arc::new(
        RazorpayGateway::new(
            "rzp_test_key",
            SECRET,
            "http://127.0.0.1:9/v1",
            "INR",
            Duration::from_secs(1),
        )
        .unwrap(),
    )
}

async fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (id, role) in [
        ("admin1", Role::Admin),
        ("admin2", Role::Admin),
        ("emp1", Role::Employee),
        ("agent1", Role::Agent),
        ("u1", Role::User),
        ("u2", Role::User),
    ] {
        store.insert_user(user(id, role)).await;
    }
    store.insert_service(service("svc-5000", 5000)).await;
    store.insert_service(service("svc-1000", 1000)).await;
    let mut retired = service("svc-off", 100);
    retired.is_active = false;
    store.insert_service(retired).await;
    store
        .insert_coupon(coupon("cp-save20", "SAVE20", 20, None))
        .await;
    store.insert_coupon(coupon("cp-once", "ONCE", 10, Some(1))).await;
    store
}

async fn fixture() -> Fixture {
    fixture_with(false, false, true).await
}

async fn fixture_with(
    fail_notifications: bool,
    stale_coupons: bool,
    allow_test_payments: bool,
) -> Fixture {
    let store = seeded_store().await;
    let wrapped = TestStore {
        inner: store.clone(),
        fail_notifications,
        stale_coupons,
    };
    let svc = EnrollmentService::new(Arc::new(wrapped), gateway(), settings(allow_test_payments));
    Fixture { store, svc }
}

fn admin() -> Actor {
    Actor::new("admin1", Role::Admin)
}

fn request(
    target: Option<&str>,
    service_id: &str,
    method: PaymentMethod,
    coupon_code: Option<&str>,
) -> EnrollmentRequest {
    EnrollmentRequest {
        target_user_id: target.map(String::from),
        service_id: service_id.to_string(),
        payment_method: method,
        coupon_code: coupon_code.map(String::from),
        cash_details: None,
        test_mode: false,
    }
}

fn committed(outcome: EnrollmentOutcome) -> CommittedEnrollment {
    match outcome {
        EnrollmentOutcome::Committed(c) => c,
        EnrollmentOutcome::AwaitingPayment(q) => panic!("expected commit, got quote {q:?}"),
    }
}

fn quoted(outcome: EnrollmentOutcome) -> QuotedOrder {
    match outcome {
        EnrollmentOutcome::AwaitingPayment(q) => q,
        EnrollmentOutcome::Committed(c) => panic!("expected quote, got commit {c:?}"),
    }
}

fn code(err: ServiceError) -> ErrorCode {
    AppError::from(err).code
}

fn test_verification(order_id: &str) -> VerificationRequest {
    VerificationRequest {
        order_id: order_id.to_string(),
        payment_id: None,
        signature: None,
    }
}

async fn payments(store: &MemoryStore) -> Vec<PaymentView> {
    store
        .query_payments(&PaymentQuery::scoped(HistoryScope::All), i64::MAX, 0)
        .await
        .unwrap()
}

async fn notification_count(store: &MemoryStore, user_id: &str) -> usize {
    store.notifications_for(user_id, 100).await.unwrap().len()
}

/// Live-mode pending order as phase 1 would have stored it
fn live_order(order_id: &str, enroller: &Actor, target: &str, expires_at: i64) -> PendingOrder {
    let now = now_millis();
    PendingOrder {
        order_id: order_id.to_string(),
        target_user_id: target.to_string(),
        enroller_id: enroller.id.clone(),
        enroller_role: enroller.role,
        service_id: "svc-1000".to_string(),
        payment_method: PaymentMethod::Razorpay,
        test_mode: false,
        coupon_id: None,
        coupon_code: None,
        original_amount: Decimal::from(1000),
        discount_percentage: 0,
        discount_amount: Decimal::ZERO,
        final_amount: Decimal::from(1000),
        amount_minor: 100_000,
        currency: "INR".to_string(),
        created_at: now,
        expires_at,
    }
}

// ==================== Cash ====================

#[tokio::test]
async fn test_admin_cash_enrollment_commits_everything() {
    let f = fixture().await;
    let mut req = request(Some("u1"), "svc-5000", PaymentMethod::Cash, None);
    req.cash_details = Some(CashDetailsInput {
        receipt_number: Some("RCP-001".into()),
        notes: None,
    });

    let c = committed(f.svc.create_enrollment(&admin(), req).await.unwrap());

    assert_eq!(c.case.status, CaseStatus::New);
    assert_eq!(c.case.end_user_id, "u1");
    assert_eq!(c.case.enrolled_by, "admin1");
    assert_eq!(c.case.enrollment_type, EnrollmentType::Admin);
    assert!(c.case.case_id.starts_with("CASE-"));
    assert_eq!(c.case.deadline, c.case.enrolled_at + 48 * HOUR_MS);

    let p = &c.payment;
    assert_eq!(p.case_id, c.case.id);
    assert_eq!(p.amount, Decimal::from(5000));
    assert_eq!(p.original_amount, Decimal::from(5000));
    assert_eq!(p.discount_amount, Decimal::ZERO);
    assert_eq!(p.payment_method, PaymentMethod::Cash);
    assert_eq!(p.status, PaymentStatus::Completed);
    assert!(p.transaction_id.starts_with("CASH-"));
    assert!(p.invoice_number.starts_with("INV-"));
    let cash = p.cash_payment_details.as_ref().unwrap();
    assert_eq!(cash.receipt_number.as_deref(), Some("RCP-001"));
    assert_eq!(cash.notes, "Cash payment received");
    assert_eq!(cash.received_by, "admin1");
    assert_eq!(p.payment_metadata.enrolled_by, "admin1");
    assert_eq!(p.payment_metadata.enroller_role, Role::Admin);
    assert_eq!(c.service.id, "svc-5000");

    assert_eq!(f.store.count_cases().await.unwrap(), 1);
    assert_eq!(payments(&f.store).await.len(), 1);
    assert_eq!(notification_count(&f.store, "u1").await, 1);
    assert_eq!(notification_count(&f.store, "admin2").await, 0);
}

#[tokio::test]
async fn test_employee_cash_enrollment_notifies_admins() {
    let f = fixture().await;
    let emp = Actor::new("emp1", Role::Employee);
    let c = committed(
        f.svc
            .create_enrollment(&emp, request(Some("u1"), "svc-1000", PaymentMethod::Cash, None))
            .await
            .unwrap(),
    );
    assert_eq!(c.case.enrollment_type, EnrollmentType::Employee);
    assert_eq!(notification_count(&f.store, "u1").await, 1);
    assert_eq!(notification_count(&f.store, "admin1").await, 1);
    assert_eq!(notification_count(&f.store, "admin2").await, 1);
    assert_eq!(notification_count(&f.store, "emp1").await, 0);

    let admin_note = &f.store.notifications_for("admin1", 1).await.unwrap()[0];
    assert_eq!(admin_note.title, "New Cash Enrollment");
    assert_eq!(admin_note.related_case_id.as_deref(), Some(c.case.id.as_str()));
}

#[tokio::test]
async fn test_agent_cannot_take_cash() {
    let f = fixture().await;
    let agent = Actor::new("agent1", Role::Agent);
    let err = f
        .svc
        .create_enrollment(&agent, request(Some("u1"), "svc-1000", PaymentMethod::Cash, None))
        .await
        .unwrap_err();

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::CashNotPermitted);
    assert_eq!(app.http_status(), http::StatusCode::FORBIDDEN);
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
    assert!(payments(&f.store).await.is_empty());
}

#[tokio::test]
async fn test_cash_role_gate_runs_before_lookups() {
    let f = fixture().await;
    let err = f
        .svc
        .create_enrollment(
            &Actor::new("u1", Role::User),
            request(Some("ghost"), "no-such-service", PaymentMethod::Cash, None),
        )
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::CashNotPermitted);
}

#[tokio::test]
async fn test_cash_with_coupon_records_usage() {
    let f = fixture().await;
    let c = committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u1"), "svc-1000", PaymentMethod::Cash, Some("save20")),
            )
            .await
            .unwrap(),
    );
    assert_eq!(c.payment.amount, Decimal::from(800));
    assert_eq!(c.payment.discount_amount, Decimal::from(200));
    assert_eq!(c.payment.coupon_code.as_deref(), Some("SAVE20"));

    let cp = f.store.find_coupon_by_code("SAVE20").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 1);
    assert_eq!(cp.usage_history[0].case_id, c.case.id);
    assert_eq!(cp.usage_history[0].payment_id, c.payment.id);
    assert_eq!(cp.usage_history[0].user_id, "u1");
}

#[tokio::test]
async fn test_unknown_coupon_is_ignored() {
    let f = fixture().await;
    let c = committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u1"), "svc-1000", PaymentMethod::Cash, Some("BOGUS")),
            )
            .await
            .unwrap(),
    );
    assert_eq!(c.payment.amount, Decimal::from(1000));
    assert!(c.payment.coupon_code.is_none());
}

#[tokio::test]
async fn test_cash_commit_failure_rolls_back() {
    let f = fixture_with(true, false, true).await;
    let err = f
        .svc
        .create_enrollment(
            &admin(),
            request(Some("u1"), "svc-1000", PaymentMethod::Cash, Some("SAVE20")),
        )
        .await
        .unwrap_err();

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::InternalError);
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
    assert!(payments(&f.store).await.is_empty());
    let cp = f.store.find_coupon_by_code("SAVE20").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 0);
    assert!(cp.usage_history.is_empty());
}

#[tokio::test]
async fn test_cash_retries_at_full_price_when_coupon_runs_out() {
    let f = fixture_with(false, true, true).await;
    committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u1"), "svc-1000", PaymentMethod::Cash, Some("ONCE")),
            )
            .await
            .unwrap(),
    );

    // The stale read still sees ONCE as unused
    let c = committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u2"), "svc-1000", PaymentMethod::Cash, Some("ONCE")),
            )
            .await
            .unwrap(),
    );
    assert_eq!(c.payment.amount, Decimal::from(1000));
    assert_eq!(c.payment.discount_amount, Decimal::ZERO);
    assert!(c.payment.coupon_id.is_none());

    let cp = f.store.find_coupon_by_code("ONCE").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 1);
    assert_eq!(f.store.count_cases().await.unwrap(), 2);
    assert_eq!(notification_count(&f.store, "u2").await, 1);
}

// ==================== Gateway ====================

#[tokio::test]
async fn test_self_enrollment_with_coupon_via_test_payment() {
    let f = fixture().await;
    let u1 = Actor::new("u1", Role::User);

    let q = quoted(
        f.svc
            .create_enrollment(
                &u1,
                request(None, "svc-1000", PaymentMethod::TestPayment, Some("SAVE20")),
            )
            .await
            .unwrap(),
    );
    assert!(q.requires_payment_verification);
    assert!(q.order.id.starts_with("order_test_"));
    assert_eq!(q.order.amount, 80_000);
    assert_eq!(q.discount.discount_amount, Decimal::from(200));
    assert_eq!(q.discount.final_amount, Decimal::from(800));
    assert_eq!(q.coupon.as_ref().map(|c| c.code.as_str()), Some("SAVE20"));
    assert_eq!(q.end_user_id, "u1");
    assert_eq!(q.enroller_id, "u1");
    assert_eq!(q.enroller_role, Role::User);
    // A quote creates nothing
    assert_eq!(f.store.count_cases().await.unwrap(), 0);

    let c = f
        .svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap();
    assert_eq!(c.payment.amount, Decimal::from(800));
    assert_eq!(c.payment.discount_amount, Decimal::from(200));
    assert_eq!(c.payment.coupon_code.as_deref(), Some("SAVE20"));
    assert_eq!(c.payment.payment_method, PaymentMethod::TestPayment);
    assert_eq!(c.payment.gateway_order_id.as_deref(), Some(q.order.id.as_str()));
    assert_eq!(c.payment.payment_metadata.payment_initiated_from, "self_service");
    assert_eq!(c.case.enrollment_type, EnrollmentType::SelfEnrolled);

    let cp = f.store.find_coupon_by_code("SAVE20").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 1);
    assert_eq!(cp.usage_history.len(), 1);
    assert_eq!(cp.usage_history[0].case_id, c.case.id);

    assert_eq!(notification_count(&f.store, "u1").await, 1);
    assert_eq!(notification_count(&f.store, "admin1").await, 1);
    assert_eq!(notification_count(&f.store, "admin2").await, 1);
}

#[tokio::test]
async fn test_reused_coupon_silently_charges_full_price() {
    let f = fixture().await;
    let u1 = Actor::new("u1", Role::User);
    for expected_discount in [200, 0] {
        let q = quoted(
            f.svc
                .create_enrollment(
                    &u1,
                    request(None, "svc-1000", PaymentMethod::TestPayment, Some("SAVE20")),
                )
                .await
                .unwrap(),
        );
        let c = f
            .svc
            .complete_verified_enrollment(&u1, test_verification(&q.order.id))
            .await
            .unwrap();
        assert_eq!(c.payment.discount_amount, Decimal::from(expected_discount));
    }

    let all = payments(&f.store).await;
    assert_eq!(all.len(), 2);
    let second = all.iter().find(|p| p.payment.coupon_code.is_none()).unwrap();
    assert_eq!(second.payment.amount, Decimal::from(1000));

    let cp = f.store.find_coupon_by_code("SAVE20").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 1);
}

#[tokio::test]
async fn test_tampered_signature_rejected_without_records() {
    let f = fixture().await;
    let emp = Actor::new("emp1", Role::Employee);
    let order = live_order("order_live_1", &emp, "u1", now_millis() + HOUR_MS);
    f.store.insert_pending_order(&order).await.unwrap();

    let mut signature = payment_signature(SECRET, "order_live_1", "pay_live_1");
    let flipped = if signature.starts_with('0') { "1" } else { "0" };
    signature.replace_range(0..1, flipped);
    let err = f
        .svc
        .complete_verified_enrollment(
            &emp,
            VerificationRequest {
                order_id: "order_live_1".into(),
                payment_id: Some("pay_live_1".into()),
                signature: Some(signature),
            },
        )
        .await
        .unwrap_err();

    let app: AppError = err.into();
    assert_eq!(app.code, ErrorCode::InvalidPayment);
    assert_eq!(app.message, "Invalid payment");
    assert_eq!(app.http_status(), http::StatusCode::BAD_REQUEST);
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
    assert!(payments(&f.store).await.is_empty());

    // The quote survives a failed verification
    let c = f
        .svc
        .complete_verified_enrollment(
            &emp,
            VerificationRequest {
                order_id: "order_live_1".into(),
                payment_id: Some("pay_live_1".into()),
                signature: Some(payment_signature(SECRET, "order_live_1", "pay_live_1")),
            },
        )
        .await
        .unwrap();
    assert_eq!(c.payment.transaction_id, "pay_live_1");
    assert_eq!(c.payment.payment_method, PaymentMethod::Razorpay);
    assert_eq!(c.case.enrollment_type, EnrollmentType::Employee);
}

#[tokio::test]
async fn test_second_verification_is_rejected() {
    let f = fixture().await;
    let u1 = Actor::new("u1", Role::User);
    let q = quoted(
        f.svc
            .create_enrollment(&u1, request(None, "svc-1000", PaymentMethod::TestPayment, None))
            .await
            .unwrap(),
    );
    f.svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap();
    let err = f
        .svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap_err();

    assert_eq!(code(err), ErrorCode::PaymentOrderNotFound);
    assert_eq!(f.store.count_cases().await.unwrap(), 1);
    assert_eq!(payments(&f.store).await.len(), 1);
}

#[tokio::test]
async fn test_verification_by_other_actor_rejected() {
    let f = fixture().await;
    let q = quoted(
        f.svc
            .create_enrollment(
                &Actor::new("u1", Role::User),
                request(None, "svc-1000", PaymentMethod::TestPayment, None),
            )
            .await
            .unwrap(),
    );
    let err = f
        .svc
        .complete_verified_enrollment(&Actor::new("u2", Role::User), test_verification(&q.order.id))
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::OrderOwnerMismatch);
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_order_rejected() {
    let f = fixture().await;
    let emp = Actor::new("emp1", Role::Employee);
    let order = live_order("order_old", &emp, "u1", now_millis() - MINUTE_MS);
    f.store.insert_pending_order(&order).await.unwrap();

    let err = f
        .svc
        .complete_verified_enrollment(
            &emp,
            VerificationRequest {
                order_id: "order_old".into(),
                payment_id: Some("pay_1".into()),
                signature: Some(payment_signature(SECRET, "order_old", "pay_1")),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::PaymentOrderExpired);

    let purged = f
        .store
        .purge_expired_pending_orders(now_millis())
        .await
        .unwrap();
    assert_eq!(purged, 1);
}

#[tokio::test]
async fn test_gateway_commit_failure_keeps_quote() {
    let f = fixture_with(true, false, true).await;
    let u1 = Actor::new("u1", Role::User);
    let q = quoted(
        f.svc
            .create_enrollment(&u1, request(None, "svc-1000", PaymentMethod::TestPayment, None))
            .await
            .unwrap(),
    );
    let err = f
        .svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap_err();

    assert_eq!(code(err), ErrorCode::InternalError);
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
    assert!(f.store.find_pending_order(&q.order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_paid_quote_records_usage_past_limit() {
    let f = fixture().await;
    let u1 = Actor::new("u1", Role::User);
    let q = quoted(
        f.svc
            .create_enrollment(&u1, request(None, "svc-1000", PaymentMethod::TestPayment, Some("ONCE")))
            .await
            .unwrap(),
    );
    assert_eq!(q.discount.discount_amount, Decimal::from(100));

    // Another redemption takes the only use before u1 pays
    committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u2"), "svc-1000", PaymentMethod::Cash, Some("ONCE")),
            )
            .await
            .unwrap(),
    );

    let c = f
        .svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap();
    assert_eq!(c.payment.amount, Decimal::from(900));
    let cp = f.store.find_coupon_by_code("ONCE").await.unwrap().unwrap();
    assert_eq!(cp.current_uses, 2);
    assert_eq!(cp.usage_history.len(), 2);
}

#[tokio::test]
async fn test_paid_quote_survives_deleted_coupon() {
    let f = fixture().await;
    let emp = Actor::new("emp1", Role::Employee);
    let mut order = live_order("order_gone", &emp, "u1", now_millis() + HOUR_MS);
    order.coupon_id = Some("cp-deleted".into());
    order.coupon_code = Some("GONE".into());
    order.discount_percentage = 20;
    order.discount_amount = Decimal::from(200);
    order.final_amount = Decimal::from(800);
    order.amount_minor = 80_000;
    f.store.insert_pending_order(&order).await.unwrap();

    let c = f
        .svc
        .complete_verified_enrollment(
            &emp,
            VerificationRequest {
                order_id: "order_gone".into(),
                payment_id: Some("pay_gone".into()),
                signature: Some(payment_signature(SECRET, "order_gone", "pay_gone")),
            },
        )
        .await
        .unwrap();
    assert_eq!(c.payment.amount, Decimal::from(800));
    assert_eq!(payments(&f.store).await.len(), 1);
    assert!(f.store.find_pending_order("order_gone").await.unwrap().is_none());
}

#[tokio::test]
async fn test_test_payments_can_be_disabled() {
    let f = fixture_with(false, false, false).await;
    let u1 = Actor::new("u1", Role::User);
    let err = f
        .svc
        .create_enrollment(&u1, request(None, "svc-1000", PaymentMethod::TestPayment, None))
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::TestPaymentsDisabled);

    let mut req = request(None, "svc-1000", PaymentMethod::Razorpay, None);
    req.test_mode = true;
    let err = f.svc.create_enrollment(&u1, req).await.unwrap_err();
    assert_eq!(code(err), ErrorCode::TestPaymentsDisabled);

    let methods = f.svc.payment_methods(&u1);
    assert!(methods.iter().all(|m| m.id != PaymentMethod::TestPayment));
}

#[tokio::test]
async fn test_razorpay_with_test_mode_flag_is_test_payment() {
    let f = fixture().await;
    let u1 = Actor::new("u1", Role::User);
    let mut req = request(None, "svc-1000", PaymentMethod::Razorpay, None);
    req.test_mode = true;
    let q = quoted(f.svc.create_enrollment(&u1, req).await.unwrap());
    assert!(q.test_mode);

    let c = f
        .svc
        .complete_verified_enrollment(&u1, test_verification(&q.order.id))
        .await
        .unwrap();
    assert_eq!(c.payment.payment_method, PaymentMethod::TestPayment);
    assert!(c.payment.transaction_id.starts_with("pay_test_"));
}

// ==================== Preconditions ====================

#[tokio::test]
async fn test_precondition_failures() {
    let f = fixture().await;
    let cases = [
        (
            request(Some("ghost"), "svc-1000", PaymentMethod::Cash, None),
            ErrorCode::UserNotFound,
        ),
        (
            request(Some("u1"), "nope", PaymentMethod::Cash, None),
            ErrorCode::ServiceNotFound,
        ),
        (
            request(Some("u1"), "svc-off", PaymentMethod::Cash, None),
            ErrorCode::ServiceInactive,
        ),
        (
            request(Some("u1"), "svc-1000", PaymentMethod::Upi, None),
            ErrorCode::PaymentInvalidMethod,
        ),
    ];
    for (req, expected) in cases {
        let err = f.svc.create_enrollment(&admin(), req).await.unwrap_err();
        assert_eq!(code(err), expected);
    }
    assert_eq!(f.store.count_cases().await.unwrap(), 0);
}

#[tokio::test]
async fn test_user_cannot_enroll_someone_else() {
    let f = fixture().await;
    let err = f
        .svc
        .create_enrollment(
            &Actor::new("u1", Role::User),
            request(Some("u2"), "svc-1000", PaymentMethod::TestPayment, None),
        )
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_inactive_target_rejected() {
    let f = fixture().await;
    let mut gone = user("u3", Role::User);
    gone.is_active = false;
    f.store.insert_user(gone).await;
    let err = f
        .svc
        .create_enrollment(&admin(), request(Some("u3"), "svc-1000", PaymentMethod::Cash, None))
        .await
        .unwrap_err();
    assert_eq!(code(err), ErrorCode::UserInactive);
}

// ==================== Preview & methods ====================

#[tokio::test]
async fn test_preview_reports_exhausted_coupon() {
    let f = fixture().await;
    committed(
        f.svc
            .create_enrollment(
                &admin(),
                request(Some("u1"), "svc-1000", PaymentMethod::Cash, Some("ONCE")),
            )
            .await
            .unwrap(),
    );

    let preview = f
        .svc
        .preview_discount(&Actor::new("u2", Role::User), "svc-1000", "once", None)
        .await
        .unwrap();
    assert!(!preview.valid);
    assert_eq!(preview.reason.as_deref(), Some("Coupon usage limit reached"));
    assert_eq!(preview.discount.final_amount, Decimal::from(1000));
}

#[tokio::test]
async fn test_preview_valid_coupon() {
    let f = fixture().await;
    let preview = f
        .svc
        .preview_discount(&Actor::new("u1", Role::User), "svc-1000", "SAVE20", None)
        .await
        .unwrap();
    assert!(preview.valid);
    assert!(preview.reason.is_none());
    assert_eq!(preview.discount.discount_amount, Decimal::from(200));
    let summary = preview.coupon.unwrap();
    assert_eq!(summary.code, "SAVE20");
    assert_eq!(summary.remaining_uses, None);

    let preview = f
        .svc
        .preview_discount(&admin(), "svc-1000", "ONCE", Some("u2".into()))
        .await
        .unwrap();
    assert_eq!(preview.coupon.unwrap().remaining_uses, Some(1));
}

#[tokio::test]
async fn test_preview_unknown_coupon() {
    let f = fixture().await;
    let preview = f
        .svc
        .preview_discount(&admin(), "svc-1000", "NOPE", None)
        .await
        .unwrap();
    assert!(!preview.valid);
    assert_eq!(preview.reason.as_deref(), Some("Coupon not found"));
}

#[tokio::test]
async fn test_payment_methods_by_role() {
    let f = fixture().await;
    let ids = |actor: Actor| -> Vec<PaymentMethod> {
        f.svc.payment_methods(&actor).into_iter().map(|m| m.id).collect()
    };
    assert!(ids(admin()).contains(&PaymentMethod::Cash));
    assert!(ids(Actor::new("emp1", Role::Employee)).contains(&PaymentMethod::Cash));
    assert!(!ids(Actor::new("agent1", Role::Agent)).contains(&PaymentMethod::Cash));
    assert!(!ids(Actor::new("u1", Role::User)).contains(&PaymentMethod::Cash));
    assert!(ids(Actor::new("u1", Role::User)).contains(&PaymentMethod::Razorpay));
}
