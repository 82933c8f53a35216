//! Enrollment orchestrator
//!
//! Turns "actor X enrolls user Y in service Z, paying via channel C" into a
//! case, its payment, the coupon redemption and the notifications, written
//! as one unit of work.
//!
//! # Channels
//!
//! - **cash**: validated and committed in a single call.
//! - **razorpay / test_payment**: phase 1 quotes the price, creates a gateway
//!   order and stores a [`PendingOrder`]; phase 2 verifies the gateway
//!   signature and commits using only what phase 1 stored.
//!
//! Both channels commit through [`EnrollmentService::commit_enrollment`]
//! inside one store transaction, so no case exists without its payment.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Case, CaseStatus, CashPaymentDetails, Coupon, CouponUsage, DiscountQuote, EnrollmentType,
    NotificationKind, Payment, PaymentMetadata, PaymentMethod, PaymentStatus, PendingOrder, Role,
    Service, User,
};
use shared::util::{HOUR_MS, MINUTE_MS, now_millis};

use crate::auth::Actor;
use crate::coupon::{self, AppliedCoupon, CouponRejection, UsageOutcome};
use crate::db::{Store, StoreTx};
use crate::error::{ServiceError, ServiceResult};
use crate::ids;
use crate::notify::{self, NotificationDraft};
use crate::razorpay::{GatewayOrder, PaymentProof, RazorpayGateway};

const DEFAULT_CASH_NOTE: &str = "Cash payment received";

/// Tunables taken from [`crate::config::Config`]
#[derive(Debug, Clone)]
pub struct EnrollmentSettings {
    pub default_sla_hours: i64,
    pub pending_order_ttl_minutes: i64,
    pub allow_test_payments: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CashDetailsInput {
    pub receipt_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    /// Defaults to the actor (self-enrollment)
    pub target_user_id: Option<String>,
    pub service_id: String,
    pub payment_method: PaymentMethod,
    pub coupon_code: Option<String>,
    pub cash_details: Option<CashDetailsInput>,
    pub test_mode: bool,
}

/// Phase-2 input, as returned by the checkout widget
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommittedEnrollment {
    pub case: Case,
    pub payment: Payment,
    pub service: Service,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponRef {
    pub id: String,
    pub code: String,
    pub discount_percentage: i32,
}

impl From<&Coupon> for CouponRef {
    fn from(c: &Coupon) -> Self {
        Self {
            id: c.id.clone(),
            code: c.code.clone(),
            discount_percentage: c.discount_percentage,
        }
    }
}

/// Phase-1 result: a quote, not a commitment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedOrder {
    pub requires_payment_verification: bool,
    pub order: GatewayOrder,
    pub service: Service,
    pub discount: DiscountQuote,
    pub coupon: Option<CouponRef>,
    pub end_user_id: String,
    pub enroller_id: String,
    pub enroller_role: Role,
    pub test_mode: bool,
    pub expires_at: i64,
}

#[derive(Debug, Clone)]
pub enum EnrollmentOutcome {
    Committed(CommittedEnrollment),
    AwaitingPayment(QuotedOrder),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponSummary {
    pub code: String,
    pub description: Option<String>,
    pub discount_percentage: i32,
    pub valid_to: i64,
    /// `None` when unlimited
    pub remaining_uses: Option<i32>,
}

/// Price preview with the coupon's outcome surfaced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountPreview {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub coupon: Option<CouponSummary>,
    pub discount: DiscountQuote,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodOption {
    pub id: PaymentMethod,
    pub name: &'static str,
    pub description: &'static str,
}

/// Everything the commit needs, resolved ahead of the transaction
struct CommitPlan<'a> {
    enroller: &'a Actor,
    target: &'a User,
    service: &'a Service,
    method: PaymentMethod,
    quote: DiscountQuote,
    coupon: Option<CouponRef>,
    transaction_id: String,
    gateway_order_id: Option<String>,
    cash_details: Option<CashPaymentDetails>,
    /// Consumed inside the transaction; gateway channels only
    pending_order_id: Option<String>,
    /// Re-check coupon limits under the row lock (cash); a paid gateway
    /// quote records its usage regardless
    enforce_coupon_limits: bool,
}

enum CommitOutcome {
    Committed(CommittedEnrollment),
    CouponExhausted(CouponRejection),
}

#[derive(Clone)]
pub struct EnrollmentService {
    store: Arc<dyn Store>,
    gateway: Arc<RazorpayGateway>,
    settings: EnrollmentSettings,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn format_amount(amount: Decimal) -> String {
    amount.normalize().to_string()
}

impl EnrollmentService {
    pub fn new(
        store: Arc<dyn Store>,
        gateway: Arc<RazorpayGateway>,
        settings: EnrollmentSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            settings,
        }
    }

    // ==================== Public operations ====================

    /// Validate and either commit (cash) or quote (gateway channels)
    pub async fn create_enrollment(
        &self,
        actor: &Actor,
        req: EnrollmentRequest,
    ) -> ServiceResult<EnrollmentOutcome> {
        if !req.payment_method.is_enrollment_channel() {
            return Err(AppError::new(ErrorCode::PaymentInvalidMethod)
                .with_detail("paymentMethod", req.payment_method.as_str())
                .into());
        }

        let policy = actor.policy();
        if req.payment_method == PaymentMethod::Cash && !policy.accepts_cash {
            tracing::warn!(
                enroller_id = %actor.id,
                role = %actor.role,
                "Cash enrollment rejected for role"
            );
            return Err(AppError::new(ErrorCode::CashNotPermitted)
                .with_detail("role", actor.role.as_str())
                .into());
        }

        let test_mode = req.payment_method == PaymentMethod::TestPayment
            || (req.test_mode && req.payment_method.is_gateway());
        if test_mode && !self.settings.allow_test_payments {
            return Err(AppError::new(ErrorCode::TestPaymentsDisabled).into());
        }

        let target_id = non_empty(req.target_user_id).unwrap_or_else(|| actor.id.clone());
        if target_id != actor.id && !policy.enrolls_others {
            return Err(AppError::forbidden("Not allowed to enroll other users").into());
        }

        let target = self.load_user(&target_id).await?;
        if !target.is_active {
            return Err(AppError::new(ErrorCode::UserInactive).into());
        }
        let service = self.load_active_service(&req.service_id).await?;

        let now = now_millis();
        let applied = self
            .resolve_coupon_silently(req.coupon_code.as_deref(), &target.id, &service, now)
            .await?;

        if req.payment_method == PaymentMethod::Cash {
            let committed = self
                .commit_cash(
                    actor,
                    &target,
                    &service,
                    applied,
                    req.cash_details.unwrap_or_default(),
                )
                .await?;
            return Ok(EnrollmentOutcome::Committed(committed));
        }

        let quoted = self
            .quote_gateway_order(actor, &target, service, applied, test_mode, now)
            .await?;
        Ok(EnrollmentOutcome::AwaitingPayment(quoted))
    }

    /// Phase 2: verify the gateway payment and commit the quoted enrollment
    pub async fn complete_verified_enrollment(
        &self,
        actor: &Actor,
        req: VerificationRequest,
    ) -> ServiceResult<CommittedEnrollment> {
        let Some(order) = self.store.find_pending_order(&req.order_id).await? else {
            return Err(AppError::new(ErrorCode::PaymentOrderNotFound).into());
        };
        if order.enroller_id != actor.id {
            tracing::warn!(
                order_id = %order.order_id,
                caller = %actor.id,
                "Pending order completed by another user"
            );
            return Err(AppError::new(ErrorCode::OrderOwnerMismatch).into());
        }
        let now = now_millis();
        if order.is_expired(now) {
            return Err(AppError::new(ErrorCode::PaymentOrderExpired).into());
        }
        if order.test_mode && !self.settings.allow_test_payments {
            return Err(AppError::new(ErrorCode::TestPaymentsDisabled).into());
        }

        let service = self.load_active_service(&order.service_id).await?;

        let payment_id = match non_empty(req.payment_id) {
            Some(id) => id,
            None if order.test_mode => ids::test_payment_id(now),
            None => return Err(AppError::new(ErrorCode::InvalidPayment).into()),
        };
        let proof = PaymentProof {
            order_id: order.order_id.clone(),
            payment_id,
            signature: req.signature.unwrap_or_default(),
        };
        if !self.gateway.verify_payment(&proof, order.test_mode) {
            tracing::warn!(order_id = %order.order_id, "Payment signature verification failed");
            return Err(AppError::new(ErrorCode::InvalidPayment).into());
        }

        let target = self.load_user(&order.target_user_id).await?;
        let enroller = Actor::new(order.enroller_id.clone(), order.enroller_role);
        let plan = CommitPlan {
            enroller: &enroller,
            target: &target,
            service: &service,
            method: order.payment_method,
            quote: order.quote(),
            coupon: pending_coupon(&order),
            transaction_id: proof.payment_id,
            gateway_order_id: Some(order.order_id.clone()),
            cash_details: None,
            pending_order_id: Some(order.order_id.clone()),
            enforce_coupon_limits: false,
        };

        match self.commit_enrollment(&plan).await? {
            CommitOutcome::Committed(committed) => Ok(committed),
            CommitOutcome::CouponExhausted(_) => {
                Err(AppError::internal("coupon rejected on an unenforced commit").into())
            }
        }
    }

    /// Price a service with a coupon, surfacing every coupon failure
    pub async fn preview_discount(
        &self,
        actor: &Actor,
        service_id: &str,
        coupon_code: &str,
        target_user_id: Option<String>,
    ) -> ServiceResult<DiscountPreview> {
        let target_id = non_empty(target_user_id).unwrap_or_else(|| actor.id.clone());
        if target_id != actor.id {
            if !actor.policy().enrolls_others {
                return Err(AppError::forbidden("Not allowed to preview for other users").into());
            }
            self.load_user(&target_id).await?;
        }
        let service = self.load_active_service(service_id).await?;

        let now = now_millis();
        match coupon::resolve(self.store.as_ref(), coupon_code, &target_id, service.price, now)
            .await?
        {
            Ok(AppliedCoupon { coupon, quote }) => Ok(DiscountPreview {
                valid: true,
                reason: None,
                coupon: Some(CouponSummary {
                    remaining_uses: coupon.remaining_uses(),
                    code: coupon.code,
                    description: coupon.description,
                    discount_percentage: coupon.discount_percentage,
                    valid_to: coupon.valid_to,
                }),
                discount: quote,
            }),
            Err(rejection) => Ok(DiscountPreview {
                valid: false,
                reason: Some(rejection.reason().to_string()),
                coupon: None,
                discount: DiscountQuote::full_price(service.price),
            }),
        }
    }

    /// Channels available to `actor`
    pub fn payment_methods(&self, actor: &Actor) -> Vec<PaymentMethodOption> {
        let mut methods = vec![PaymentMethodOption {
            id: PaymentMethod::Razorpay,
            name: "Online Payment",
            description: "Pay with card, UPI or net banking via Razorpay",
        }];
        if actor.policy().accepts_cash {
            methods.push(PaymentMethodOption {
                id: PaymentMethod::Cash,
                name: "Cash",
                description: "Record a cash payment received in person",
            });
        }
        if self.settings.allow_test_payments {
            methods.push(PaymentMethodOption {
                id: PaymentMethod::TestPayment,
                name: "Test Payment",
                description: "Simulated payment, no money is charged",
            });
        }
        methods
    }

    // ==================== Lookups ====================

    async fn load_user(&self, id: &str) -> ServiceResult<User> {
        self.store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound).with_detail("id", id).into())
    }

    async fn load_active_service(&self, id: &str) -> ServiceResult<Service> {
        let service = self
            .store
            .find_service(id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::ServiceNotFound).with_detail("id", id))?;
        if !service.is_active {
            return Err(AppError::new(ErrorCode::ServiceInactive)
                .with_detail("id", id)
                .into());
        }
        Ok(service)
    }

    /// A coupon that fails any check is dropped and the enrollment proceeds
    /// at full price
    async fn resolve_coupon_silently(
        &self,
        code: Option<&str>,
        user_id: &str,
        service: &Service,
        now: i64,
    ) -> ServiceResult<Option<AppliedCoupon>> {
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            return Ok(None);
        };
        match coupon::resolve(self.store.as_ref(), code, user_id, service.price, now).await? {
            Ok(applied) => Ok(Some(applied)),
            Err(rejection) => {
                tracing::info!(
                    coupon_code = %code,
                    user_id,
                    reason = rejection.reason(),
                    "Coupon not applied, charging full price"
                );
                Ok(None)
            }
        }
    }

    // ==================== Channels ====================

    async fn commit_cash(
        &self,
        actor: &Actor,
        target: &User,
        service: &Service,
        applied: Option<AppliedCoupon>,
        details: CashDetailsInput,
    ) -> ServiceResult<CommittedEnrollment> {
        let now = now_millis();
        let mut plan = CommitPlan {
            enroller: actor,
            target,
            service,
            method: PaymentMethod::Cash,
            quote: applied
                .as_ref()
                .map(|a| a.quote)
                .unwrap_or_else(|| DiscountQuote::full_price(service.price)),
            coupon: applied.as_ref().map(|a| CouponRef::from(&a.coupon)),
            transaction_id: ids::cash_transaction_id(now),
            gateway_order_id: None,
            cash_details: Some(CashPaymentDetails {
                receipt_number: non_empty(details.receipt_number),
                notes: non_empty(details.notes).unwrap_or_else(|| DEFAULT_CASH_NOTE.to_string()),
                received_by: actor.id.clone(),
                received_at: now,
            }),
            pending_order_id: None,
            enforce_coupon_limits: true,
        };

        let reason = match self.commit_enrollment(&plan).await? {
            CommitOutcome::Committed(committed) => return Ok(committed),
            CommitOutcome::CouponExhausted(reason) => reason,
        };

        // A concurrent redemption took the last use after our quote
        tracing::info!(
            coupon_code = plan.coupon.as_ref().map(|c| c.code.as_str()).unwrap_or_default(),
            reason = reason.reason(),
            "Coupon exhausted at commit, retrying at full price"
        );
        plan.coupon = None;
        plan.quote = DiscountQuote::full_price(service.price);
        match self.commit_enrollment(&plan).await? {
            CommitOutcome::Committed(committed) => Ok(committed),
            CommitOutcome::CouponExhausted(_) => {
                Err(AppError::internal("coupon rejected on a coupon-free commit").into())
            }
        }
    }

    async fn quote_gateway_order(
        &self,
        actor: &Actor,
        target: &User,
        service: Service,
        applied: Option<AppliedCoupon>,
        test_mode: bool,
        now: i64,
    ) -> ServiceResult<QuotedOrder> {
        let quote = applied
            .as_ref()
            .map(|a| a.quote)
            .unwrap_or_else(|| DiscountQuote::full_price(service.price));
        let coupon = applied.as_ref().map(|a| CouponRef::from(&a.coupon));

        let receipt = format!("rcpt_{now}_{}", ids::random_suffix(6));
        let order = self
            .gateway
            .create_order(quote.final_amount, &receipt, test_mode)
            .await?;

        let method = if test_mode {
            PaymentMethod::TestPayment
        } else {
            PaymentMethod::Razorpay
        };
        let expires_at = now + self.settings.pending_order_ttl_minutes * MINUTE_MS;
        let pending = PendingOrder {
            order_id: order.id.clone(),
            target_user_id: target.id.clone(),
            enroller_id: actor.id.clone(),
            enroller_role: actor.role,
            service_id: service.id.clone(),
            payment_method: method,
            test_mode,
            coupon_id: coupon.as_ref().map(|c| c.id.clone()),
            coupon_code: coupon.as_ref().map(|c| c.code.clone()),
            original_amount: quote.original_amount,
            discount_percentage: quote.discount_percentage,
            discount_amount: quote.discount_amount,
            final_amount: quote.final_amount,
            amount_minor: order.amount,
            currency: order.currency.clone(),
            created_at: now,
            expires_at,
        };
        self.store.insert_pending_order(&pending).await?;

        tracing::info!(
            order_id = %order.id,
            enroller_id = %actor.id,
            channel = method.as_str(),
            amount = %quote.final_amount,
            "Gateway order created, awaiting payment"
        );

        Ok(QuotedOrder {
            requires_payment_verification: true,
            order,
            service,
            discount: quote,
            coupon,
            end_user_id: target.id.clone(),
            enroller_id: actor.id.clone(),
            enroller_role: actor.role,
            test_mode,
            expires_at,
        })
    }

    // ==================== Commit ====================

    /// Case, payment, coupon usage and notifications in one transaction.
    /// Any failure rolls the whole attempt back.
    async fn commit_enrollment(&self, plan: &CommitPlan<'_>) -> ServiceResult<CommitOutcome> {
        let notify_admins = match plan.method {
            PaymentMethod::Cash => plan.enroller.policy().notifies_admins_on_cash,
            _ => true,
        };
        // Reads happen before the transaction is opened
        let admin_ids: Vec<String> = if notify_admins {
            self.store
                .active_admin_ids()
                .await?
                .into_iter()
                .filter(|id| *id != plan.target.id)
                .collect()
        } else {
            Vec::new()
        };
        let existing_cases = self.store.count_cases().await?;

        let now = now_millis();
        let case = self.build_case(plan, existing_cases, now);
        let payment = build_payment(plan, &case, now);

        let mut tx = self.store.begin().await?;
        match write_enrollment(tx.as_mut(), plan, &case, &payment, &admin_ids, now).await {
            Ok(None) => {}
            Ok(Some(rejection)) => return Ok(CommitOutcome::CouponExhausted(rejection)),
            Err(e) => {
                tracing::warn!(
                    case_id = %case.case_id,
                    transaction_id = %payment.transaction_id,
                    "Enrollment rolled back"
                );
                return Err(e);
            }
        }
        tx.commit().await?;

        tracing::info!(
            case_id = %case.case_id,
            transaction_id = %payment.transaction_id,
            enroller_id = %plan.enroller.id,
            channel = plan.method.as_str(),
            amount = %payment.amount,
            coupon_code = payment.coupon_code.as_deref().unwrap_or_default(),
            "Enrollment committed"
        );

        Ok(CommitOutcome::Committed(CommittedEnrollment {
            case,
            payment,
            service: plan.service.clone(),
        }))
    }

    fn build_case(&self, plan: &CommitPlan<'_>, existing_cases: i64, now: i64) -> Case {
        let sla_hours = plan
            .service
            .sla_hours
            .map(i64::from)
            .unwrap_or(self.settings.default_sla_hours);
        Case {
            id: ids::new_id(),
            case_id: ids::case_id(now, existing_cases),
            end_user_id: plan.target.id.clone(),
            service_id: plan.service.id.clone(),
            employee_id: None,
            status: CaseStatus::New,
            current_step: 0,
            deadline: now + sla_hours * HOUR_MS,
            notes: Vec::new(),
            documents: Vec::new(),
            enrolled_by: plan.enroller.id.clone(),
            enrollment_type: EnrollmentType::for_enroller(
                &plan.enroller.id,
                plan.enroller.role,
                &plan.target.id,
            ),
            enrolled_at: now,
        }
    }
}

fn pending_coupon(order: &PendingOrder) -> Option<CouponRef> {
    let id = order.coupon_id.clone()?;
    Some(CouponRef {
        id,
        code: order.coupon_code.clone().unwrap_or_default(),
        discount_percentage: order.discount_percentage,
    })
}

fn build_payment(plan: &CommitPlan<'_>, case: &Case, now: i64) -> Payment {
    let initiated_from = if plan.enroller.id == plan.target.id {
        "self_service".to_string()
    } else {
        format!("{}_dashboard", plan.enroller.role)
    };
    Payment {
        id: ids::new_id(),
        case_id: case.id.clone(),
        user_id: plan.target.id.clone(),
        service_id: plan.service.id.clone(),
        amount: plan.quote.final_amount,
        original_amount: plan.quote.original_amount,
        discount_amount: plan.quote.discount_amount,
        discount_percentage: plan.quote.discount_percentage,
        coupon_code: plan.coupon.as_ref().map(|c| c.code.clone()),
        coupon_id: plan.coupon.as_ref().map(|c| c.id.clone()),
        transaction_id: plan.transaction_id.clone(),
        gateway_order_id: plan.gateway_order_id.clone(),
        payment_method: plan.method,
        status: PaymentStatus::Completed,
        cash_payment_details: plan.cash_details.clone(),
        payment_metadata: PaymentMetadata {
            enrolled_by: plan.enroller.id.clone(),
            enroller_role: plan.enroller.role,
            payment_initiated_from: initiated_from,
        },
        invoice_number: ids::invoice_number(now),
        paid_at: now,
    }
}

/// Transactional body of the commit. `Ok(Some(_))` means the coupon could
/// not be redeemed and the caller must drop the transaction.
async fn write_enrollment(
    tx: &mut dyn StoreTx,
    plan: &CommitPlan<'_>,
    case: &Case,
    payment: &Payment,
    admin_ids: &[String],
    now: i64,
) -> Result<Option<CouponRejection>, ServiceError> {
    if let Some(order_id) = &plan.pending_order_id
        && tx.take_pending_order(order_id).await?.is_none()
    {
        // Consumed by a concurrent or earlier phase 2
        return Err(AppError::new(ErrorCode::PaymentOrderNotFound).into());
    }

    tx.insert_case(case).await?;
    tx.insert_payment(payment).await?;

    if let Some(c) = &plan.coupon {
        let usage = CouponUsage {
            coupon_id: c.id.clone(),
            user_id: plan.target.id.clone(),
            case_id: case.id.clone(),
            payment_id: payment.id.clone(),
            discount_amount: payment.discount_amount,
            used_at: now,
        };
        match coupon::record_usage(tx, &usage, plan.enforce_coupon_limits).await? {
            UsageOutcome::Recorded => {}
            UsageOutcome::AlreadyRecorded => {
                tracing::warn!(coupon_id = %c.id, case_id = %case.id, "Coupon usage already recorded");
            }
            UsageOutcome::CouponMissing => {}
            UsageOutcome::Rejected(rejection) => return Ok(Some(rejection)),
        }
    }

    let service_name = &plan.service.name;
    let amount = format_amount(payment.amount);
    let user_draft = if plan.method == PaymentMethod::Cash {
        NotificationDraft {
            kind: NotificationKind::Enrollment,
            title: "Enrollment Confirmed".to_string(),
            message: format!(
                "You have been enrolled in {service_name}. Cash payment of {amount} received. Case ID: {}",
                case.case_id
            ),
            related_case_id: Some(case.id.clone()),
        }
    } else {
        NotificationDraft {
            kind: NotificationKind::Payment,
            title: "Enrollment Successful".to_string(),
            message: format!(
                "Payment of {amount} received. You are now enrolled in {service_name}. Case ID: {}",
                case.case_id
            ),
            related_case_id: Some(case.id.clone()),
        }
    };
    notify::notify(tx, &plan.target.id, &user_draft, now).await?;

    if !admin_ids.is_empty() {
        let admin_draft = NotificationDraft {
            kind: NotificationKind::Enrollment,
            title: if plan.method == PaymentMethod::Cash {
                "New Cash Enrollment".to_string()
            } else {
                "New Enrollment".to_string()
            },
            message: format!(
                "{} enrolled in {service_name} by {} {} ({} {amount}). Case ID: {}",
                plan.target.name,
                plan.enroller.role,
                plan.enroller.id,
                plan.method.as_str(),
                case.case_id
            ),
            related_case_id: Some(case.id.clone()),
        };
        notify::notify_all(tx, admin_ids, &admin_draft, now).await?;
    }

    Ok(None)
}
