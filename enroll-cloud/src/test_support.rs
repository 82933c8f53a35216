//! Fixture builders shared by unit tests

use rust_decimal::Decimal;
use shared::models::{
    Case, CaseStatus, Coupon, CouponUsage, EnrollmentType, Role, Service, User,
};
use shared::util::{HOUR_MS, now_millis};

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        phone: None,
        role,
        source_tag: None,
        agent_id: None,
        is_active: true,
        created_at: 0,
    }
}

pub fn service(id: &str, price: i64) -> Service {
    Service {
        id: id.to_string(),
        name: format!("Service {id}"),
        service_type: "trademark".to_string(),
        price: Decimal::from(price),
        is_active: true,
        sla_hours: Some(48),
        documents_required: vec!["id_proof".to_string()],
    }
}

/// Active coupon valid from an hour ago to a day from now
pub fn coupon(id: &str, code: &str, pct: i32, max_total_uses: Option<i32>) -> Coupon {
    let now = now_millis();
    Coupon {
        id: id.to_string(),
        code: Coupon::normalize_code(code),
        description: Some(format!("{pct}% off")),
        discount_percentage: pct,
        valid_from: now - HOUR_MS,
        valid_to: now + 24 * HOUR_MS,
        max_total_uses,
        max_uses_per_user: 1,
        current_uses: 0,
        is_active: true,
        created_at: now - HOUR_MS,
        usage_history: Vec::new(),
    }
}

pub fn usage(coupon_id: &str, user_id: &str, case_id: &str) -> CouponUsage {
    CouponUsage {
        coupon_id: coupon_id.to_string(),
        user_id: user_id.to_string(),
        case_id: case_id.to_string(),
        payment_id: format!("pay-{case_id}"),
        discount_amount: Decimal::from(100),
        used_at: now_millis(),
    }
}

pub fn case(id: &str, case_id: &str) -> Case {
    Case {
        id: id.to_string(),
        case_id: case_id.to_string(),
        end_user_id: "u1".to_string(),
        service_id: "s1".to_string(),
        employee_id: None,
        status: CaseStatus::New,
        current_step: 0,
        deadline: 0,
        notes: Vec::new(),
        documents: Vec::new(),
        enrolled_by: "u1".to_string(),
        enrollment_type: EnrollmentType::SelfEnrolled,
        enrolled_at: 0,
    }
}
