//! Human-readable identifiers for cases, transactions and invoices
//!
//! The numeric sequence in a case id is presentation only; rows are keyed by
//! an opaque UUID.

use chrono::{TimeZone, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Opaque primary key
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Uppercase alphanumeric suffix of length `len`
pub fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// `CASE-<millis>-<seq:04>-<suffix>`, `seq` derived from the current case count
pub fn case_id(now: i64, existing_cases: i64) -> String {
    let seq = (existing_cases + 1).rem_euclid(10_000);
    format!("CASE-{now}-{seq:04}-{}", random_suffix(3))
}

/// Cash receipts: `CASH-<millis>-<suffix>`
pub fn cash_transaction_id(now: i64) -> String {
    format!("CASH-{now}-{}", random_suffix(8))
}

/// Test-mode gateway payments without a client-supplied payment id
pub fn test_payment_id(now: i64) -> String {
    format!("pay_test_{now}_{}", random_suffix(6).to_ascii_lowercase())
}

/// `INV-<yyyymm>-<millis>-<suffix>`
pub fn invoice_number(now: i64) -> String {
    let month = Utc
        .timestamp_millis_opt(now)
        .single()
        .map(|t| t.format("%Y%m").to_string())
        .unwrap_or_else(|| "000000".to_string());
    format!("INV-{month}-{now}-{}", random_suffix(4))
}
