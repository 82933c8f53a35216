/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds in one hour
pub const HOUR_MS: i64 = 3_600_000;

/// Milliseconds in one minute
pub const MINUTE_MS: i64 = 60_000;
