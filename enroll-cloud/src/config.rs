//! Enrollment server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Enrollment server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL; `None` selects the in-memory store (development only)
    pub database_url: Option<String>,
    /// JSON fixture (users, services, coupons) loaded into the in-memory store
    pub seed_file: Option<String>,
    /// JWT secret for actor authentication
    pub jwt_secret: String,
    /// Razorpay API key id
    pub razorpay_key_id: String,
    /// Razorpay API key secret (also the payment-signature HMAC key)
    pub razorpay_key_secret: String,
    /// Razorpay REST base URL
    pub razorpay_api_base: String,
    /// ISO currency for gateway orders
    pub currency: String,
    /// Upper bound for a single gateway call
    pub gateway_timeout_secs: u64,
    /// Case deadline when a service has no SLA configured
    pub default_sla_hours: i64,
    /// Lifetime of a phase-1 quote
    pub pending_order_ttl_minutes: i64,
    /// Whether `test_payment` / `isTestMode` requests are honoured
    pub allow_test_payments: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_dev = environment == "development";

        let database_url = std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if database_url.is_none() && !is_dev {
            return Err(format!("DATABASE_URL must be set in {environment} environment").into());
        }

        Ok(Self {
            http_port: Self::parse_or("HTTP_PORT", 8080),
            database_url,
            seed_file: std::env::var("SEED_FILE").ok().filter(|s| !s.is_empty()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            razorpay_key_id: Self::require_secret("RAZORPAY_KEY_ID", &environment)?,
            razorpay_key_secret: Self::require_secret("RAZORPAY_KEY_SECRET", &environment)?,
            razorpay_api_base: std::env::var("RAZORPAY_API_BASE")
                .unwrap_or_else(|_| "https://api.razorpay.com/v1".into()),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".into()),
            gateway_timeout_secs: Self::parse_or("GATEWAY_TIMEOUT_SECS", 15),
            default_sla_hours: Self::parse_or("DEFAULT_SLA_HOURS", 24),
            pending_order_ttl_minutes: Self::parse_or("PENDING_ORDER_TTL_MINUTES", 30),
            allow_test_payments: Self::parse_or("ALLOW_TEST_PAYMENTS", is_dev),
            environment,
        })
    }
}
