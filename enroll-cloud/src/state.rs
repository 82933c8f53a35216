//! Application state for enroll-cloud

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::db::memory::SeedData;
use crate::db::{MemoryStore, PgStore, Store};
use crate::enrollment::{EnrollmentService, EnrollmentSettings};
use crate::razorpay::RazorpayGateway;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Persistence (PostgreSQL, or in-memory in development)
    pub store: Arc<dyn Store>,
    /// Enrollment orchestrator
    pub enrollments: Arc<EnrollmentService>,
    /// JWT secret for actor authentication
    pub jwt_secret: String,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let store: Arc<dyn Store> = match &config.database_url {
            Some(url) => Arc::new(PgStore::connect(url).await?),
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                let store = MemoryStore::new();
                if let Some(path) = &config.seed_file {
                    let raw = tokio::fs::read_to_string(path).await?;
                    let seed: SeedData = serde_json::from_str(&raw)?;
                    tracing::info!(
                        users = seed.users.len(),
                        services = seed.services.len(),
                        coupons = seed.coupons.len(),
                        "Seeded in-memory store from {path}"
                    );
                    store.seed(seed).await;
                }
                Arc::new(store)
            }
        };

        let gateway = RazorpayGateway::new(
            config.razorpay_key_id.clone(),
            config.razorpay_key_secret.clone(),
            config.razorpay_api_base.clone(),
            config.currency.clone(),
            Duration::from_secs(config.gateway_timeout_secs),
        )?;

        let settings = EnrollmentSettings {
            default_sla_hours: config.default_sla_hours,
            pending_order_ttl_minutes: config.pending_order_ttl_minutes,
            allow_test_payments: config.allow_test_payments,
        };
        if settings.allow_test_payments {
            tracing::warn!("Test payments are enabled");
        }

        Ok(Self::from_parts(store, Arc::new(gateway), settings, config.jwt_secret.clone()))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        gateway: Arc<RazorpayGateway>,
        settings: EnrollmentSettings,
        jwt_secret: String,
    ) -> Self {
        let enrollments = Arc::new(EnrollmentService::new(store.clone(), gateway, settings));
        Self {
            store,
            enrollments,
            jwt_secret,
        }
    }
}
