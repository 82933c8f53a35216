use std::time::Duration;

use enroll_cloud::api;
use enroll_cloud::config::Config;
use enroll_cloud::state::AppState;
use shared::util::now_millis;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Sweep interval for expired pending orders
const PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enroll_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting enroll-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    // Periodic pending-order cleanup
    let store = state.store.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match store.purge_expired_pending_orders(now_millis()).await {
                Ok(0) => {}
                Ok(n) => tracing::info!(purged = n, "Expired pending orders removed"),
                Err(e) => tracing::warn!("Pending order cleanup failed: {e}"),
            }
        }
    });

    let app = api::create_router(state);

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("enroll-cloud HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
