use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::handlers::AppointmentState;
use appointment_cell::store::SupabaseAppointmentStore;
use schedule_cell::handlers::ScheduleState;
use schedule_cell::services::ScheduleConfigService;
use schedule_cell::store::{ScheduleStore, SupabaseScheduleStore};
use shared_config::AppConfig;
use shared_utils::clock::ShopClock;
use shared_utils::rate_limit::{RateLimiter, RedisRateLimiter};

fn build_rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
    let Some(redis_url) = config.redis_url.as_deref() else {
        warn!("REDIS_URL not set, booking requests will not be rate limited");
        return None;
    };

    match RedisRateLimiter::new(redis_url, config.rate_limit_max_requests, config.rate_limit_window_secs) {
        Ok(limiter) => {
            info!(
                "Rate limiting bookings to {} per {}s",
                config.rate_limit_max_requests, config.rate_limit_window_secs
            );
            Some(Arc::new(limiter))
        }
        Err(e) => {
            warn!("Rate limiter disabled: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting repair shop scheduling API");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    let schedules: Arc<dyn ScheduleStore> = Arc::new(
        SupabaseScheduleStore::new(&config).context("failed to create schedule store")?,
    );
    let appointments = Arc::new(
        SupabaseAppointmentStore::new(&config).context("failed to create appointment store")?,
    );

    let appointment_state = AppointmentState::new(
        config.clone(),
        schedules.clone(),
        appointments,
        Arc::new(ShopClock::new(config.shop_utc_offset_minutes)),
        build_rate_limiter(&config),
    );
    let schedule_state = ScheduleState {
        config: config.clone(),
        service: Arc::new(ScheduleConfigService::new(schedules)),
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(appointment_state, schedule_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
