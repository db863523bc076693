//! covid-dash server
//!
//! Run with: cargo run --bin covid-dash
//!
//! Loads the feed once, then serves the dashboard API and sessions. A failed
//! load exits with a non-zero status before the listener binds.
//!
//! # Configuration
//!
//! Read from `COVID_DASH_CONFIG` or the first config file found (see
//! [`Config::locate`]), then overridden by environment variables:
//! - `COVID_DASH_FEED_URL`: CSV feed URL or local path
//! - `COVID_DASH_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `COVID_DASH_API_PORT`: Port to listen on (default: 8050)
//! - `COVID_DASH_LOG_LEVEL`: Log filter (default: covid_dash=info,tower_http=info)
//! - `COVID_DASH_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: Overrides the log filter entirely

use covid_dash::api::{serve, AppState};
use covid_dash::config::{Config, LoggingConfig};
use covid_dash::dashboard::AppContext;
use covid_dash::data::source::from_config;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match Config::locate() {
        Some(path) => Config::load_with_env(&path)?,
        None => Config::from_env(),
    };

    init_tracing(&config.logging);

    tracing::info!("Starting covid-dash v{}", env!("CARGO_PKG_VERSION"));

    // Load the feed before accepting connections
    let feed = from_config(&config.feed)?;
    tracing::info!(feed = %feed.describe(), "Loading feed");

    let context = match AppContext::load(feed.as_ref(), &config.dashboard).await {
        Ok(context) => context,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load feed");
            return Err(e.into());
        }
    };

    let table = context.table();
    tracing::info!(
        records = table.len(),
        states = table.states().len(),
        as_of = ?table.latest(),
        "Dashboard data ready"
    );

    // Run server
    let state = AppState::new(Arc::new(context), config.api.clone());
    serve(state, &config.api).await?;

    tracing::info!("covid-dash stopped");
    Ok(())
}

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
