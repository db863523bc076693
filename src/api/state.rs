//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::dashboard::AppContext;
use crate::websocket::{HubConfig, SessionHub};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded table, snapshot and pre-built map chart
    pub context: Arc<AppContext>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Registry of connected dashboard sessions
    pub hub: Arc<SessionHub>,
}

impl AppState {
    /// Create a new AppState around a loaded context
    pub fn new(context: Arc<AppContext>, config: ApiConfig) -> Self {
        let hub_config = HubConfig {
            max_sessions: config.max_sessions,
        };
        Self {
            context,
            config: Arc::new(config),
            start_time: Instant::now(),
            hub: Arc::new(SessionHub::new(hub_config)),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Whether there is anything to chart
    pub fn is_ready(&self) -> bool {
        !self.context.table().is_empty()
    }
}
