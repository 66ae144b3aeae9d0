//! Application state

use std::sync::Arc;
use std::time::Duration;

use common::Config;
use github::{AppAuth, AppGateway};
use processor::BypassHandler;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub handler: Arc<BypassHandler>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = Arc::new(AppGateway::new(AppAuth::from_config(&config)));
        let handler = Arc::new(BypassHandler::new(
            gateway,
            config.org_rulesets_enabled,
            Duration::from_secs(config.settle_delay_secs),
            config.dedup_capacity,
        ));
        Self { config, handler }
    }
}
