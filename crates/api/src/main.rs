//! Rulewatch API server: receives GitHub webhooks and reports ruleset
//! bypasses back onto merged pull requests.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api=debug".parse()?)
                .add_directive("processor=debug".parse()?)
                .add_directive("github=debug".parse()?),
        )
        .init();

    info!("Starting Rulewatch API");

    // Load configuration
    let config = common::Config::from_env();

    if config.github_app_id.is_none() || config.github_private_key.is_none() {
        warn!("GitHub App credentials not fully configured; webhook events will fail at auth");
    }
    info!("GitHub App key: {}", config.private_key_fingerprint());
    info!(
        "Organization rulesets: {}",
        if config.org_rulesets_enabled {
            "enabled"
        } else {
            "disabled"
        }
    );
    if config.github_webhook_secret.is_none() {
        warn!("GITHUB_WEBHOOK_SECRET not set; webhook signatures will not be verified");
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone()));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/webhooks/github", post(routes::webhooks::github))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
