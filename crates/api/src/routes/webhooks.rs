//! Webhook routes

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use crate::state::AppState;
use github::{verify_signature, WebhookPayload};

#[derive(Serialize)]
pub struct WebhookResponse {
    ok: bool,
    message: Option<String>,
}

/// Admit, acknowledge, and hand off a GitHub webhook delivery.
///
/// Processing runs on a spawned task: GitHub's delivery timeout is short
/// and a redelivery storm is worse than a late comment, so the response
/// never waits on the pipeline.
pub async fn github(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, StatusCode> {
    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            warn!("Missing X-GitHub-Event header");
            StatusCode::BAD_REQUEST
        })?
        .to_string();

    let delivery_id = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    // Verify signature if configured
    if let Some(secret) = &state.config.github_webhook_secret {
        let signature = headers
            .get("X-Hub-Signature-256")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                warn!("Missing X-Hub-Signature-256 header");
                StatusCode::UNAUTHORIZED
            })?;

        if !verify_signature(signature, secret, &body) {
            warn!("Invalid webhook signature");
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    // A payload that fails to parse is still acknowledged; raising here
    // would only make GitHub redeliver the same unparseable body.
    let payload = match WebhookPayload::parse(&event_type, &body) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Failed to parse {} webhook: {}", event_type, e);
            return Ok(Json(WebhookResponse {
                ok: false,
                message: Some("unparseable payload".to_string()),
            }));
        }
    };

    let handler = state.handler.clone();
    tokio::spawn(async move {
        handler.handle(payload, &delivery_id).await;
    });

    Ok(Json(WebhookResponse {
        ok: true,
        message: None,
    }))
}
