//! Webhook payload parsing

use crate::events::*;
use serde_json::Value;
use tracing::{debug, warn};

/// Parsed webhook payload
#[derive(Debug)]
pub enum WebhookPayload {
    PullRequest(PullRequestEvent),
    Ping { zen: String },
    Unknown { event_type: String },
}

impl WebhookPayload {
    /// Parse a webhook payload from the event type and body
    pub fn parse(event_type: &str, body: &[u8]) -> Result<Self, serde_json::Error> {
        debug!("Parsing webhook: {}", event_type);

        match event_type {
            "ping" => {
                let v: Value = serde_json::from_slice(body)?;
                let zen = v["zen"].as_str().unwrap_or("").to_string();
                Ok(WebhookPayload::Ping { zen })
            }
            "pull_request" => {
                let event: PullRequestEvent = serde_json::from_slice(body)?;
                Ok(WebhookPayload::PullRequest(event))
            }
            _ => {
                warn!("Unhandled webhook event type: {}", event_type);
                Ok(WebhookPayload::Unknown {
                    event_type: event_type.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MERGED_PR_BODY: &str = r#"{
        "action": "closed",
        "number": 42,
        "pull_request": {
            "id": 900100,
            "number": 42,
            "state": "closed",
            "user": {"id": 7, "login": "alice"},
            "merged": true,
            "merge_commit_sha": "deadbeef1234567",
            "base": {"ref": "main"}
        },
        "repository": {
            "id": 1,
            "name": "widgets",
            "full_name": "acme/widgets",
            "owner": {"id": 2, "login": "acme"}
        }
    }"#;

    #[test]
    fn parses_merged_pull_request_event() {
        let payload = WebhookPayload::parse("pull_request", MERGED_PR_BODY.as_bytes()).unwrap();
        match payload {
            WebhookPayload::PullRequest(event) => {
                let ctx = event.context();
                assert_eq!(ctx.owner, "acme");
                assert_eq!(ctx.repo, "widgets");
                assert_eq!(ctx.number, 42);
                assert!(ctx.merged);
                assert_eq!(ctx.merge_commit_sha.as_deref(), Some("deadbeef1234567"));
                assert_eq!(ctx.base_ref, "main");
            }
            other => panic!("expected PullRequest, got {:?}", other),
        }
    }

    #[test]
    fn empty_merge_sha_normalizes_to_none() {
        let body = MERGED_PR_BODY.replace("deadbeef1234567", "");
        let payload = WebhookPayload::parse("pull_request", body.as_bytes()).unwrap();
        match payload {
            WebhookPayload::PullRequest(event) => {
                assert_eq!(event.context().merge_commit_sha, None);
            }
            other => panic!("expected PullRequest, got {:?}", other),
        }
    }

    #[test]
    fn unknown_event_type_is_tolerated() {
        let payload = WebhookPayload::parse("workflow_run", b"{}").unwrap();
        assert!(matches!(payload, WebhookPayload::Unknown { .. }));
    }

    #[test]
    fn ping_event_extracts_zen() {
        let payload = WebhookPayload::parse("ping", br#"{"zen": "Keep it simple."}"#).unwrap();
        match payload {
            WebhookPayload::Ping { zen } => assert_eq!(zen, "Keep it simple."),
            other => panic!("expected Ping, got {:?}", other),
        }
    }
}
