//! Webhook event handler: validation, dedup, pipeline sequencing.
//!
//! One delivery moves through
//! `Received -> Validated -> {Skipped | Deduplicated | Processing}
//! -> {Completed | Failed}`. Every path is terminal and logged; nothing
//! escapes to the caller, so the HTTP boundary can acknowledge receipt
//! unconditionally and redelivery storms never build up.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use github::{GithubGateway, PullRequestContext, PullRequestEvent, WebhookPayload};

use crate::aggregate;
use crate::dedup::{DedupGate, DedupKey};
use crate::report;

/// Terminal state of one delivery's pipeline run.
/// The host discards this; tests assert on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a merged-PR occurrence; nothing to check, no side effects
    Skipped { reason: &'static str },
    /// Same logical event already went through the gate
    Deduplicated,
    /// Pipeline ran to the end. `comment_posted` can be false either
    /// because the merge was clean or because delivery failed after a
    /// detection (best-effort notification).
    Completed {
        bypass_detected: bool,
        comment_posted: bool,
    },
    /// A step failed in a way that ends this run; logged, never raised
    Failed { step: &'static str },
}

/// Drives the bypass-detection pipeline for each inbound event
pub struct BypassHandler {
    gateway: Arc<dyn GithubGateway>,
    dedup: DedupGate,
    org_rulesets_enabled: bool,
    /// Wait between accepting a merge event and querying rule suites;
    /// rule-suite records can lag the merge on GitHub's side
    settle_delay: Duration,
}

impl BypassHandler {
    pub fn new(
        gateway: Arc<dyn GithubGateway>,
        org_rulesets_enabled: bool,
        settle_delay: Duration,
        dedup_capacity: usize,
    ) -> Self {
        Self {
            gateway,
            dedup: DedupGate::new(dedup_capacity),
            org_rulesets_enabled,
            settle_delay,
        }
    }

    /// Number of delivery fingerprints currently retained
    pub fn dedup_len(&self) -> usize {
        self.dedup.len()
    }

    /// Process one webhook delivery. Never fails; all outcomes are
    /// terminal states logged internally.
    pub async fn handle(&self, payload: WebhookPayload, delivery_id: &str) -> Outcome {
        match payload {
            WebhookPayload::Ping { zen } => {
                info!("Received ping: {}", zen);
                Outcome::Skipped { reason: "ping" }
            }
            WebhookPayload::Unknown { event_type } => {
                info!("Ignoring {} event", event_type);
                Outcome::Skipped {
                    reason: "event kind not handled",
                }
            }
            WebhookPayload::PullRequest(event) => {
                self.handle_pull_request(event, delivery_id).await
            }
        }
    }

    async fn handle_pull_request(&self, event: PullRequestEvent, delivery_id: &str) -> Outcome {
        let ctx = event.context();
        info!(
            "PR #{} in {}/{}: {}",
            ctx.number, ctx.owner, ctx.repo, event.action
        );

        if event.action != "closed" {
            return Outcome::Skipped {
                reason: "action is not closed",
            };
        }
        if !ctx.merged {
            return Outcome::Skipped {
                reason: "closed without merging",
            };
        }
        let merge_sha = match ctx.merge_commit_sha.as_deref() {
            Some(sha) => sha,
            None => {
                // merged == true with no merge commit; nothing to match
                // rule suites against
                warn!(
                    "PR #{} in {}/{} merged without a merge commit sha",
                    ctx.number, ctx.owner, ctx.repo
                );
                return Outcome::Skipped {
                    reason: "no merge commit",
                };
            }
        };

        // Gate entry before any external call: the loser of a concurrent
        // duplicate delivery must lose here, not at the comment post.
        let key = DedupKey::new("pull_request", &event.action, delivery_id, ctx.number, merge_sha);
        if !self.dedup.check_and_insert(&key) {
            info!(
                "Duplicate delivery {} for PR #{}, fingerprint {} already handled",
                delivery_id,
                ctx.number,
                key.as_str()
            );
            return Outcome::Deduplicated;
        }

        self.process(&ctx, merge_sha).await
    }

    async fn process(&self, ctx: &PullRequestContext, merge_sha: &str) -> Outcome {
        let session = match self.gateway.obtain_session().await {
            Ok(session) => session,
            Err(e) if e.is_configuration() => {
                error!(
                    "PR #{} in {}/{}: cannot authenticate, fix the deployment: {}",
                    ctx.number, ctx.owner, ctx.repo, e
                );
                return Outcome::Failed { step: "auth" };
            }
            Err(e) => {
                error!(
                    "PR #{} in {}/{}: token exchange failed: {}",
                    ctx.number, ctx.owner, ctx.repo, e
                );
                return Outcome::Failed { step: "auth" };
            }
        };

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        let findings = aggregate::aggregate(
            self.gateway.as_ref(),
            &session,
            &ctx.owner,
            &ctx.repo,
            &ctx.base_ref,
            merge_sha,
            self.org_rulesets_enabled,
        )
        .await;

        if !findings.overall {
            info!(
                "PR #{} in {}/{}: no bypassed rule suites for {}",
                ctx.number, ctx.owner, ctx.repo, merge_sha
            );
            return Outcome::Completed {
                bypass_detected: false,
                comment_posted: false,
            };
        }

        info!(
            "PR #{} in {}/{}: {} bypassed rule suite(s) detected",
            ctx.number, ctx.owner, ctx.repo, findings.total
        );
        let body = report::render(&findings, &ctx.owner, &ctx.repo, &ctx.base_ref);

        match self
            .gateway
            .post_comment(&session, &ctx.owner, &ctx.repo, ctx.number, &body)
            .await
        {
            Ok(()) => Outcome::Completed {
                bypass_detected: true,
                comment_posted: true,
            },
            Err(e) => {
                // Detection already succeeded; notification is best-effort
                // and the dedup gate prevents a retry from double-posting.
                warn!(
                    "PR #{} in {}/{}: comment delivery failed: {}",
                    ctx.number, ctx.owner, ctx.repo, e
                );
                Outcome::Completed {
                    bypass_detected: true,
                    comment_posted: false,
                }
            }
        }
    }
}
