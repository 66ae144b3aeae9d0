//! Network seam between the processor and GitHub.
//!
//! The pipeline core only ever talks to GitHub through this trait, so the
//! processor's tests can substitute a mock and exercise dedup, aggregation
//! and delivery semantics without a network.

use async_trait::async_trait;

use crate::auth::{AppAuth, AuthError, Session};
use crate::client::{ClientError, GitHubClient, QueryScope, RuleSuiteRecord};

#[async_trait]
pub trait GithubGateway: Send + Sync {
    /// Mint a short-lived session for one processing pass
    async fn obtain_session(&self) -> Result<Session, AuthError>;

    /// Fetch bypass-result rule suites for a ref at the given scope
    async fn list_bypassed_rule_suites(
        &self,
        session: &Session,
        scope: &QueryScope,
        git_ref: &str,
    ) -> Result<Vec<RuleSuiteRecord>, ClientError>;

    /// Post the notification comment on a PR thread
    async fn post_comment(
        &self,
        session: &Session,
        owner: &str,
        repo: &str,
        pr_number: i32,
        body: &str,
    ) -> Result<(), ClientError>;
}

/// Production gateway: App-auth token exchange plus the REST client
pub struct AppGateway {
    auth: AppAuth,
}

impl AppGateway {
    pub fn new(auth: AppAuth) -> Self {
        Self { auth }
    }
}

#[async_trait]
impl GithubGateway for AppGateway {
    async fn obtain_session(&self) -> Result<Session, AuthError> {
        self.auth.obtain_session().await
    }

    async fn list_bypassed_rule_suites(
        &self,
        session: &Session,
        scope: &QueryScope,
        git_ref: &str,
    ) -> Result<Vec<RuleSuiteRecord>, ClientError> {
        GitHubClient::new(session)
            .list_bypassed_rule_suites(scope, git_ref)
            .await
    }

    async fn post_comment(
        &self,
        session: &Session,
        owner: &str,
        repo: &str,
        pr_number: i32,
        body: &str,
    ) -> Result<(), ClientError> {
        GitHubClient::new(session)
            .post_issue_comment(owner, repo, pr_number, body)
            .await
    }
}
