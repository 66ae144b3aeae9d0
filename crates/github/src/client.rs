//! GitHub REST API client for rule-suite queries and comment delivery

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::auth::Session;

/// Per-request wait bound for all outbound calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// Which policy level to query rule suites at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    Repository { owner: String, repo: String },
    Organization { owner: String, repo_filter: String },
}

/// One rule-suite evaluation as returned by GitHub.
///
/// Both the repo-level and org-level endpoints return this shape, with
/// fields drifting between API versions; everything optional except what
/// the pipeline cannot work without.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSuiteRecord {
    pub id: Option<i64>,
    pub before_sha: Option<String>,
    pub after_sha: Option<String>,
    /// Overall result, e.g. "pass", "fail", "bypass"
    pub result: Option<String>,
    /// Older field name carrying the same information
    pub evaluation_result: Option<String>,
    pub actor_name: Option<String>,
    pub actor_id: Option<i64>,
    pub pushed_at: Option<DateTime<Utc>>,
}

impl RuleSuiteRecord {
    /// Outcome label with the field-name drift folded away.
    /// A record returned by a bypass-filtered query with neither field set
    /// is still a bypass.
    pub fn outcome_label(&self) -> &str {
        self.result
            .as_deref()
            .or(self.evaluation_result.as_deref())
            .unwrap_or("bypass")
    }
}

/// The list endpoint answers with either a bare array or an object
/// wrapping the array, depending on API version.
#[derive(Deserialize)]
#[serde(untagged)]
enum RuleSuitesBody {
    Bare(Vec<RuleSuiteRecord>),
    Wrapped { rule_suites: Vec<RuleSuiteRecord> },
}

/// Parse a rule-suites response body, accepting both known shapes.
pub(crate) fn parse_rule_suites(body: &[u8]) -> Result<Vec<RuleSuiteRecord>, ClientError> {
    match serde_json::from_slice::<RuleSuitesBody>(body) {
        Ok(RuleSuitesBody::Bare(records)) => Ok(records),
        Ok(RuleSuitesBody::Wrapped { rule_suites }) => Ok(rule_suites),
        Err(e) => Err(ClientError::Shape(e.to_string())),
    }
}

/// GitHub API client bound to one session's token
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl GitHubClient {
    pub fn new(session: &Session) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: session.token.clone(),
            api_base: session.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("rulewatch/0.1"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", self.token)) {
            headers.insert(AUTHORIZATION, val);
        }
        headers
    }

    async fn get_raw(&self, url: &str, query: &[(&str, &str)]) -> Result<Vec<u8>, ClientError> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .headers(self.headers())
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.to_string()));
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ClientError::PermissionDenied(url.to_string()));
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }

    /// Fetch rule-suite evaluations with outcome "bypass" for a ref.
    ///
    /// Tries the current endpoint path first and falls back once to the
    /// legacy path on 404, then parses whichever body shape came back.
    /// The server-side ref filter is coarser than a single commit; callers
    /// filter on `after_sha` themselves.
    pub async fn list_bypassed_rule_suites(
        &self,
        scope: &QueryScope,
        git_ref: &str,
    ) -> Result<Vec<RuleSuiteRecord>, ClientError> {
        let query = match scope {
            QueryScope::Repository { .. } => {
                vec![("ref", git_ref), ("rule_suite_result", "bypass")]
            }
            QueryScope::Organization { repo_filter, .. } => vec![
                ("ref", git_ref),
                ("rule_suite_result", "bypass"),
                ("repository_name", repo_filter.as_str()),
            ],
        };

        let primary = rule_suites_url(&self.api_base, scope, false);
        match self.get_raw(&primary, &query).await {
            Ok(body) => parse_rule_suites(&body),
            Err(ClientError::NotFound(_)) => {
                let legacy = rule_suites_url(&self.api_base, scope, true);
                warn!(
                    "Rule-suites endpoint {} returned 404, trying legacy path {}",
                    primary, legacy
                );
                let body = self.get_raw(&legacy, &query).await?;
                parse_rule_suites(&body)
            }
            Err(e) => Err(e),
        }
    }

    /// Post a comment on a PR's issue thread. Single attempt; callers
    /// decide whether a failure matters.
    pub async fn post_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: i32,
        body: &str,
    ) -> Result<(), ClientError> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_base, owner, repo, pr_number
        );
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .headers(self.headers())
            .json(&json!({ "body": body }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Endpoint path for rule-suite listings. The path moved under
/// `/rulesets/` in the current API; some deployments still answer only on
/// the older flat path.
fn rule_suites_url(api_base: &str, scope: &QueryScope, legacy: bool) -> String {
    let segment = if legacy {
        "rule-suites"
    } else {
        "rulesets/rule-suites"
    };
    match scope {
        QueryScope::Repository { owner, repo } => {
            format!("{}/repos/{}/{}/{}", api_base, owner, repo, segment)
        }
        QueryScope::Organization { owner, .. } => {
            format!("{}/orgs/{}/{}", api_base, owner, segment)
        }
    }
}
