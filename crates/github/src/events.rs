//! GitHub event types

use serde::{Deserialize, Serialize};

/// GitHub user (as appears in webhook payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
}

/// GitHub repository (as appears in webhook payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: i64,
    pub name: String,
    pub full_name: String,
    pub owner: GitHubUser,
}

/// Base branch of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubBase {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// GitHub pull request (as appears in webhook payloads)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubPullRequest {
    pub id: i64,
    pub number: i32,
    pub state: String,
    pub user: GitHubUser,
    pub merged: Option<bool>,
    pub merge_commit_sha: Option<String>,
    pub base: GitHubBase,
}

/// Pull request event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: String,
    pub number: i32,
    pub pull_request: GitHubPullRequest,
    pub repository: GitHubRepo,
}

/// The slice of a pull_request event the bypass pipeline works with
#[derive(Debug, Clone)]
pub struct PullRequestContext {
    pub owner: String,
    pub repo: String,
    pub number: i32,
    pub merged: bool,
    pub merge_commit_sha: Option<String>,
    pub base_ref: String,
}

impl PullRequestEvent {
    pub fn context(&self) -> PullRequestContext {
        PullRequestContext {
            owner: self.repository.owner.login.clone(),
            repo: self.repository.name.clone(),
            number: self.pull_request.number,
            merged: self.pull_request.merged.unwrap_or(false),
            merge_commit_sha: self
                .pull_request
                .merge_commit_sha
                .clone()
                .filter(|sha| !sha.is_empty()),
            base_ref: self.pull_request.base.git_ref.clone(),
        }
    }
}
