//! GitHub wire layer: webhook intake, App authentication, rule-suite queries

pub mod auth;
pub mod client;
pub mod events;
pub mod gateway;
pub mod verify;
pub mod webhooks;

pub use auth::{AppAuth, AuthError, Session};
pub use client::{ClientError, GitHubClient, QueryScope, RuleSuiteRecord};
pub use events::{PullRequestContext, PullRequestEvent};
pub use gateway::{AppGateway, GithubGateway};
pub use verify::verify_signature;
pub use webhooks::WebhookPayload;
