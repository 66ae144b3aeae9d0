//! Application configuration

use std::env;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub App ID (the numeric app identifier, as a string)
    pub github_app_id: Option<String>,
    /// Installation ID the app acts on behalf of
    pub github_installation_id: Option<String>,
    /// PEM-encoded RSA private key for the GitHub App
    pub github_private_key: Option<String>,
    /// Shared secret for webhook signature verification
    pub github_webhook_secret: Option<String>,
    /// API base URL, overridable for tests and GHES
    pub github_api_base: String,
    /// Also query organization-level rulesets
    pub org_rulesets_enabled: bool,
    pub host: String,
    pub port: u16,
    /// Seconds to wait before querying rule suites after a merge event.
    /// Rule-suite records can lag the merge on GitHub's side.
    pub settle_delay_secs: u64,
    /// Maximum number of delivery fingerprints retained for dedup
    pub dedup_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            github_app_id: env::var("GITHUB_APP_ID").ok(),
            github_installation_id: env::var("GITHUB_INSTALLATION_ID").ok(),
            github_private_key: env::var("GITHUB_PRIVATE_KEY").ok(),
            github_webhook_secret: env::var("GITHUB_WEBHOOK_SECRET").ok(),
            github_api_base: env::var("GITHUB_API_BASE")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            org_rulesets_enabled: env::var("ORG_RULESETS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            settle_delay_secs: env::var("SETTLE_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            dedup_capacity: env::var("DEDUP_CAPACITY")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(4096),
        }
    }

    /// Redacted view of the private key for startup diagnostics.
    /// Never returns key material beyond the first and last few characters.
    pub fn private_key_fingerprint(&self) -> String {
        match &self.github_private_key {
            Some(key) if key.len() > 16 => {
                format!("{}...{}", &key[..8], &key[key.len() - 4..])
            }
            Some(_) => "configured (short)".to_string(),
            None => "not configured".to_string(),
        }
    }
}
