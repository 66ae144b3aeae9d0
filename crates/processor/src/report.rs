//! Notification rendering.
//!
//! Pure functions from findings to a markdown comment body. Output is
//! deterministic for identical input; the only timestamps shown are the
//! ones carried by the records themselves.

use github::RuleSuiteRecord;

use crate::aggregate::{BypassFindings, ScopeKind};

/// Render the aggregated findings into one comment body.
pub fn render(findings: &BypassFindings, owner: &str, repo: &str, base_ref: &str) -> String {
    let mut out = String::new();
    out.push_str("## :warning: Ruleset bypass detected\n\n");
    out.push_str(&format!(
        "**{}** rule suite evaluation(s) bypassed protection rules for this merge.\n",
        findings.total
    ));

    for scope in &findings.scopes {
        match scope.scope {
            ScopeKind::Repository => {
                out.push_str("\n### Repository rulesets\n\n");
                out.push_str(&format!(
                    "[View bypass insights](https://github.com/{}/{}/settings/rules/insights?ref={}&rule_status=bypass)\n\n",
                    owner,
                    repo,
                    encode_query_value(base_ref)
                ));
            }
            ScopeKind::Organization => {
                out.push_str("\n### Organization rulesets\n\n");
                out.push_str(&format!(
                    "[View bypass insights](https://github.com/organizations/{}/settings/rules/insights?repository={}&time_period=week)\n\n",
                    owner, repo
                ));
            }
        }
        for record in &scope.records {
            out.push_str(&render_record(record));
        }
    }

    out
}

fn render_record(record: &RuleSuiteRecord) -> String {
    format!(
        "- `{}` → `{}` — actor: {}, result: {}, at {}\n",
        short_sha(record.before_sha.as_deref()),
        short_sha(record.after_sha.as_deref()),
        record.actor_name.as_deref().unwrap_or("Unknown"),
        record.outcome_label(),
        record
            .pushed_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
    )
}

/// Abbreviate a commit id to the 7-character short form GitHub displays.
/// Shas are hex in practice, but a record field is still foreign input;
/// anything that cannot be cut at 7 bytes is shown whole.
fn short_sha(sha: Option<&str>) -> &str {
    match sha {
        Some(sha) => sha.get(..7).unwrap_or(sha),
        None => "unknown",
    }
}

/// Percent-encode a query value (branch refs may contain `/` and more)
fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
