//! Multi-scope bypass aggregation.
//!
//! Rule suites can be evaluated against a merge at repository level and,
//! when the deployment opts in, at organization level. The two sources
//! succeed or fail independently; a failing one is logged and contributes
//! nothing rather than suppressing the other's findings.

use github::{ClientError, GithubGateway, QueryScope, RuleSuiteRecord, Session};
use tracing::{debug, info, warn};

/// Which policy level a set of records came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Repository,
    Organization,
}

impl ScopeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScopeKind::Repository => "repository",
            ScopeKind::Organization => "organization",
        }
    }
}

/// Matching records from one scope
#[derive(Debug)]
pub struct ScopeFindings {
    pub scope: ScopeKind,
    pub records: Vec<RuleSuiteRecord>,
}

/// Aggregate result for one PR's merge event
#[derive(Debug)]
pub struct BypassFindings {
    /// Non-empty scopes only, repository before organization
    pub scopes: Vec<ScopeFindings>,
    pub total: usize,
    pub overall: bool,
}

/// Keep only records whose after state is the PR's merge commit.
/// The server-side ref filter is coarser than one commit, so records for
/// other pushes to the same branch come back too.
pub fn filter_matching(records: Vec<RuleSuiteRecord>, merge_sha: &str) -> Vec<RuleSuiteRecord> {
    records
        .into_iter()
        .filter(|r| r.after_sha.as_deref() == Some(merge_sha))
        .collect()
}

/// Query every applicable scope and merge the outcomes.
///
/// Never fails: a scope whose query errors is folded into "no evidence
/// found" after logging. The caller cannot distinguish "verified clean"
/// from "could not verify" here; operators consult the logs.
pub async fn aggregate(
    gateway: &dyn GithubGateway,
    session: &Session,
    owner: &str,
    repo: &str,
    base_ref: &str,
    merge_sha: &str,
    org_scope: bool,
) -> BypassFindings {
    let mut targets = vec![(
        ScopeKind::Repository,
        QueryScope::Repository {
            owner: owner.to_string(),
            repo: repo.to_string(),
        },
    )];
    if org_scope {
        targets.push((
            ScopeKind::Organization,
            QueryScope::Organization {
                owner: owner.to_string(),
                repo_filter: repo.to_string(),
            },
        ));
    }

    let mut scopes = Vec::new();
    let mut total = 0;
    for (kind, target) in targets {
        let records = match gateway
            .list_bypassed_rule_suites(session, &target, base_ref)
            .await
        {
            Ok(records) => {
                let matching = filter_matching(records, merge_sha);
                debug!(
                    "{} scope: {} rule suite(s) match merge commit {}",
                    kind.label(),
                    matching.len(),
                    merge_sha
                );
                matching
            }
            Err(ClientError::NotFound(url)) => {
                // No rulesets configured, or the account tier lacks the
                // feature. Not an error for aggregation purposes.
                info!("{} scope has no rule suites ({})", kind.label(), url);
                Vec::new()
            }
            Err(ClientError::PermissionDenied(url)) => {
                warn!(
                    "{} scope query denied ({}); the app likely needs administration:read",
                    kind.label(),
                    url
                );
                Vec::new()
            }
            Err(e) => {
                warn!(
                    "{} scope rule-suite query failed, treating as no evidence: {}",
                    kind.label(),
                    e
                );
                Vec::new()
            }
        };
        if !records.is_empty() {
            total += records.len();
            scopes.push(ScopeFindings {
                scope: kind,
                records,
            });
        }
    }

    BypassFindings {
        scopes,
        total,
        overall: total > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(after_sha: &str) -> RuleSuiteRecord {
        RuleSuiteRecord {
            id: None,
            before_sha: None,
            after_sha: Some(after_sha.to_string()),
            result: Some("bypass".to_string()),
            evaluation_result: None,
            actor_name: None,
            actor_id: None,
            pushed_at: None,
        }
    }

    #[test]
    fn filter_keeps_only_the_target_merge_commit() {
        let records = vec![record("sha-A"), record("sha-B")];
        let matching = filter_matching(records, "sha-B");
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].after_sha.as_deref(), Some("sha-B"));
    }

    #[test]
    fn filter_drops_records_without_after_sha() {
        let mut bare = record("ignored");
        bare.after_sha = None;
        assert!(filter_matching(vec![bare], "sha-B").is_empty());
    }
}
