//! Branch protection transfer.

use crate::api::{ApiCall, ApiGateway};
use crate::error::Result;
use crate::metadata::{CreateOutcome, MetadataCodec, MetadataKind};
use crate::repo_ref::RepoRef;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

/// A branch and, when protected, its protection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    pub name: String,
    pub protected: bool,
    /// Present only when `protected` is true.
    pub details: Option<ProtectionDetails>,
}

/// Protection settings of one branch as read from the source host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionDetails {
    pub protection: ProtectionSettings,
    pub required_pull_request_reviews: PullRequestReviews,
    /// `None` when the source has no status checks configured.
    pub required_status_checks: Option<StatusChecks>,
    /// `None` when the source has no push restrictions configured.
    pub restrictions: Option<Restrictions>,
}

impl ProtectionDetails {
    /// Body for `PUT .../branches/{branch}/protection`.
    pub fn to_payload(&self) -> Value {
        json!({
            "required_status_checks": self.required_status_checks,
            "required_pull_request_reviews": self.required_pull_request_reviews,
            "restrictions": self.restrictions,
            "enforce_admins": self.protection.enforce_admins.enabled,
            "allow_force_pushes": self.protection.allow_force_pushes.enabled,
            "allow_deletions": self.protection.allow_deletions.enabled,
            "required_linear_history": self.protection.required_linear_history.enabled,
            "required_conversation_resolution": false,
        })
    }
}

/// An `{"enabled": bool}` flag of the protection resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Toggle {
    #[serde(default)]
    pub enabled: bool,
}

/// Boolean facets of the protection resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProtectionSettings {
    #[serde(default)]
    pub enforce_admins: Toggle,
    #[serde(default)]
    pub allow_force_pushes: Toggle,
    #[serde(default)]
    pub allow_deletions: Toggle,
    #[serde(default)]
    pub required_linear_history: Toggle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PullRequestReviews {
    #[serde(default)]
    pub dismiss_stale_reviews: bool,
    #[serde(default)]
    pub require_code_owner_reviews: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_approving_review_count: Option<u32>,
    #[serde(default)]
    pub require_last_push_approval: bool,
    /// Who may dismiss reviews; same shape as [`Restrictions`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismissal_restrictions: Option<Restrictions>,
    /// Who may bypass the review requirement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bypass_pull_request_allowances: Option<Restrictions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusChecks {
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<StatusCheck>,
}

/// A required check, optionally pinned to the app that reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusCheck {
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<i64>,
}

/// Who may push to a protected branch.
///
/// Read as user/team/app objects, written back as logins and slugs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "RawRestrictions")]
pub struct Restrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
    pub apps: Vec<String>,
}

#[derive(Deserialize)]
struct RawRestrictions {
    #[serde(default)]
    users: Vec<Login>,
    #[serde(default)]
    teams: Vec<Slug>,
    #[serde(default)]
    apps: Vec<Slug>,
}

#[derive(Deserialize)]
struct Login {
    login: String,
}

#[derive(Deserialize)]
struct Slug {
    slug: String,
}

impl From<RawRestrictions> for Restrictions {
    fn from(raw: RawRestrictions) -> Self {
        Self {
            users: raw.users.into_iter().map(|u| u.login).collect(),
            teams: raw.teams.into_iter().map(|t| t.slug).collect(),
            apps: raw.apps.into_iter().map(|a| a.slug).collect(),
        }
    }
}

#[derive(Deserialize)]
struct BranchSummary {
    name: String,
    #[serde(default)]
    protected: bool,
}

/// Codec for branch protections.
#[derive(Debug, Clone, Copy, Default)]
pub struct Branches;

impl Branches {
    fn protection_path(repo: &RepoRef, branch: &str) -> String {
        format!(
            "{}/branches/{}/protection",
            repo.api_path(),
            urlencoding::encode(branch)
        )
    }

    fn fetch_details(api: &ApiGateway, repo: &RepoRef, branch: &str) -> Result<ProtectionDetails> {
        let base = Self::protection_path(repo, branch);
        Ok(ProtectionDetails {
            protection: api.get_json(&base)?,
            required_pull_request_reviews: api
                .get_json(&format!("{}/required_pull_request_reviews", base))?,
            required_status_checks: absent_on_404(
                api.get_json(&format!("{}/required_status_checks", base)),
            )?,
            restrictions: absent_on_404(api.get_json(&format!("{}/restrictions", base)))?,
        })
    }
}

/// A 404 on an optional protection facet means it is not configured.
fn absent_on_404<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_status(404) => Ok(None),
        Err(e) => Err(e),
    }
}

impl MetadataCodec for Branches {
    type Record = BranchRecord;

    const KIND: MetadataKind = MetadataKind::Branches;

    fn download(&self, api: &ApiGateway, repo: &RepoRef) -> Result<Vec<BranchRecord>> {
        let branches: Vec<BranchSummary> =
            api.get_paginated(&format!("{}/branches", repo.api_path()))?;

        branches
            .into_iter()
            .map(|branch| {
                let details = if branch.protected {
                    debug!(branch = %branch.name, "fetching branch protection");
                    Some(Self::fetch_details(api, repo, &branch.name)?)
                } else {
                    None
                };
                Ok(BranchRecord {
                    name: branch.name,
                    protected: branch.protected,
                    details,
                })
            })
            .collect()
    }

    fn create(&self, records: &[BranchRecord], api: &ApiGateway, repo: &RepoRef) -> CreateOutcome {
        for branch in records.iter().filter(|b| b.protected) {
            let item = format!("protection for branch '{}'", branch.name);
            let Some(details) = &branch.details else {
                return CreateOutcome::Rejected(format!("{} has no downloaded settings", item));
            };

            let call = ApiCall::put(Self::protection_path(repo, &branch.name)).json(details.to_payload());
            if let Err(e) = api.send(call) {
                return CreateOutcome::from_error(e, &item);
            }
            debug!(branch = %branch.name, "branch protection created");
        }
        CreateOutcome::Created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> ProtectionDetails {
        ProtectionDetails {
            protection: serde_json::from_value(json!({
                "url": "https://api.github.com/repos/a/b/branches/main/protection",
                "enforce_admins": {"url": "x", "enabled": true},
                "allow_force_pushes": {"enabled": false},
                "allow_deletions": {"enabled": true},
                "required_linear_history": {"enabled": true},
            }))
            .unwrap(),
            required_pull_request_reviews: PullRequestReviews {
                dismiss_stale_reviews: true,
                require_code_owner_reviews: false,
                required_approving_review_count: Some(2),
                ..PullRequestReviews::default()
            },
            required_status_checks: None,
            restrictions: Some(Restrictions {
                users: vec!["octocat".into()],
                teams: vec!["core".into()],
                apps: vec![],
            }),
        }
    }

    #[test]
    fn test_payload_flattens_toggles() {
        let payload = details().to_payload();
        assert_eq!(payload["enforce_admins"], json!(true));
        assert_eq!(payload["allow_force_pushes"], json!(false));
        assert_eq!(payload["allow_deletions"], json!(true));
        assert_eq!(payload["required_linear_history"], json!(true));
    }

    #[test]
    fn test_payload_never_copies_conversation_resolution() {
        assert_eq!(
            details().to_payload()["required_conversation_resolution"],
            json!(false)
        );
    }

    #[test]
    fn test_payload_nested_objects() {
        let payload = details().to_payload();
        assert_eq!(payload["required_status_checks"], Value::Null);
        assert_eq!(
            payload["required_pull_request_reviews"],
            json!({
                "dismiss_stale_reviews": true,
                "require_code_owner_reviews": false,
                "required_approving_review_count": 2,
                "require_last_push_approval": false,
            })
        );
        assert_eq!(
            payload["restrictions"],
            json!({"users": ["octocat"], "teams": ["core"], "apps": []})
        );
    }

    #[test]
    fn test_missing_toggles_default_to_disabled() {
        let settings: ProtectionSettings = serde_json::from_value(json!({
            "enforce_admins": {"enabled": true}
        }))
        .unwrap();
        assert!(settings.enforce_admins.enabled);
        assert!(!settings.allow_force_pushes.enabled);
        assert!(!settings.required_linear_history.enabled);
    }

    #[test]
    fn test_restrictions_read_from_objects() {
        let restrictions: Restrictions = serde_json::from_value(json!({
            "url": "x",
            "users": [{"login": "octocat", "id": 1}],
            "teams": [{"slug": "core", "name": "Core"}],
            "apps": [{"slug": "ci-bot"}],
        }))
        .unwrap();
        assert_eq!(restrictions.users, vec!["octocat"]);
        assert_eq!(restrictions.teams, vec!["core"]);
        assert_eq!(restrictions.apps, vec!["ci-bot"]);
    }

    #[test]
    fn test_review_allowances_written_as_names() {
        let reviews: PullRequestReviews = serde_json::from_value(json!({
            "url": "x",
            "dismiss_stale_reviews": false,
            "require_code_owner_reviews": true,
            "require_last_push_approval": true,
            "dismissal_restrictions": {
                "url": "x",
                "users": [{"login": "octocat"}],
                "teams": [],
            },
            "bypass_pull_request_allowances": {
                "users": [],
                "teams": [{"slug": "release-managers"}],
                "apps": [{"slug": "merge-bot"}],
            },
        }))
        .unwrap();

        assert_eq!(
            serde_json::to_value(&reviews).unwrap(),
            json!({
                "dismiss_stale_reviews": false,
                "require_code_owner_reviews": true,
                "require_last_push_approval": true,
                "dismissal_restrictions": {"users": ["octocat"], "teams": [], "apps": []},
                "bypass_pull_request_allowances": {
                    "users": [],
                    "teams": ["release-managers"],
                    "apps": ["merge-bot"],
                },
            })
        );
    }

    #[test]
    fn test_status_checks_keep_app_bindings() {
        let checks: StatusChecks = serde_json::from_value(json!({
            "url": "x",
            "strict": true,
            "contexts": ["ci/build"],
            "checks": [{"context": "ci/build", "app_id": 15368}],
        }))
        .unwrap();
        assert_eq!(
            checks.checks,
            vec![StatusCheck {
                context: "ci/build".into(),
                app_id: Some(15368),
            }]
        );

        let unbound: StatusChecks =
            serde_json::from_value(json!({"strict": false, "contexts": []})).unwrap();
        assert_eq!(
            serde_json::to_value(&unbound).unwrap(),
            json!({"strict": false, "contexts": []})
        );
    }

    #[test]
    fn test_branch_names_are_encoded_in_paths() {
        let path = Branches::protection_path(&RepoRef::new("a", "b"), "release/1.0");
        assert_eq!(path, "repos/a/b/branches/release%2F1.0/protection");
    }
}
