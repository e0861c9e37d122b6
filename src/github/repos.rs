//! Repository resource operations.

use crate::api::{ApiCall, ApiGateway};
use crate::error::Result;
use crate::repo_ref::RepoRef;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

/// Snapshot of a remote repository.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub disabled: bool,
    pub clone_url: String,
}

impl RepoInfo {
    /// Archived or disabled repositories are never cloned.
    pub fn is_frozen(&self) -> bool {
        self.archived || self.disabled
    }
}

/// Repository lookup, creation and deletion.
pub trait RepoOps {
    /// Get a repository, failing on any non-2xx status.
    fn get_repo(&self, repo: &RepoRef) -> Result<RepoInfo>;

    /// Get a repository, mapping 404 to `None`.
    fn find_repo(&self, repo: &RepoRef) -> Result<Option<RepoInfo>>;

    /// Create an empty repository under the destination organization,
    /// copying the descriptive fields of `template`.
    fn create_repo(&self, template: &RepoInfo, repo: &RepoRef) -> Result<RepoInfo>;

    /// Delete a repository.
    fn delete_repo(&self, repo: &RepoRef) -> Result<()>;
}

impl RepoOps for ApiGateway {
    fn get_repo(&self, repo: &RepoRef) -> Result<RepoInfo> {
        self.get_json(&repo.api_path())
    }

    fn find_repo(&self, repo: &RepoRef) -> Result<Option<RepoInfo>> {
        match self.get_repo(repo) {
            Ok(info) => Ok(Some(info)),
            Err(e) if e.is_status(404) => {
                debug!(repo = %repo, host = self.host().base_url(), "repository does not exist");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn create_repo(&self, template: &RepoInfo, repo: &RepoRef) -> Result<RepoInfo> {
        let body = json!({
            "name": repo.name,
            "description": template.description,
            "homepage": template.homepage,
            "private": template.private,
            "auto_init": false,
        });
        self.send(ApiCall::post(format!("orgs/{}/repos", repo.owner)).json(body))?
            .json()
    }

    fn delete_repo(&self, repo: &RepoRef) -> Result<()> {
        self.send(ApiCall::delete(repo.api_path()))?;
        Ok(())
    }
}
