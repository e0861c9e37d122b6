//! Release transfer.

use crate::api::{ApiCall, ApiGateway};
use crate::error::Result;
use crate::metadata::{CreateOutcome, MetadataCodec, MetadataKind};
use crate::repo_ref::RepoRef;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ReleaseRecord {
    pub tag_name: String,
    pub target_commitish: String,
    pub name: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

impl ReleaseRecord {
    fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("release '{} ({})'", name, self.tag_name),
            _ => format!("release '{}'", self.tag_name),
        }
    }
}

/// Codec for releases.
#[derive(Debug, Clone, Copy, Default)]
pub struct Releases;

impl MetadataCodec for Releases {
    type Record = ReleaseRecord;

    const KIND: MetadataKind = MetadataKind::Releases;

    fn download(&self, api: &ApiGateway, repo: &RepoRef) -> Result<Vec<ReleaseRecord>> {
        api.get_paginated(&format!("{}/releases", repo.api_path()))
    }

    fn create(&self, records: &[ReleaseRecord], api: &ApiGateway, repo: &RepoRef) -> CreateOutcome {
        let path = format!("{}/releases", repo.api_path());
        // Listed newest first; recreate oldest first.
        for release in records.iter().rev() {
            let call = ApiCall::post(&path).pre_delay().json(json!({
                "tag_name": release.tag_name,
                "target_commitish": release.target_commitish,
                "name": release.name,
                "body": release.body,
                "draft": release.draft,
                "prerelease": release.prerelease,
            }));
            if let Err(e) = api.send(call) {
                return CreateOutcome::from_error(e, &release.label());
            }
            debug!(tag = %release.tag_name, "release created");
        }
        CreateOutcome::Created
    }
}
