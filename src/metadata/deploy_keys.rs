//! Deploy key transfer.

use crate::api::{ApiCall, ApiGateway};
use crate::error::Result;
use crate::metadata::{CreateOutcome, MetadataCodec, MetadataKind};
use crate::repo_ref::RepoRef;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DeployKeyRecord {
    pub title: String,
    pub key: String,
    #[serde(default)]
    pub read_only: bool,
}

/// Codec for deploy keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployKeys;

impl MetadataCodec for DeployKeys {
    type Record = DeployKeyRecord;

    const KIND: MetadataKind = MetadataKind::DeployKeys;

    fn download(&self, api: &ApiGateway, repo: &RepoRef) -> Result<Vec<DeployKeyRecord>> {
        api.get_paginated(&format!("{}/keys", repo.api_path()))
    }

    fn create(&self, records: &[DeployKeyRecord], api: &ApiGateway, repo: &RepoRef) -> CreateOutcome {
        let path = format!("{}/keys", repo.api_path());
        for key in records {
            let call = ApiCall::post(&path).pre_delay().json(json!({
                "title": key.title,
                "key": key.key,
                "read_only": key.read_only,
            }));
            if let Err(e) = api.send(call) {
                return CreateOutcome::from_error(e, &format!("deploy key '{}'", key.title));
            }
            debug!(title = %key.title, "deploy key created");
        }
        CreateOutcome::Created
    }
}
