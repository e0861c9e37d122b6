//! Transfer of GitHub platform data that lives outside the git history.
//!
//! Each supported [`MetadataKind`] has a codec that downloads records from
//! the source repository and recreates them on the destination. Codecs are
//! looked up through a [`MetadataRegistry`] holding the fixed set of kinds in
//! declaration order.
//!
//! Transfer is all-or-nothing per kind: the first record that cannot be
//! created stops the remaining records of that kind. Records created before
//! the failure stay in place; removing them is the caller's job.

mod branches;
mod deploy_keys;
mod releases;

pub use branches::{
    BranchRecord, Branches, ProtectionDetails, ProtectionSettings, PullRequestReviews,
    Restrictions, StatusCheck, StatusChecks, Toggle,
};
pub use deploy_keys::{DeployKeyRecord, DeployKeys};
pub use releases::{ReleaseRecord, Releases};

use crate::api::ApiGateway;
use crate::error::{MoverError, Result};
use crate::repo_ref::RepoRef;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A unit of platform data transferred independently of the git history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKind {
    Branches,
    DeployKeys,
    Releases,
}

impl MetadataKind {
    /// All kinds, in transfer order.
    pub const ALL: [MetadataKind; 3] = [Self::Branches, Self::DeployKeys, Self::Releases];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Branches => "branches",
            Self::DeployKeys => "deploy_keys",
            Self::Releases => "releases",
        }
    }
}

impl fmt::Display for MetadataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetadataKind {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                MoverError::validation(format!(
                    "Unknown GitHub data type '{}'. Expected one of: {}",
                    s,
                    Self::ALL.map(|k| k.as_str()).join(", ")
                ))
            })
    }
}

/// The metadata kinds requested for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataSelection {
    kinds: Vec<MetadataKind>,
}

impl MetadataSelection {
    /// Every supported kind.
    pub fn all() -> Self {
        Self {
            kinds: MetadataKind::ALL.to_vec(),
        }
    }

    /// Selected kinds in transfer order.
    pub fn kinds(&self) -> &[MetadataKind] {
        &self.kinds
    }

    pub fn contains(&self, kind: MetadataKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl FromStr for MetadataSelection {
    type Err = MoverError;

    /// Parse a comma-separated list. An empty list selects every kind.
    fn from_str(s: &str) -> Result<Self> {
        let requested = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<MetadataKind>>>()?;

        if requested.is_empty() {
            return Ok(Self::all());
        }

        let kinds = MetadataKind::ALL
            .into_iter()
            .filter(|kind| requested.contains(kind))
            .collect();
        Ok(Self { kinds })
    }
}

/// Result of recreating one kind of metadata on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// Every record was created.
    Created,
    /// The host rejected a record as invalid (HTTP 422).
    Rejected(String),
    /// Any other failure while creating a record.
    TransportFailure(String),
}

impl CreateOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Classify a failed create call for `item`.
    pub(crate) fn from_error(err: MoverError, item: &str) -> Self {
        if err.is_status(422) {
            warn!(item, "host rejected data as invalid (HTTP 422)");
            Self::Rejected(format!("{} was rejected as invalid: {}", item, err))
        } else {
            Self::TransportFailure(format!("{}: {}", item, err))
        }
    }
}

/// Download/create logic for one metadata kind.
pub trait MetadataCodec {
    type Record: fmt::Debug;

    const KIND: MetadataKind;

    /// Fetch every record of this kind from `repo`.
    fn download(&self, api: &ApiGateway, repo: &RepoRef) -> Result<Vec<Self::Record>>;

    /// Recreate `records` on `repo`, stopping at the first failure.
    fn create(&self, records: &[Self::Record], api: &ApiGateway, repo: &RepoRef) -> CreateOutcome;
}

/// Object-safe view of a codec used by the registry.
pub trait MetadataTransfer {
    fn kind(&self) -> MetadataKind;

    /// Download from the source repository and create on the destination.
    ///
    /// Download failures are returned as errors; create failures are
    /// reported through the [`CreateOutcome`].
    fn transfer(
        &self,
        source: &ApiGateway,
        from: &RepoRef,
        destination: &ApiGateway,
        to: &RepoRef,
    ) -> Result<CreateOutcome>;
}

impl<C: MetadataCodec> MetadataTransfer for C {
    fn kind(&self) -> MetadataKind {
        C::KIND
    }

    fn transfer(
        &self,
        source: &ApiGateway,
        from: &RepoRef,
        destination: &ApiGateway,
        to: &RepoRef,
    ) -> Result<CreateOutcome> {
        info!(kind = %C::KIND, repo = %from, "downloading source data");
        let records = self.download(source, from)?;
        debug!(kind = %C::KIND, count = records.len(), ?records, "downloaded records");

        info!(kind = %C::KIND, repo = %to, "uploading data to destination");
        Ok(self.create(&records, destination, to))
    }
}

/// Registry of supported metadata kinds.
pub struct MetadataRegistry {
    codecs: Vec<Box<dyn MetadataTransfer>>,
}

impl MetadataRegistry {
    /// Creates a registry with every built-in kind.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(Branches));
        registry.register(Box::new(DeployKeys));
        registry.register(Box::new(Releases));
        registry
    }

    /// Creates a registry with no codecs.
    pub fn empty() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Registers a codec, replacing any existing one for the same kind.
    pub fn register(&mut self, codec: Box<dyn MetadataTransfer>) {
        self.codecs.retain(|c| c.kind() != codec.kind());
        self.codecs.push(codec);
    }

    /// Finds the codec for a kind.
    pub fn get(&self, kind: MetadataKind) -> Option<&dyn MetadataTransfer> {
        self.codecs
            .iter()
            .find(|c| c.kind() == kind)
            .map(|c| c.as_ref())
    }

    /// Codecs for the selected kinds, in declaration order.
    pub fn selected<'a>(
        &'a self,
        selection: &'a MetadataSelection,
    ) -> impl Iterator<Item = &'a dyn MetadataTransfer> + 'a {
        MetadataKind::ALL
            .into_iter()
            .filter(|kind| selection.contains(*kind))
            .filter_map(|kind| self.get(kind))
    }
}

impl Default for MetadataRegistry {
    fn default() -> Self {
        Self::new()
    }
}
