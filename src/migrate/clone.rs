//! Repository creation and git history transfer.

use crate::api::ApiGateway;
use crate::error::{MoverError, Result};
use crate::github::{RepoInfo, RepoOps};
use crate::repo_ref::RepoPair;
use crate::vcs::{self, VersionControl};
use std::fmt;
use tracing::{debug, info};

/// Steps of a clone, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStage {
    CheckDestination,
    FetchSource,
    CreateBlank,
    TransferHistory,
}

impl fmt::Display for CloneStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CheckDestination => "checking destination",
            Self::FetchSource => "fetching source",
            Self::CreateBlank => "creating destination",
            Self::TransferHistory => "transferring history",
        };
        f.write_str(name)
    }
}

/// Result of a clone that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// Destination created and history mirrored.
    Cloned(RepoInfo),
    /// Source is archived or disabled; nothing was done.
    Skipped(String),
}

/// A clone that failed at `stage`.
#[derive(Debug)]
pub struct CloneFailure {
    pub stage: CloneStage,
    /// Whether the destination repository had already been created.
    pub destination_created: bool,
    pub error: MoverError,
}

impl CloneFailure {
    fn at(stage: CloneStage) -> impl FnOnce(MoverError) -> Self {
        move |error| Self {
            stage,
            destination_created: stage == CloneStage::TransferHistory,
            error,
        }
    }
}

impl fmt::Display for CloneFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed while {}: {}", self.stage, self.error)
    }
}

/// Creates a blank destination repository and mirrors the source history into it.
pub struct CloneOrchestrator<'a> {
    source: &'a ApiGateway,
    destination: &'a ApiGateway,
    vcs: &'a dyn VersionControl,
}

impl<'a> CloneOrchestrator<'a> {
    pub fn new(
        source: &'a ApiGateway,
        destination: &'a ApiGateway,
        vcs: &'a dyn VersionControl,
    ) -> Self {
        Self {
            source,
            destination,
            vcs,
        }
    }

    /// Clone one repository pair.
    pub fn run(&self, pair: &RepoPair) -> std::result::Result<CloneOutcome, CloneFailure> {
        debug!(repo = %pair.destination, "checking whether destination exists");
        let existing = self
            .destination
            .find_repo(&pair.destination)
            .map_err(CloneFailure::at(CloneStage::CheckDestination))?;
        if existing.is_some() {
            return Err(CloneFailure::at(CloneStage::CheckDestination)(
                MoverError::CloneFailure {
                    repo: pair.destination.to_string(),
                    message: "destination repository already exists; delete it or only copy GitHub data"
                        .into(),
                },
            ));
        }

        debug!(repo = %pair.source, "downloading source repository info");
        let source_info = self
            .source
            .get_repo(&pair.source)
            .map_err(CloneFailure::at(CloneStage::FetchSource))?;
        if source_info.is_frozen() {
            let state = if source_info.archived { "archived" } else { "disabled" };
            return Ok(CloneOutcome::Skipped(format!(
                "source repository {} is {}",
                pair.source, state
            )));
        }

        info!(repo = %pair.destination, "creating blank destination repository");
        let created = self
            .destination
            .create_repo(&source_info, &pair.destination)
            .map_err(CloneFailure::at(CloneStage::CreateBlank))?;

        info!(from = %pair.source, to = %pair.destination, "mirroring git history");
        self.transfer_history(pair, &source_info, &created)
            .map_err(CloneFailure::at(CloneStage::TransferHistory))?;

        Ok(CloneOutcome::Cloned(created))
    }

    fn transfer_history(&self, pair: &RepoPair, source: &RepoInfo, destination: &RepoInfo) -> Result<()> {
        let source_url = vcs::authenticated_url(&source.clone_url, self.source.host().credentials())?;
        let destination_url =
            vcs::authenticated_url(&destination.clone_url, self.destination.host().credentials())?;

        // Removed when dropped, on every return path.
        let scratch = tempfile::Builder::new().prefix("git-mover-").tempdir()?;
        debug!(dir = %scratch.path().display(), "bare clone directory");

        if !self.vcs.clone_bare(&source_url, scratch.path())? {
            return Err(MoverError::CloneFailure {
                repo: pair.source.to_string(),
                message: format!("{} clone --bare failed", self.vcs.name()),
            });
        }
        if !self.vcs.push_mirror(&destination_url, scratch.path())? {
            return Err(MoverError::CloneFailure {
                repo: pair.destination.to_string(),
                message: format!("{} push --mirror failed", self.vcs.name()),
            });
        }
        Ok(())
    }
}
