//! Per-repository-pair migration.
//!
//! [`Migrator`] processes repository pairs strictly in order. For each pair it
//! optionally clones the source into a new destination repository, then
//! optionally copies the selected metadata kinds. A failure after the
//! destination was created deletes the destination repository again.
//!
//! # Example
//!
//! ```rust,no_run
//! use git_mover::config::{MigrationArgs, MigrationConfig};
//! use git_mover::migrate::Migrator;
//!
//! let config = MigrationConfig::from_args(MigrationArgs {
//!     source_repos: "acme/widgets".into(),
//!     destination_repos: ".".into(),
//!     source_host: "https://github.com".into(),
//!     source_user: "alice".into(),
//!     source_token: "ghp_source".into(),
//!     destination_host: "https://ghe.example.com".into(),
//!     destination_user: "alice".into(),
//!     destination_token: "ghp_destination".into(),
//!     github_data: Some(String::new()),
//!     clone: true,
//!     keep_going: false,
//! })?;
//!
//! let report = Migrator::from_config(&config)?.run(&config.pairs);
//! std::process::exit(report.exit_status().code().into());
//! # Ok::<(), git_mover::error::MoverError>(())
//! ```

mod clone;

pub use clone::{CloneFailure, CloneOrchestrator, CloneOutcome, CloneStage};

use crate::api::ApiGateway;
use crate::config::MigrationConfig;
use crate::error::{ExitStatus, Result};
use crate::github::RepoOps;
use crate::metadata::{CreateOutcome, MetadataRegistry, MetadataSelection};
use crate::repo_ref::{RepoPair, RepoRef};
use crate::vcs::{GitCli, VersionControl};
use tracing::{error, info, warn};

/// What to do with the remaining pairs after one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchPolicy {
    /// Stop the run at the first failed pair.
    #[default]
    FailFast,
    /// Process every pair regardless of earlier failures.
    BestEffort,
}

/// Outcome of one repository pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Success,
    Skipped(String),
    Failed { status: ExitStatus, detail: String },
}

impl MigrationOutcome {
    fn clone_failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            status: ExitStatus::CloneFailed,
            detail: detail.into(),
        }
    }

    fn metadata_failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            status: ExitStatus::MetadataFailed,
            detail: detail.into(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result for a single repository pair.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub source: RepoRef,
    pub destination: RepoRef,
    pub outcome: MigrationOutcome,
}

/// Result of a whole run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub pairs: Vec<PairReport>,
}

impl MigrationReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, MigrationOutcome::Success))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, MigrationOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(MigrationOutcome::is_failed)
    }

    /// Status of the first failed pair, or success.
    pub fn exit_status(&self) -> ExitStatus {
        self.pairs
            .iter()
            .find_map(|p| match &p.outcome {
                MigrationOutcome::Failed { status, .. } => Some(*status),
                _ => None,
            })
            .unwrap_or(ExitStatus::Success)
    }

    fn count(&self, pred: impl Fn(&MigrationOutcome) -> bool) -> usize {
        self.pairs.iter().filter(|p| pred(&p.outcome)).count()
    }
}

/// Migrates repository pairs from a source host to a destination host.
pub struct Migrator {
    source: ApiGateway,
    destination: ApiGateway,
    vcs: Box<dyn VersionControl>,
    registry: MetadataRegistry,
    clone: bool,
    metadata: Option<MetadataSelection>,
    policy: BatchPolicy,
}

impl Migrator {
    /// Create a migrator that does nothing until configured.
    pub fn new(source: ApiGateway, destination: ApiGateway, vcs: Box<dyn VersionControl>) -> Self {
        Self {
            source,
            destination,
            vcs,
            registry: MetadataRegistry::new(),
            clone: false,
            metadata: None,
            policy: BatchPolicy::default(),
        }
    }

    /// Build a migrator talking HTTPS to both hosts and using `git`.
    ///
    /// Fails with [`MoverError::ToolMissing`](crate::error::MoverError::ToolMissing)
    /// if cloning is requested and `git` cannot be run.
    pub fn from_config(config: &MigrationConfig) -> Result<Self> {
        let vcs = GitCli::new();
        if config.clone {
            vcs.ensure_available()?;
        }

        let source = ApiGateway::connect(config.source.clone())?;
        let destination = ApiGateway::connect(config.destination.clone())?;
        Ok(Self::new(source, destination, Box::new(vcs))
            .with_clone(config.clone)
            .with_metadata(config.metadata.clone())
            .with_policy(config.policy))
    }

    /// Clone the source into a new destination repository.
    pub fn with_clone(mut self, clone: bool) -> Self {
        self.clone = clone;
        self
    }

    /// Copy the selected metadata kinds.
    pub fn with_metadata(mut self, metadata: Option<MetadataSelection>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_registry(mut self, registry: MetadataRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Migrate every pair in order.
    pub fn run(&self, pairs: &[RepoPair]) -> MigrationReport {
        info!("Processing list of {} repositories", pairs.len());
        let mut report = MigrationReport::default();

        for pair in pairs {
            info!("Processing '{}' --> '{}'", pair.source, pair.destination);
            let outcome = self.migrate_pair(pair);
            match &outcome {
                MigrationOutcome::Success => {
                    info!("Successfully migrated '{}'", pair.destination)
                }
                MigrationOutcome::Skipped(reason) => warn!("Skipping '{}': {}", pair.source, reason),
                MigrationOutcome::Failed { detail, .. } => {
                    error!("Failed to migrate '{}': {}", pair.source, detail)
                }
            }

            let stop = outcome.is_failed() && self.policy == BatchPolicy::FailFast;
            report.pairs.push(PairReport {
                source: pair.source.clone(),
                destination: pair.destination.clone(),
                outcome,
            });
            if stop {
                warn!(
                    "Stopping after first failure; {} pair(s) not attempted",
                    pairs.len() - report.pairs.len()
                );
                break;
            }
        }

        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Done"
        );
        report
    }

    fn migrate_pair(&self, pair: &RepoPair) -> MigrationOutcome {
        let mut destination_exists = false;

        if self.clone {
            let cloner = CloneOrchestrator::new(&self.source, &self.destination, self.vcs.as_ref());
            match cloner.run(pair) {
                Ok(CloneOutcome::Cloned(_)) => destination_exists = true,
                Ok(CloneOutcome::Skipped(reason)) => return MigrationOutcome::Skipped(reason),
                Err(failure) => {
                    let mut detail = format!(
                        "failed to clone source repository's codebase to destination: {}",
                        failure
                    );
                    if failure.destination_created
                        && let Err(rollback) = self.rollback(&pair.destination)
                    {
                        detail.push_str(&format!("; {}", rollback));
                    }
                    return MigrationOutcome::clone_failed(detail);
                }
            }
        }

        let Some(selection) = &self.metadata else {
            return MigrationOutcome::Success;
        };

        if !destination_exists {
            match self.destination.find_repo(&pair.destination) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return MigrationOutcome::metadata_failed(format!(
                        "destination repository {} does not exist; create it or use --clone",
                        pair.destination
                    ));
                }
                // Same status as a failed check before a clone.
                Err(e) => {
                    return MigrationOutcome::clone_failed(format!(
                        "unable to determine whether {} exists: {}",
                        pair.destination, e
                    ));
                }
            }
        }

        for codec in self.registry.selected(selection) {
            let kind = codec.kind();
            info!("Copying source repository's {} data to destination", kind);

            let failure = match codec.transfer(&self.source, &pair.source, &self.destination, &pair.destination) {
                Ok(CreateOutcome::Created) => continue,
                Ok(CreateOutcome::Rejected(reason)) => {
                    format!("failed to create {} data: {}", kind, reason)
                }
                Ok(CreateOutcome::TransportFailure(detail)) => {
                    format!("error while creating {} data: {}", kind, detail)
                }
                Err(e) => format!("error while copying {} data: {}", kind, e),
            };

            let mut detail = failure;
            if let Err(rollback) = self.rollback(&pair.destination) {
                detail.push_str(&format!("; {}", rollback));
            }
            return MigrationOutcome::metadata_failed(detail);
        }

        MigrationOutcome::Success
    }

    /// Delete the destination repository after a partial migration.
    fn rollback(&self, destination: &RepoRef) -> std::result::Result<(), String> {
        warn!("Deleting partial repository '{}' from destination", destination);
        match self.destination.delete_repo(destination) {
            Ok(()) => {
                info!("Deleted '{}'", destination);
                Ok(())
            }
            Err(e) => {
                error!("Rollback of '{}' failed: {}", destination, e);
                Err(format!("rollback of {} failed: {}", destination, e))
            }
        }
    }
}
