//! # git-mover
//!
//! Migrate git repositories between GitHub-compatible hosts, together with
//! the platform data that lives outside the git history.
//!
//! For each (source, destination) repository pair this crate can:
//!
//! - Create a blank destination repository and mirror the full git history
//!   (branches, tags, all refs) into it with `git clone --bare` / `git push --mirror`
//! - Copy branch protections, deploy keys and releases
//! - Delete the destination again when a step fails after it was created
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use git_mover::prelude::*;
//!
//! let source = HostConfig::new("https://github.com", Credentials::new("alice", "ghp_src"))?;
//! let destination = HostConfig::new("https://ghe.example.com", Credentials::new("alice", "ghp_dst"))?;
//!
//! let migrator = Migrator::new(
//!     ApiGateway::connect(source)?,
//!     ApiGateway::connect(destination)?,
//!     Box::new(GitCli::new()),
//! )
//! .with_clone(true)
//! .with_metadata(Some(MetadataSelection::all()));
//!
//! let pairs = parse_pairs("acme/widgets", ".")?;
//! let report = migrator.run(&pairs);
//! println!("{} succeeded, {} failed", report.succeeded(), report.failed());
//! # Ok::<(), git_mover::error::MoverError>(())
//! ```
//!
//! ## Hosts
//!
//! `https://github.com` and `https://api.github.com` address the public API.
//! Any other HTTPS host is treated as GitHub Enterprise and gets `/api/v3`
//! appended.

pub mod api;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod metadata;
pub mod migrate;
pub mod repo_ref;
pub mod vcs;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::api::{ApiCall, ApiGateway, ApiRequest, ApiResponse, HttpTransport, Method, Transport};
    pub use crate::config::{Credentials, HostConfig, MigrationArgs, MigrationConfig};
    pub use crate::error::{ExitStatus, MoverError, Result};
    pub use crate::github::{RepoInfo, RepoOps};
    pub use crate::metadata::{
        BranchRecord, Branches, CreateOutcome, DeployKeyRecord, DeployKeys, MetadataCodec,
        MetadataKind, MetadataRegistry, MetadataSelection, MetadataTransfer, ReleaseRecord,
        Releases,
    };
    pub use crate::migrate::{
        BatchPolicy, CloneOrchestrator, CloneOutcome, MigrationOutcome, MigrationReport,
        Migrator, PairReport,
    };
    pub use crate::repo_ref::{RepoPair, RepoRef, parse_pairs};
    pub use crate::vcs::{GitCli, VersionControl};
}

pub use prelude::*;
