//! Host and run configuration built from validated arguments.

use crate::error::{MoverError, Result};
use crate::metadata::MetadataSelection;
use crate::migrate::BatchPolicy;
use crate::repo_ref::{self, RepoPair};
use std::fmt;

/// Web URL of the public GitHub host.
pub const GITHUB_URL: &str = "https://github.com";
/// API root of the public GitHub host.
pub const GITHUB_API_URL: &str = "https://api.github.com";
/// API sub-path of GitHub Enterprise hosts.
pub const ENTERPRISE_API_PATH: &str = "/api/v3";

/// Username and personal access token for one host.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"***")
            .finish()
    }
}

/// A GitHub-compatible host: normalized API root plus credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    base_url: String,
    credentials: Credentials,
}

impl HostConfig {
    /// Build a host from a user-supplied HTTPS URL.
    pub fn new(host: &str, credentials: Credentials) -> Result<Self> {
        Ok(Self {
            base_url: normalize_host(host)?,
            credentials,
        })
    }

    /// The API root, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Whether this is the canonical public API host.
    pub fn is_public_github(&self) -> bool {
        self.base_url.trim_end_matches('/') == GITHUB_API_URL
    }

    /// Full URL for an API path relative to the root.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Normalize a host URL to an API root ending in `/`.
///
/// `https://github.com` and `https://api.github.com` map to the public API.
/// Any other host gets the enterprise API path appended unless already present.
pub fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim();
    if !host.starts_with("https://") {
        return Err(MoverError::validation(format!(
            "Host '{}' must be specified using an HTTPS URL",
            host
        )));
    }

    let trimmed = host.trim_end_matches('/');
    if trimmed.len() <= "https://".len() {
        return Err(MoverError::validation(format!(
            "Host '{}' has no domain",
            host
        )));
    }

    let mut normalized = if trimmed == GITHUB_URL || trimmed == GITHUB_API_URL {
        GITHUB_API_URL.to_string()
    } else if trimmed.ends_with(ENTERPRISE_API_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, ENTERPRISE_API_PATH)
    };
    normalized.push('/');
    Ok(normalized)
}

/// Raw, unvalidated run arguments.
#[derive(Debug, Clone, Default)]
pub struct MigrationArgs {
    pub source_repos: String,
    pub destination_repos: String,
    pub source_host: String,
    pub source_user: String,
    pub source_token: String,
    pub destination_host: String,
    pub destination_user: String,
    pub destination_token: String,
    /// `None` when metadata was not requested; `Some("")` means all types.
    pub github_data: Option<String>,
    pub clone: bool,
    pub keep_going: bool,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source: HostConfig,
    pub destination: HostConfig,
    pub pairs: Vec<RepoPair>,
    pub clone: bool,
    pub metadata: Option<MetadataSelection>,
    pub policy: BatchPolicy,
}

impl MigrationConfig {
    /// Validate raw arguments.
    pub fn from_args(args: MigrationArgs) -> Result<Self> {
        let pairs = repo_ref::parse_pairs(&args.source_repos, &args.destination_repos)?;
        let source = HostConfig::new(
            &args.source_host,
            Credentials::new(args.source_user, args.source_token),
        )?;
        let destination = HostConfig::new(
            &args.destination_host,
            Credentials::new(args.destination_user, args.destination_token),
        )?;
        let metadata = args
            .github_data
            .as_deref()
            .map(str::parse::<MetadataSelection>)
            .transpose()?;

        if !args.clone && metadata.is_none() {
            return Err(MoverError::validation(
                "Action not specified. Use of `--clone` and/or `--github-data` is required",
            ));
        }

        Ok(Self {
            source,
            destination,
            pairs,
            clone: args.clone,
            metadata,
            policy: if args.keep_going {
                BatchPolicy::BestEffort
            } else {
                BatchPolicy::FailFast
            },
        })
    }
}
