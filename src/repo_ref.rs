//! Repository references and source/destination pairing.

use crate::error::{MoverError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static REPO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\-]+)/([\w\-]+)$").expect("repository pattern is a valid regex")
});

/// Destination entry that reuses the source repository name.
pub const SAME_AS_SOURCE: &str = ".";

/// An `owner/name` reference to a repository on some host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// API path of the repository resource, e.g. `repos/acme/widgets`.
    pub fn api_path(&self) -> String {
        format!("repos/{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = MoverError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = REPO_PATTERN.captures(s.trim()).ok_or_else(|| {
            MoverError::validation(format!("'{}' is not a valid repository name", s))
        })?;
        Ok(Self::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One (source, destination) mapping to migrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoPair {
    pub source: RepoRef,
    pub destination: RepoRef,
}

/// Parse comma-separated source and destination lists into pairs.
///
/// Both lists must have the same length. A destination entry of `.` reuses
/// the source repository at the same index.
pub fn parse_pairs(sources: &str, destinations: &str) -> Result<Vec<RepoPair>> {
    let sources: Vec<RepoRef> = split_list(sources)
        .map(|s| {
            s.parse().map_err(|_| {
                MoverError::validation(format!(
                    "Source repository '{}' is not a valid repository name",
                    s
                ))
            })
        })
        .collect::<Result<_>>()?;

    let destinations: Vec<&str> = split_list(destinations).collect();
    if destinations.len() != sources.len() {
        return Err(MoverError::validation(format!(
            "Number of source repositories specified ({}) does not equal the number of destination repositories ({})",
            sources.len(),
            destinations.len()
        )));
    }

    sources
        .into_iter()
        .zip(destinations)
        .map(|(source, dest)| {
            let destination = if dest == SAME_AS_SOURCE {
                source.clone()
            } else {
                dest.parse().map_err(|_| {
                    MoverError::validation(format!(
                        "Destination repository '{}' is not a valid repository name",
                        dest
                    ))
                })?
            };
            Ok(RepoPair {
                source,
                destination,
            })
        })
        .collect()
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim)
}
