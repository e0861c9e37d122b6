//! GitHub repository resources.
//!
//! Operations are provided as extension traits on [`ApiGateway`](crate::api::ApiGateway):
//!
//! ```rust,no_run
//! use git_mover::api::ApiGateway;
//! use git_mover::config::{Credentials, HostConfig};
//! use git_mover::github::RepoOps;
//! use git_mover::repo_ref::RepoRef;
//!
//! let host = HostConfig::new("https://github.com", Credentials::new("me", "ghp_token"))?;
//! let api = ApiGateway::connect(host)?;
//!
//! match api.find_repo(&RepoRef::new("acme", "widgets"))? {
//!     Some(info) => println!("exists: {}", info.clone_url),
//!     None => println!("not found"),
//! }
//! # Ok::<(), git_mover::error::MoverError>(())
//! ```

mod repos;

pub use repos::{RepoInfo, RepoOps};
