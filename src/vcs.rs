//! The external version-control tool used for history transfer.

use crate::config::Credentials;
use crate::error::{MoverError, Result};
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;
use url::Url;

/// Clone/push capability of a version-control tool.
pub trait VersionControl {
    /// Name of the tool, for error messages.
    fn name(&self) -> &str;

    /// Whether the tool can be executed.
    fn is_available(&self) -> bool;

    /// Bare-clone `url` into `dir`. Returns `false` on a non-zero exit.
    fn clone_bare(&self, url: &str, dir: &Path) -> Result<bool>;

    /// Mirror-push the bare repository in `dir` to `url`.
    /// Returns `false` on a non-zero exit.
    fn push_mirror(&self, url: &str, dir: &Path) -> Result<bool>;

    /// Fail with [`MoverError::ToolMissing`] unless the tool is available.
    fn ensure_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(MoverError::ToolMissing {
                tool: self.name().to_string(),
            })
        }
    }
}

/// The `git` command line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Use a specific executable instead of `git` from `PATH`.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str], dir: &Path) -> Result<Output> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()?;
        Ok(output)
    }

    /// Run `args`, then `url`, then `trailing`, logging with the URL redacted.
    fn run_with_url(&self, args: &[&str], url: &str, trailing: &[&str], dir: &Path) -> Result<bool> {
        let mut full_args = args.to_vec();
        full_args.push(url);
        full_args.extend_from_slice(trailing);
        let output = self.run(&full_args, dir)?;

        let shown = redact(url);
        let stderr = String::from_utf8_lossy(&output.stderr).replace(url, &shown);
        debug!(
            command = %format!("{} {} {} {}", self.program, args.join(" "), shown, trailing.join(" ")),
            status = %output.status,
            stderr = %stderr.trim(),
            "version control command finished"
        );
        Ok(output.status.success())
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for GitCli {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    fn clone_bare(&self, url: &str, dir: &Path) -> Result<bool> {
        self.run_with_url(&["clone", "--bare"], url, &["."], dir)
    }

    fn push_mirror(&self, url: &str, dir: &Path) -> Result<bool> {
        self.run_with_url(&["push", "--mirror"], url, &[], dir)
    }
}

/// Embed credentials into an HTTPS clone URL's user-info.
///
/// This is the only place credentials are attached to a URL.
pub fn authenticated_url(clone_url: &str, credentials: &Credentials) -> Result<String> {
    let mut url = Url::parse(clone_url)?;
    if url.scheme() != "https" {
        return Err(MoverError::validation(format!(
            "Clone URL '{}' is not an HTTPS URL",
            clone_url
        )));
    }

    let cannot_carry = |_| {
        MoverError::validation(format!("Clone URL '{}' cannot carry credentials", clone_url))
    };
    url.set_username(&credentials.username).map_err(cannot_carry)?;
    url.set_password(Some(&credentials.token)).map_err(cannot_carry)?;
    Ok(url.to_string())
}

/// Hide the password part of a URL for logging.
pub fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                parsed.set_password(Some("***")).ok();
            }
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}
