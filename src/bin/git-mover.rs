//! CLI for the git-mover tool.

use anyhow::{Context, Result};
use clap::Parser;
use git_mover::config::{MigrationArgs, MigrationConfig};
use git_mover::error::{ExitStatus, MoverError};
use git_mover::logging;
use git_mover::metadata::MetadataKind;
use git_mover::migrate::Migrator;
use std::process::ExitCode;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "git-mover")]
#[command(
    author,
    version,
    about = "Migrate a repository between two GitHub hosts, complete with branch protections, deploy keys and releases",
    long_about = None
)]
struct Cli {
    /// The owner and repo to migrate from: `<owner>/<repo_name>`. Multiple repos separated by a comma
    source_repo: String,

    /// The owner and repo to migrate to: `<owner>/<repo_name>`, or `.` to reuse the source name.
    /// Multiple repos separated by a comma
    destination_repo: String,

    /// Print what is happening in detail
    #[arg(short, long)]
    verbose: bool,

    /// The GitHub host to migrate from
    #[arg(long, alias = "sourceHost", value_name = "URL")]
    source_host: String,

    /// Your username on the source host
    #[arg(long, alias = "sourceUserName", value_name = "USER")]
    source_user: String,

    /// Your personal access token for the source host
    #[arg(
        long,
        alias = "sourceToken",
        env = "GIT_MOVER_SOURCE_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    source_token: String,

    /// The GitHub host to migrate to
    #[arg(long, alias = "destinationHost", value_name = "URL")]
    destination_host: String,

    /// Your username on the destination host
    #[arg(long, alias = "destinationUserName", value_name = "USER")]
    destination_user: String,

    /// Your personal access token for the destination host
    #[arg(
        long,
        alias = "destinationToken",
        env = "GIT_MOVER_DESTINATION_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN"
    )]
    destination_token: String,

    /// Copy the source repository's GitHub data to the destination.
    /// Optionally a comma-separated subset of the supported types; all types when omitted
    #[arg(
        long,
        alias = "githubData",
        num_args = 0..=1,
        default_missing_value = "",
        value_name = "TYPES",
        long_help = github_data_help()
    )]
    github_data: Option<String>,

    /// Clone the source repository's commits, branches and tags to the destination
    #[arg(short = 'C', long)]
    clone: bool,

    /// Continue with the remaining repositories after one fails
    #[arg(long)]
    keep_going: bool,
}

fn github_data_help() -> String {
    format!(
        "Copy the source repository's GitHub data to the destination.\n\
         Specify a comma-separated list of: {}\n\
         If no value is given, all GitHub data is copied.",
        MetadataKind::ALL.map(|k| k.as_str()).join(", ")
    )
}

impl Cli {
    fn into_args(self) -> MigrationArgs {
        MigrationArgs {
            source_repos: self.source_repo,
            destination_repos: self.destination_repo,
            source_host: self.source_host,
            source_user: self.source_user,
            source_token: self.source_token,
            destination_host: self.destination_host,
            destination_user: self.destination_user,
            destination_token: self.destination_token,
            github_data: self.github_data,
            clone: self.clone,
            keep_going: self.keep_going,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print().ok();
            return ExitCode::from(ExitStatus::InvalidArguments.code());
        }
    };

    logging::init(cli.verbose);

    let status = match run(cli) {
        Ok(status) => status,
        Err(e) => {
            error!("{:#}", e);
            e.downcast_ref::<MoverError>()
                .map(ExitStatus::from)
                .unwrap_or(ExitStatus::InvalidArguments)
        }
    };
    ExitCode::from(status.code())
}

fn run(cli: Cli) -> Result<ExitStatus> {
    let config =
        MigrationConfig::from_args(cli.into_args()).context("Failed to validate the given arguments")?;
    debug!(?config, "validated configuration");

    let migrator = Migrator::from_config(&config).context("Unable to start the migration")?;
    let report = migrator.run(&config.pairs);
    Ok(report.exit_status())
}
