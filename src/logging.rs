//! Log output setup for the command line tool.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default log level for a run.
pub fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Install a `fmt` subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug output.
/// Calling this more than once is harmless.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose).as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
