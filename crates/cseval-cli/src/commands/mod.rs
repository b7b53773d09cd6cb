pub mod run;
pub mod summarize;

use tracing_subscriber::EnvFilter;

/// Installs the process-wide subscriber. Called once per command, after the
/// configuration decides the default verbosity.
pub(crate) fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
