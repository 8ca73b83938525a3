//! Diagnostic logging to stderr
//!
//! Filter directives come from `RQC_LOG` (e.g. `RQC_LOG=rqc=trace`);
//! without it only warnings are shown, or debug output with `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding filter directives
pub const LOG_ENV: &str = "RQC_LOG";

/// Install the global subscriber; later calls are no-ops
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
