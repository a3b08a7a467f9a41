//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "RINVOKE_LOG";

/// Installs the stderr subscriber.
///
/// `RINVOKE_LOG` wins when set; otherwise the level is `debug` with
/// `--debug` and `warn` without. A subscriber that is already installed
/// (repeated in-process runs) is left in place.
pub fn init(debug: bool) {
    let fallback = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
