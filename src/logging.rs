//! Tracing subscriber setup. Logs go to stderr so stdout stays free for
//! callers piping the run output.

use tracing_subscriber::EnvFilter;

use crate::cli::LogFormat;

/// Directive used when `RUST_LOG` is unset or unparsable.
const DEFAULT_DIRECTIVE: &str = "webbeaver=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Worker thread ids are included so per-file
/// messages from parallel extractors can be told apart.
pub fn init_logging_with_format(format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_thread_ids(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_target(false).init(),
    }
}
