//! Logging for Synapse
//!
//! Installs the global `tracing` subscriber: an env-filter plus a human
//! readable or JSON formatter, writing to stderr so stdout stays free for
//! transcoded output.

use synapse_config::{LogFormat, LoggingConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging from configuration
///
/// An invalid filter directive falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = filter(&config.filter);

    let result = match config.format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_current_span(false);

            tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()
        }
    };

    result.map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

fn filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directive}' ({e}), falling back to info");
        EnvFilter::new("info")
    })
}
