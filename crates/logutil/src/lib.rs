//! Utilities for logging.

use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "compact" => LogFormat::Compact,
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            other => return Err(format!("unknown log format: {other}")),
        })
    }
}

fn env_filter(default_level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy()
}

/// Configure the global subscriber.
///
/// `RUST_LOG` takes precedence over `default_level` when set. Calling this
/// more than once is a no-op.
pub fn configure_global_logger(default_level: Level, format: LogFormat) {
    let builder = SubscriberBuilder::default()
        .with_env_filter(env_filter(default_level))
        .with_thread_ids(true)
        .with_target(true);

    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

/// Configure logging for tests, writing through the test harness' captured
/// output.
pub fn init_test() {
    let _ = SubscriberBuilder::default()
        .with_env_filter(env_filter(Level::DEBUG))
        .with_test_writer()
        .try_init();
}
