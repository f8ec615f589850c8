//! Console and rolling-file tracing output for a seeding run.

use snafu::ResultExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::Config;
use crate::error::{ApplicationError, InitializeLoggerSnafu};

const LOG_FILE: &str = concat!(env!("CARGO_PKG_NAME"), ".log");
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Keep the returned guard alive until the run ends,
/// dropping it flushes the file writer.
pub fn init(config: &Config) -> Result<WorkerGuard, ApplicationError> {
    let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().pretty().with_writer(std::io::stdout))
        .with(fmt::layer().json().with_ansi(false).with_writer(writer));

    tracing::subscriber::set_global_default(subscriber).context(InitializeLoggerSnafu)?;
    tracing::debug!(dir = %config.log_dir.display(), file = LOG_FILE, "logger ready");

    Ok(guard)
}
