//! Log setup for rostergrid.
//!
//! Stdout is owned by the table UI, so events go to a daily rolling file.
//! The filter is taken from `RUST_LOG`, then `--log-level`, then
//! `[logging] level` in the config file, then [`DEFAULT_LOG_FILTER`].

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

/// Filter used when nothing else asks for one.
pub const DEFAULT_LOG_FILTER: &str = "rostergrid=info,warn";

/// Log file name prefix; the appender adds the date.
const LOG_FILE: &str = "rostergrid.log";

/// Install the global subscriber and return the directory logs go to.
///
/// `cli_level` is the `--log-level` flag. Without `[logging] dir` the files
/// land in the platform data directory, e.g. `~/.local/share/rostergrid/logs/`
/// on Linux.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// if a global subscriber is already set.
pub fn init(config: &LoggingConfig, cli_level: Option<&str>) -> anyhow::Result<PathBuf> {
    let log_dir = resolve_directory(config.dir.as_deref())?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE);

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(env.as_deref(), cli_level, config.level.as_deref());
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Warning: bad log filter '{}' ({}), using default", directive, e);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        filter = directive,
        log_dir = %log_dir.display(),
        "rostergrid starting up"
    );

    Ok(log_dir)
}

/// Pick the first non-blank filter directive in precedence order.
fn filter_directive<'a>(
    env: Option<&'a str>,
    cli_level: Option<&'a str>,
    configured: Option<&'a str>,
) -> &'a str {
    [env, cli_level, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|directive| !directive.is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}

fn resolve_directory(configured: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(dir) = configured {
        return Ok(dir.to_path_buf());
    }
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("rostergrid").join("logs"))
}

/// Log application shutdown.
pub fn shutdown() {
    tracing::info!("rostergrid shutting down");
}
