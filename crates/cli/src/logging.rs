//! Logging setup for CLI commands

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging: console always, plus an optional append-mode file.
///
/// Returns the file writer guard, which must be kept alive for the
/// duration of the program so buffered log lines get flushed.
pub fn init_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
  // RUST_LOG overrides the default level
  let env_filter = EnvFilter::builder()
    .with_default_directive(tracing::Level::INFO.into())
    .from_env_lossy();

  let console = fmt::layer().with_target(true);

  match log_file {
    Some(path) => {
      if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
      {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create log directory {}", parent.display()))?;
      }
      let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;
      let (writer, guard) = tracing_appender::non_blocking(file);

      tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
      Ok(Some(guard))
    }
    None => {
      tracing_subscriber::registry().with(env_filter).with(console).init();
      Ok(None)
    }
  }
}
