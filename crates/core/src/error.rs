use std::path::PathBuf;

use thiserror::Error;

/// Errors that make a configuration unusable.
///
/// The engine refuses to start on any of these; they are surfaced to the
/// caller instead of being converted into lifecycle events.
#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Workplace path does not exist: {0}")]
  WorkplaceMissing(PathBuf),

  #[error("Workplace path is not a directory: {0}")]
  WorkplaceNotADirectory(PathBuf),

  #[error("Stability timeout must be greater than zero")]
  ZeroStabilityTimeout,

  #[error("Status keyword set must not be empty")]
  EmptyKeywords,

  #[error("Failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
