//! Engine configuration.
//!
//! A configuration is immutable for the lifetime of one engine run and
//! hot-swappable between runs: callers load or build an [`EngineConfig`],
//! validate it, and hand the engine a snapshot it never mutates.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Status keywords treated as "signed" when no explicit list is configured.
pub const DEFAULT_SIGNED_KEYWORDS: &[&str] = &["signed", "executed", "final"];

/// Watched file extension (matched case-insensitively).
pub const WATCHED_EXTENSION: &str = "pdf";

/// Configuration for one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// The single non-recursively watched source directory.
  pub workplace: PathBuf,

  /// Base directory under which organized output folders are created.
  pub destination_root: PathBuf,

  /// How long to wait for a file's size to stop changing (milliseconds).
  pub stability_timeout_ms: u64,

  /// Compute and report moves without mutating the filesystem.
  pub dry_run: bool,

  /// Status segment keywords that classify a document as signed.
  pub signed_keywords: Vec<String>,

  /// Process files already present in the workplace when the run starts.
  pub scan_existing: bool,

  /// How long a stop request waits for in-flight files (milliseconds).
  pub shutdown_grace_ms: u64,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      workplace: PathBuf::new(),
      destination_root: PathBuf::new(),
      stability_timeout_ms: 10_000,
      dry_run: false,
      signed_keywords: DEFAULT_SIGNED_KEYWORDS.iter().map(|s| s.to_string()).collect(),
      scan_existing: true,
      shutdown_grace_ms: 5_000,
    }
  }
}

impl EngineConfig {
  /// Build a config for the given directories with default knobs.
  pub fn new(workplace: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
    Self {
      workplace: workplace.into(),
      destination_root: destination_root.into(),
      ..Default::default()
    }
  }

  /// The stability timeout as a [`Duration`].
  pub fn stability_timeout(&self) -> Duration {
    Duration::from_millis(self.stability_timeout_ms)
  }

  /// Size-sampling interval for the stability detector.
  ///
  /// A fixed fraction of the timeout, clamped so short timeouts do not
  /// hammer the filesystem and long timeouts still react quickly.
  pub fn poll_interval(&self) -> Duration {
    let fraction = self.stability_timeout_ms / 20;
    Duration::from_millis(fraction.clamp(100, 500))
  }

  /// The shutdown grace period as a [`Duration`].
  pub fn shutdown_grace(&self) -> Duration {
    Duration::from_millis(self.shutdown_grace_ms)
  }

  /// Check that the engine can start with this configuration.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.workplace.exists() {
      return Err(ConfigError::WorkplaceMissing(self.workplace.clone()));
    }
    if !self.workplace.is_dir() {
      return Err(ConfigError::WorkplaceNotADirectory(self.workplace.clone()));
    }
    if self.stability_timeout_ms == 0 {
      return Err(ConfigError::ZeroStabilityTimeout);
    }
    if self.signed_keywords.iter().all(|k| k.trim().is_empty()) {
      return Err(ConfigError::EmptyKeywords);
    }
    Ok(())
  }

  /// Load a config from a TOML file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Generate a default config file as a string.
  pub fn generate_template() -> String {
    r#"# signsort configuration

# The single watched source directory (non-recursive)
workplace = ""

# Base directory for organized output folders
destination_root = ""

# How long to wait for a file's size to stop changing (milliseconds)
stability_timeout_ms = 10000

# Compute and report moves without touching the filesystem
dry_run = false

# Status keywords that classify a document as signed
signed_keywords = ["signed", "executed", "final"]

# Process files already present in the workplace at startup
scan_existing = true

# How long a stop request waits for in-flight files (milliseconds)
shutdown_grace_ms = 5000
"#
    .to_string()
  }
}
