//! CLI command implementations

mod config;
mod preview;
mod watch;

pub use config::{cmd_config_init, cmd_config_show};
pub use preview::cmd_preview;
pub use watch::cmd_watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use signsort_core::EngineConfig;

/// Command-line overrides applied on top of a config file (or defaults).
#[derive(Debug, Default)]
pub struct ConfigOverrides {
  pub workplace: Option<PathBuf>,
  pub destination: Option<PathBuf>,
  pub dry_run: bool,
  pub stability_timeout_ms: Option<u64>,
  pub no_initial_scan: bool,
  /// Replaces the configured keyword list when non-empty.
  pub keywords: Vec<String>,
}

/// Build the effective config: file values first, then command-line
/// overrides on top.
pub fn resolve_config(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<EngineConfig> {
  let mut config = match config_path {
    Some(path) => {
      EngineConfig::load(path).with_context(|| format!("Failed to load config from {}", path.display()))?
    }
    None => EngineConfig::default(),
  };

  if let Some(workplace) = overrides.workplace {
    config.workplace = workplace;
  }
  if let Some(destination) = overrides.destination {
    config.destination_root = destination;
  }
  if let Some(ms) = overrides.stability_timeout_ms {
    config.stability_timeout_ms = ms;
  }
  if overrides.dry_run {
    config.dry_run = true;
  }
  if overrides.no_initial_scan {
    config.scan_existing = false;
  }
  if !overrides.keywords.is_empty() {
    config.signed_keywords = overrides.keywords;
  }

  if config.workplace.as_os_str().is_empty() {
    bail!("No workplace directory given; pass it as an argument or set it in the config file");
  }
  if config.destination_root.as_os_str().is_empty() {
    bail!("No destination root given; pass it as an argument or set it in the config file");
  }

  Ok(config)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_overrides_win_over_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("signsort.toml");
    std::fs::write(
      &path,
      r#"
workplace = "/from/file"
destination_root = "/from/file/dest"
stability_timeout_ms = 9000
"#,
    )
    .unwrap();

    let config = resolve_config(Some(&path), ConfigOverrides {
      workplace: Some(PathBuf::from("/from/cli")),
      stability_timeout_ms: Some(1500),
      dry_run: true,
      ..Default::default()
    })
    .unwrap();

    assert_eq!(config.workplace, PathBuf::from("/from/cli"));
    assert_eq!(config.destination_root, PathBuf::from("/from/file/dest"));
    assert_eq!(config.stability_timeout_ms, 1500);
    assert!(config.dry_run);
  }

  #[test]
  fn test_missing_workplace_rejected() {
    let result = resolve_config(None, ConfigOverrides {
      destination: Some(PathBuf::from("/dest")),
      ..Default::default()
    });
    assert!(result.is_err());
  }

  #[test]
  fn test_keyword_flags_replace_config_list() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("signsort.toml");
    std::fs::write(
      &path,
      r#"
workplace = "/w"
destination_root = "/d"
signed_keywords = ["signed", "executed"]
"#,
    )
    .unwrap();

    let config = resolve_config(Some(&path), ConfigOverrides {
      keywords: vec!["approved".to_string(), "ratified".to_string()],
      ..Default::default()
    })
    .unwrap();
    assert_eq!(config.signed_keywords, vec!["approved", "ratified"]);

    // No flags: the file list stands
    let config = resolve_config(Some(&path), ConfigOverrides::default()).unwrap();
    assert_eq!(config.signed_keywords, vec!["signed", "executed"]);
  }

  #[test]
  fn test_no_initial_scan_flag() {
    let config = resolve_config(None, ConfigOverrides {
      workplace: Some(PathBuf::from("/w")),
      destination: Some(PathBuf::from("/d")),
      no_initial_scan: true,
      ..Default::default()
    })
    .unwrap();
    assert!(!config.scan_existing);
  }
}
