//! Config commands

use std::path::Path;

use anyhow::{Context, Result, bail};
use signsort_core::EngineConfig;

/// Write a default config file.
pub fn cmd_config_init(output: Option<&Path>, force: bool) -> Result<()> {
  let path = output.unwrap_or(Path::new("signsort.toml"));

  if path.exists() && !force {
    bail!("{} already exists (use --force to overwrite)", path.display());
  }
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
  }

  std::fs::write(path, EngineConfig::generate_template())
    .with_context(|| format!("Failed to write {}", path.display()))?;
  println!("Wrote {}", path.display());
  Ok(())
}

/// Show the effective configuration as TOML.
pub fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
  let config = match config_path {
    Some(path) => {
      println!("# {}", path.display());
      EngineConfig::load(path)?
    }
    None => {
      println!("# built-in defaults");
      EngineConfig::default()
    }
  };

  print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);
  Ok(())
}
