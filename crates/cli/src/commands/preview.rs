//! Preview command: evaluate the workplace without moving anything

use anyhow::{Context, Result};
use engine::{ProcessingDecision, preview::preview};
use signsort_core::EngineConfig;

/// Print what a watch run would do with the files currently present.
pub fn cmd_preview(config: &EngineConfig, json: bool) -> Result<()> {
  config.validate().context("Invalid configuration")?;

  let report = preview(config).with_context(|| format!("Failed to read {}", config.workplace.display()))?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  for entry in &report.entries {
    let name = entry
      .path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| entry.path.display().to_string());
    match &entry.decision {
      ProcessingDecision::Move { destination } => println!("move  {name} -> {}", destination.display()),
      ProcessingDecision::Skip { reason } => println!("skip  {name} ({})", reason.as_str()),
    }
  }

  println!();
  println!(
    "{} files: {} would move, {} would stay",
    report.summary.total, report.summary.would_process, report.summary.would_skip
  );

  Ok(())
}
