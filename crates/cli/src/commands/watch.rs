//! Watch command: run the engine until interrupted

use anyhow::{Context, Result};
use engine::Engine;
use signsort_core::{
  EngineConfig,
  event::{EventKind, PipelineEvent},
};
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

/// Run a watch until Ctrl+C, printing outcomes as they happen.
pub async fn cmd_watch(config: EngineConfig, json: bool) -> Result<()> {
  let dry_run = config.dry_run;
  let handle = Engine::start(config).context("Failed to start watch engine")?;
  let mut events = handle.subscribe();

  println!(
    "Watching {} -> {}{}",
    handle.config().workplace.display(),
    handle.config().destination_root.display(),
    if dry_run { " (dry-run)" } else { "" }
  );
  println!("Press Ctrl+C to stop");

  loop {
    tokio::select! {
      _ = tokio::signal::ctrl_c() => break,
      event = events.recv() => match event {
        Ok(event) => print_event(&event, json),
        Err(RecvError::Lagged(missed)) => {
          warn!(missed, "Event stream lagged; some events were not printed");
        }
        Err(RecvError::Closed) => break,
      },
    }
  }

  let report = handle.stop().await;

  println!();
  println!(
    "Done: {} moved, {} skipped, {} failed ({} detected)",
    report.stats.moved, report.stats.skipped, report.stats.failed, report.stats.detected
  );
  if !report.unfinished.is_empty() {
    println!("Still in flight at shutdown:");
    for path in &report.unfinished {
      println!("  {}", path.display());
    }
  }

  Ok(())
}

fn print_event(event: &PipelineEvent, json: bool) {
  if json {
    if let Ok(line) = serde_json::to_string(event) {
      println!("{line}");
    }
    return;
  }

  let name = event
    .path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| event.path.display().to_string());

  // Intermediate states go to the log, not the console
  match &event.kind {
    EventKind::Moved { destination } => println!("moved   {name} -> {}", destination.display()),
    EventKind::Skipped { reason } => println!("skipped {name} ({})", reason.as_str()),
    EventKind::Failed { reason } => println!("failed  {name} ({reason})"),
    _ => {}
  }
}
