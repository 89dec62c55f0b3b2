//! The per-path unit of work.
//!
//! Each qualifying path runs through `stabilize → parse → resolve → move`
//! exactly once, emitting lifecycle events along the way. All failures are
//! caught at this boundary and converted into `failed` events; nothing
//! propagates past a single file. The in-flight token is removed when the
//! path reaches a terminal state, whatever that state is.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
  sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
  },
};

use futures::FutureExt;
use serde::Serialize;
use signsort_core::{
  config::EngineConfig,
  event::{EventKind, FailReason, PipelineEvent, SkipReason},
};
use tokio::sync::{Notify, broadcast};
use tracing::{debug, trace, warn};

use crate::{
  decide::{Classification, classify},
  mover::move_file,
  resolve::resolve_destination,
  stability::{Stability, wait_for_stability},
};

// ============================================================================
// Shared coordinator state
// ============================================================================

/// State shared between the watcher loop and per-path workers.
///
/// The in-flight map is the only cross-file mutable state in the engine.
/// Its lock guards map transitions only, never I/O.
pub(crate) struct WatchShared {
  pub config: Arc<EngineConfig>,
  /// Lifecycle event fan-out to the logger and any push-channel observers.
  pub events: broadcast::Sender<PipelineEvent>,
  /// path → re-arm token; at most one in-flight worker per path.
  pub inflight: Mutex<HashMap<PathBuf, Arc<Notify>>>,
  /// Serializes destination resolution + rename so two files mapping to
  /// the identical resolved path cannot both win the non-collision check.
  pub move_lock: tokio::sync::Mutex<()>,
  pub stats: Counters,
}

impl WatchShared {
  pub fn new(config: Arc<EngineConfig>, events: broadcast::Sender<PipelineEvent>) -> Self {
    Self {
      config,
      events,
      inflight: Mutex::new(HashMap::new()),
      move_lock: tokio::sync::Mutex::new(()),
      stats: Counters::default(),
    }
  }

  /// Emit a lifecycle event, counting terminal outcomes.
  pub fn emit(&self, path: &Path, kind: EventKind) {
    let counter = match &kind {
      EventKind::Detected => Some(&self.stats.detected),
      EventKind::Moved { .. } => Some(&self.stats.moved),
      EventKind::Skipped { .. } => Some(&self.stats.skipped),
      EventKind::Failed { .. } => Some(&self.stats.failed),
      _ => None,
    };
    if let Some(counter) = counter {
      counter.fetch_add(1, Ordering::Relaxed);
    }
    debug!(path = %path.display(), kind = ?kind, "Lifecycle event");
    // No receivers is fine; events are fire-and-forget.
    let _ = self.events.send(PipelineEvent::now(path, kind));
  }

  /// Paths currently in a non-terminal state.
  pub fn inflight_paths(&self) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = self.inflight.lock().unwrap().keys().cloned().collect();
    paths.sort();
    paths
  }
}

/// Running totals for one engine run.
#[derive(Debug, Default)]
pub(crate) struct Counters {
  pub detected: AtomicU64,
  pub moved: AtomicU64,
  pub skipped: AtomicU64,
  pub failed: AtomicU64,
}

impl Counters {
  pub fn snapshot(&self) -> StatsSnapshot {
    StatsSnapshot {
      detected: self.detected.load(Ordering::Relaxed),
      moved: self.moved.load(Ordering::Relaxed),
      skipped: self.skipped.load(Ordering::Relaxed),
      failed: self.failed.load(Ordering::Relaxed),
    }
  }
}

/// Point-in-time view of the run counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
  pub detected: u64,
  pub moved: u64,
  pub skipped: u64,
  pub failed: u64,
}

// ============================================================================
// Per-path worker
// ============================================================================

/// Drive one path through the pipeline, then release its token.
///
/// Panics inside the pipeline are caught here and reported as
/// `failed(internal-error)` so a bug in one file's processing can never
/// take down the coordinator.
pub(crate) async fn run_path(shared: Arc<WatchShared>, path: PathBuf, rearm: Arc<Notify>) {
  let outcome = std::panic::AssertUnwindSafe(drive(&shared, &path, &rearm)).catch_unwind().await;
  if outcome.is_err() {
    warn!(path = %path.display(), "Per-path pipeline panicked");
    shared.emit(
      &path,
      EventKind::Failed {
        reason: FailReason::Internal,
      },
    );
  }
  shared.inflight.lock().unwrap().remove(&path);
}

async fn drive(shared: &WatchShared, path: &Path, rearm: &Notify) {
  let config = &shared.config;
  shared.emit(path, EventKind::Detected);
  shared.emit(path, EventKind::Stabilizing);

  // A new event for a path still stabilizing is treated as a fresh write:
  // the stability window restarts with a full timeout.
  let stability = loop {
    tokio::select! {
      outcome = wait_for_stability(path, config.stability_timeout(), config.poll_interval()) => break outcome,
      _ = rearm.notified() => {
        trace!(path = %path.display(), "Stability window re-armed");
        continue;
      }
    }
  };

  match stability {
    Stability::Vanished => {
      // Renamed or deleted elsewhere; drop silently.
      trace!(path = %path.display(), "File vanished during stability check");
      return;
    }
    Stability::TimedOut => {
      shared.emit(
        path,
        EventKind::Failed {
          reason: FailReason::StabilityTimeout,
        },
      );
      return;
    }
    Stability::Stable => {}
  }

  let file_name = match path.file_name() {
    Some(name) => name.to_string_lossy().into_owned(),
    None => {
      shared.emit(
        path,
        EventKind::Failed {
          reason: FailReason::Internal,
        },
      );
      return;
    }
  };

  let metadata = match classify(&file_name, config) {
    Classification::NonPdf => {
      // The watcher filters on extension; this only happens if a file was
      // renamed to a non-pdf name mid-flight.
      shared.emit(
        path,
        EventKind::Skipped {
          reason: SkipReason::NonPdf,
        },
      );
      return;
    }
    Classification::Unparsed(_) => {
      shared.emit(
        path,
        EventKind::Skipped {
          reason: SkipReason::PatternMismatch,
        },
      );
      return;
    }
    Classification::NotSigned(meta) => {
      shared.emit(path, EventKind::Parsed { metadata: meta });
      shared.emit(
        path,
        EventKind::Skipped {
          reason: SkipReason::NotSignedStatus,
        },
      );
      return;
    }
    Classification::Signed(meta) => {
      shared.emit(path, EventKind::Parsed { metadata: meta.clone() });
      meta
    }
  };

  // Collision check and rename must be logically sequential per
  // destination; the lock spans both. Dry-run takes the same path so the
  // two modes emit identical sequences.
  let _guard = shared.move_lock.lock().await;

  let destination = match resolve_destination(&metadata, &config.destination_root, &file_name) {
    Ok(dest) => dest,
    Err(e) => {
      debug!(path = %path.display(), error = %e, "Destination collision");
      shared.emit(
        path,
        EventKind::Failed {
          reason: FailReason::DestinationCollision,
        },
      );
      return;
    }
  };

  shared.emit(
    path,
    EventKind::Moving {
      destination: destination.clone(),
    },
  );

  match move_file(path, &destination, config.dry_run).await {
    Ok(final_dest) => {
      shared.emit(path, EventKind::Moved { destination: final_dest });
    }
    Err(e) => {
      shared.emit(
        path,
        EventKind::Failed {
          reason: FailReason::Move(e.to_string()),
        },
      );
    }
  }
}
