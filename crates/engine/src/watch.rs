//! The watch coordinator.
//!
//! [`Engine::start`] validates a configuration snapshot, begins watching
//! the workplace, and returns an [`EngineHandle`] for subscribing to
//! lifecycle events and stopping the run. The engine has an explicit
//! lifecycle (`configured → running → stopped`); there is no process-wide
//! watcher state.
//!
//! # Design
//!
//! The watcher bridges notify's sync callbacks into the async world:
//! 1. notify's callback forwards raw events into an mpsc channel with
//!    `blocking_send`
//! 2. a long-lived consumer task filters and deduplicates them per path
//! 3. each qualifying new path gets its own worker task; an event for a
//!    path already in flight re-arms that worker instead of spawning a
//!    second one
//!
//! Workers for different paths run concurrently and share nothing but the
//! in-flight map and the move lock (see [`crate::pipeline`]).

use std::{
  collections::hash_map::Entry,
  path::PathBuf,
  sync::{Arc, Mutex},
};

use notify::{Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use signsort_core::{config::EngineConfig, error::ConfigError, event::PipelineEvent};
use tokio::{
  sync::{Notify, broadcast, mpsc},
  task::JoinSet,
  time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::pipeline::{WatchShared, run_path};

pub use crate::pipeline::StatsSnapshot;

/// Buffer for the notify → async bridge.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Buffer for the lifecycle broadcast; slow observers miss old events
/// rather than stalling the pipeline.
const BROADCAST_CAPACITY: usize = 1024;

// ============================================================================
// Errors
// ============================================================================

/// Errors that prevent an engine run from starting.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
  #[error("invalid configuration: {0}")]
  Config(#[from] ConfigError),

  #[error("failed to resolve workplace path: {0}")]
  Workplace(#[source] std::io::Error),

  #[error("failed to initialize watcher: {0}")]
  Init(#[source] notify::Error),

  #[error("failed to watch workplace: {0}")]
  Watch(#[source] notify::Error),
}

// ============================================================================
// Engine
// ============================================================================

/// Entry point for a watch run.
pub struct Engine;

impl Engine {
  /// Validate `config` and start watching.
  ///
  /// Must be called inside a tokio runtime. On success the engine is
  /// running; the returned handle is the only way to observe or stop it.
  pub fn start(config: EngineConfig) -> Result<EngineHandle, EngineError> {
    config.validate()?;

    // Canonicalize so event paths from notify compare equal to the
    // configured workplace.
    let mut config = config;
    config.workplace = config.workplace.canonicalize().map_err(EngineError::Workplace)?;

    info!(
      workplace = %config.workplace.display(),
      destination = %config.destination_root.display(),
      dry_run = config.dry_run,
      stability_timeout_ms = config.stability_timeout_ms,
      "Starting watch engine"
    );

    let config = Arc::new(config);
    let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
    let shared = Arc::new(WatchShared::new(config.clone(), events));
    let cancel = CancellationToken::new();

    let watcher = WatcherTask::new(shared.clone(), cancel.clone())?;
    let task = tokio::spawn(watcher.run());

    Ok(EngineHandle {
      shared,
      cancel,
      task: Mutex::new(Some(task)),
      report: tokio::sync::Mutex::new(None),
    })
  }
}

/// What was left when a run stopped.
#[derive(Debug, Clone, Serialize)]
pub struct ShutdownReport {
  /// Paths still in a non-terminal state when the grace period expired.
  pub unfinished: Vec<PathBuf>,
  pub stats: StatsSnapshot,
}

/// Handle to a running engine.
pub struct EngineHandle {
  shared: Arc<WatchShared>,
  cancel: CancellationToken,
  task: Mutex<Option<tokio::task::JoinHandle<()>>>,
  // Async mutex: held across the drain so concurrent stops serialize.
  report: tokio::sync::Mutex<Option<ShutdownReport>>,
}

impl EngineHandle {
  /// Subscribe to the lifecycle event stream.
  ///
  /// Every subscriber sees every event from the moment of subscription;
  /// per-path ordering is strict, cross-path ordering is not guaranteed.
  pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
    self.shared.events.subscribe()
  }

  /// Current run counters.
  pub fn stats(&self) -> StatsSnapshot {
    self.shared.stats.snapshot()
  }

  /// The effective configuration of this run.
  pub fn config(&self) -> &EngineConfig {
    &self.shared.config
  }

  /// Stop the run: no new events are accepted, in-flight files get the
  /// configured grace period to finish, and whatever remains is reported.
  ///
  /// Idempotent; calling stop on an already-stopped engine (or racing
  /// another stop) returns the first caller's report.
  pub async fn stop(&self) -> ShutdownReport {
    let mut slot = self.report.lock().await;
    if let Some(report) = slot.clone() {
      return report;
    }

    self.cancel.cancel();
    let task = self.task.lock().unwrap().take();
    if let Some(task) = task
      && let Err(e) = task.await
    {
      warn!(error = %e, "Watcher task did not shut down cleanly");
    }

    let report = ShutdownReport {
      unfinished: self.shared.inflight_paths(),
      stats: self.shared.stats.snapshot(),
    };
    info!(
      moved = report.stats.moved,
      skipped = report.stats.skipped,
      failed = report.stats.failed,
      unfinished = report.unfinished.len(),
      "Watch engine stopped"
    );

    *slot = Some(report.clone());
    report
  }
}

// ============================================================================
// WatcherTask
// ============================================================================

/// The long-lived event-consuming task for one watched directory.
struct WatcherTask {
  shared: Arc<WatchShared>,
  cancel: CancellationToken,
  // Held to keep the notify watcher alive for the run.
  _watcher: RecommendedWatcher,
  event_rx: mpsc::Receiver<Result<Event, notify::Error>>,
  workers: JoinSet<()>,
}

impl WatcherTask {
  fn new(shared: Arc<WatchShared>, cancel: CancellationToken) -> Result<Self, EngineError> {
    let (event_tx, event_rx) = mpsc::channel::<Result<Event, notify::Error>>(EVENT_CHANNEL_CAPACITY);

    let mut watcher = RecommendedWatcher::new(
      move |res| {
        // Runs on notify's thread; drop events if the channel is gone.
        let _ = event_tx.blocking_send(res);
      },
      NotifyConfig::default(),
    )
    .map_err(EngineError::Init)?;

    watcher
      .watch(&shared.config.workplace, RecursiveMode::NonRecursive)
      .map_err(EngineError::Watch)?;

    debug!(workplace = %shared.config.workplace.display(), "Filesystem watcher initialized");

    Ok(Self {
      shared,
      cancel,
      _watcher: watcher,
      event_rx,
      workers: JoinSet::new(),
    })
  }

  async fn run(mut self) {
    if self.shared.config.scan_existing {
      self.scan_existing();
    }

    loop {
      tokio::select! {
        biased;

        _ = self.cancel.cancelled() => {
          info!("Watcher shutting down (stop requested)");
          break;
        }

        event = self.event_rx.recv() => {
          match event {
            Some(Ok(event)) => self.handle_event(event),
            Some(Err(e)) => warn!(error = %e, "Watcher error"),
            None => {
              info!("Watcher shutting down (event channel closed)");
              break;
            }
          }
        }
      }
    }

    self.drain_workers().await;
  }

  /// Feed files already present in the workplace through the pipeline.
  fn scan_existing(&mut self) {
    let listing = match std::fs::read_dir(&self.shared.config.workplace) {
      Ok(listing) => listing,
      Err(e) => {
        warn!(error = %e, "Could not scan existing files");
        return;
      }
    };

    let mut found = 0usize;
    for dirent in listing.flatten() {
      let path = dirent.path();
      if dirent.file_type().map(|t| t.is_file()).unwrap_or(false) && self.qualifies(&path) {
        self.dispatch(path);
        found += 1;
      }
    }
    if found > 0 {
      info!(count = found, "Queued existing files from workplace");
    }
  }

  /// Route one raw notify event.
  ///
  /// Creations and renamed-to paths start (or re-arm) a pipeline; data
  /// modifications only re-arm an in-flight stability window; everything
  /// else is ignored.
  fn handle_event(&mut self, event: Event) {
    use notify::event::{ModifyKind, RenameMode};

    match event.kind {
      EventKind::Create(_) => {
        for path in event.paths {
          if self.qualifies(&path) {
            self.dispatch(path);
          }
        }
      }
      EventKind::Modify(ModifyKind::Name(mode)) => match mode {
        RenameMode::Both => {
          // paths[0] = from, paths[1] = to; only the new name matters here.
          if let Some(to) = event.paths.last()
            && self.qualifies(to)
          {
            self.dispatch(to.clone());
          }
        }
        RenameMode::To | RenameMode::Any | RenameMode::Other => {
          for path in event.paths {
            if self.qualifies(&path) {
              self.dispatch(path);
            }
          }
        }
        // The old name of a rename is handled by the stability detector
        // observing the vanish.
        RenameMode::From => {}
      },
      EventKind::Modify(_) => {
        for path in event.paths {
          self.rearm(&path);
        }
      }
      EventKind::Remove(_) | EventKind::Access(_) | EventKind::Any | EventKind::Other => {
        trace!(kind = ?event.kind, "Ignoring event");
      }
    }
  }

  fn qualifies(&self, path: &std::path::Path) -> bool {
    if path.is_dir() {
      return false;
    }
    crate::decide::is_watched_path(path, &self.shared.config.workplace)
  }

  /// Start a worker for a new path, or coalesce into the existing one.
  fn dispatch(&mut self, path: PathBuf) {
    let mut map = self.shared.inflight.lock().unwrap();
    match map.entry(path.clone()) {
      Entry::Occupied(entry) => {
        trace!(path = %path.display(), "Event coalesced into in-flight pipeline");
        entry.get().notify_one();
      }
      Entry::Vacant(entry) => {
        let rearm = Arc::new(Notify::new());
        entry.insert(rearm.clone());
        drop(map);
        self.workers.spawn(run_path(self.shared.clone(), path, rearm));
      }
    }
  }

  /// Re-arm an in-flight stability window without ever starting a worker.
  fn rearm(&self, path: &std::path::Path) {
    if let Some(token) = self.shared.inflight.lock().unwrap().get(path) {
      trace!(path = %path.display(), "Stability window reset by new write");
      token.notify_one();
    }
  }

  /// Give in-flight workers the configured grace period, then abandon
  /// the rest. Abandoned paths stay in the in-flight map and end up in
  /// the shutdown report.
  async fn drain_workers(&mut self) {
    let deadline = Instant::now() + self.shared.config.shutdown_grace();

    loop {
      let remaining = deadline.saturating_duration_since(Instant::now());
      match tokio::time::timeout(remaining, self.workers.join_next()).await {
        Ok(Some(_)) => continue,
        Ok(None) => break,
        Err(_) => {
          warn!(abandoned = self.workers.len(), "Shutdown grace period expired");
          self.workers.abort_all();
          break;
        }
      }
    }
  }
}
