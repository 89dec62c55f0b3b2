//! Lifecycle events emitted by the watch pipeline.
//!
//! Per path the sequence is strict:
//! `detected → stabilizing → parsed → (skipped | moving → moved)` with
//! `failed` as the terminal state for any error. A path never emits
//! `moved` without a prior `moving`, nor `parsed` without a prior
//! `detected`. The engine emits these; it does not store them.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::FileMetadata;

/// Why a file was skipped without being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
  /// Filename did not match `<document>_<client>_<date>_<status>.pdf`.
  PatternMismatch,
  /// Parsed fine, but the status segment is not a signed status.
  NotSignedStatus,
  /// Not a `.pdf` file (only produced by the preview query).
  NonPdf,
}

impl SkipReason {
  /// Stable reason code for logs and external consumers.
  pub fn as_str(&self) -> &'static str {
    match self {
      SkipReason::PatternMismatch => "pattern-mismatch",
      SkipReason::NotSignedStatus => "not-signed-status",
      SkipReason::NonPdf => "non-pdf",
    }
  }
}

/// Why processing a file failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailReason {
  /// The file's size never stabilized within the configured timeout.
  StabilityTimeout,
  /// Both the computed destination and its timestamp-suffixed sibling exist.
  DestinationCollision,
  /// The move itself failed; the source file is untouched.
  Move(String),
  /// A per-path task panicked; caught at the pipeline boundary.
  Internal,
}

impl FailReason {
  /// Stable reason code for logs and external consumers.
  pub fn as_str(&self) -> &'static str {
    match self {
      FailReason::StabilityTimeout => "stability-timeout",
      FailReason::DestinationCollision => "destination-collision",
      FailReason::Move(_) => "move-failed",
      FailReason::Internal => "internal-error",
    }
  }
}

impl std::fmt::Display for FailReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FailReason::Move(detail) => write!(f, "{}: {detail}", self.as_str()),
      other => f.write_str(other.as_str()),
    }
  }
}

/// What happened to a path at one point in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EventKind {
  /// A qualifying filesystem event arrived for a new path.
  Detected,
  /// Waiting for the file's size to stop changing.
  Stabilizing,
  /// Filename parsed into metadata.
  Parsed { metadata: FileMetadata },
  /// Terminal: the file stays where it is.
  Skipped { reason: SkipReason },
  /// Destination resolved; the move is about to happen.
  Moving { destination: PathBuf },
  /// Terminal: the file now lives at `destination` (computed only, in dry-run).
  Moved { destination: PathBuf },
  /// Terminal: processing failed; the source file is untouched.
  Failed { reason: FailReason },
}

impl EventKind {
  /// Returns true if this event ends the path's lifecycle.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      EventKind::Skipped { .. } | EventKind::Moved { .. } | EventKind::Failed { .. }
    )
  }
}

/// A timestamped lifecycle event for one watched path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
  pub path: PathBuf,
  pub timestamp: DateTime<Utc>,
  #[serde(flatten)]
  pub kind: EventKind,
}

impl PipelineEvent {
  /// Stamp an event with the current time.
  pub fn now(path: impl Into<PathBuf>, kind: EventKind) -> Self {
    Self {
      path: path.into(),
      timestamp: Utc::now(),
      kind,
    }
  }
}
