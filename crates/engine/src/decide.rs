//! Classification of a filename into a processing decision.
//!
//! This is the single implementation used by both the live pipeline and
//! the preview query, so preview output can never diverge from what the
//! watcher would actually do.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signsort_core::{
  config::{EngineConfig, WATCHED_EXTENSION},
  event::SkipReason,
  metadata::FileMetadata,
};

use crate::{
  parse::{self, ParseError},
  resolve::destination_dir,
};

/// How a filename classifies before any filesystem state is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
  /// Not a watched file type.
  NonPdf,
  /// Filename does not match the pattern.
  Unparsed(ParseError),
  /// Parsed, but the status segment is not a signed status.
  NotSigned(FileMetadata),
  /// Parsed and signed; eligible for relocation.
  Signed(FileMetadata),
}

/// What the engine would do with a file, as a pure function of filename
/// and configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "kebab-case")]
pub enum ProcessingDecision {
  /// Leave the file in place.
  Skip { reason: SkipReason },
  /// Relocate to `destination` (before any collision suffixing).
  Move { destination: PathBuf },
}

/// Classify a filename against the configured keyword set.
pub fn classify(file_name: &str, config: &EngineConfig) -> Classification {
  if !has_watched_extension(file_name) {
    return Classification::NonPdf;
  }
  match parse::parse_filename(file_name) {
    Err(e) => Classification::Unparsed(e),
    Ok(meta) => {
      if parse::is_signed(&meta.status, &config.signed_keywords) {
        Classification::Signed(meta)
      } else {
        Classification::NotSigned(meta)
      }
    }
  }
}

/// Compute the processing decision for a filename.
///
/// Pure function of metadata and keyword set: the returned destination is
/// the canonical layout path, without the timestamp de-collision that the
/// mover applies against live filesystem state.
pub fn decide(file_name: &str, config: &EngineConfig) -> (ProcessingDecision, Option<FileMetadata>) {
  match classify(file_name, config) {
    Classification::NonPdf => (
      ProcessingDecision::Skip {
        reason: SkipReason::NonPdf,
      },
      None,
    ),
    Classification::Unparsed(_) => (
      ProcessingDecision::Skip {
        reason: SkipReason::PatternMismatch,
      },
      None,
    ),
    Classification::NotSigned(meta) => (
      ProcessingDecision::Skip {
        reason: SkipReason::NotSignedStatus,
      },
      Some(meta),
    ),
    Classification::Signed(meta) => {
      let destination = destination_dir(&meta, &config.destination_root).join(file_name);
      (ProcessingDecision::Move { destination }, Some(meta))
    }
  }
}

/// Whether a filename carries the watched extension (case-insensitive).
pub fn has_watched_extension(file_name: &str) -> bool {
  Path::new(file_name)
    .extension()
    .is_some_and(|ext| ext.eq_ignore_ascii_case(WATCHED_EXTENSION))
}

/// Whether a path qualifies for the watch pipeline: a `.pdf` directly
/// inside the watched directory.
pub fn is_watched_path(path: &Path, workplace: &Path) -> bool {
  path.parent() == Some(workplace)
    && path
      .file_name()
      .and_then(|n| n.to_str())
      .is_some_and(has_watched_extension)
}
