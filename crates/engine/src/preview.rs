//! Dry-run preview of the current workplace listing.
//!
//! Synchronously runs the same parse/classify/destination logic as the
//! live pipeline over every file currently present, with no stability
//! wait and no mover. Useful for answering "what would happen right now"
//! before starting a watch.

use std::{io, path::PathBuf};

use serde::{Deserialize, Serialize};
use signsort_core::{config::EngineConfig, metadata::FileMetadata};

use crate::decide::{ProcessingDecision, decide};

/// One file's would-be outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewEntry {
  pub path: PathBuf,
  #[serde(flatten)]
  pub decision: ProcessingDecision,
  pub metadata: Option<FileMetadata>,
}

impl PreviewEntry {
  pub fn would_process(&self) -> bool {
    matches!(self.decision, ProcessingDecision::Move { .. })
  }
}

/// Aggregate counts over a preview run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreviewSummary {
  pub total: usize,
  pub would_process: usize,
  pub would_skip: usize,
}

/// The full preview result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewReport {
  pub entries: Vec<PreviewEntry>,
  pub summary: PreviewSummary,
}

/// Evaluate every file currently in the workplace.
///
/// Non-PDF files appear in the report with a skip reason; directory
/// entries that are not files are ignored. Entries are sorted by path for
/// deterministic output.
pub fn preview(config: &EngineConfig) -> io::Result<PreviewReport> {
  let mut entries = Vec::new();

  for dirent in std::fs::read_dir(&config.workplace)? {
    let dirent = dirent?;
    if !dirent.file_type()?.is_file() {
      continue;
    }
    let path = dirent.path();
    let file_name = dirent.file_name().to_string_lossy().into_owned();
    let (decision, metadata) = decide(&file_name, config);
    entries.push(PreviewEntry {
      path,
      decision,
      metadata,
    });
  }

  entries.sort_by(|a, b| a.path.cmp(&b.path));

  let would_process = entries.iter().filter(|e| e.would_process()).count();
  let summary = PreviewSummary {
    total: entries.len(),
    would_process,
    would_skip: entries.len() - would_process,
  };

  Ok(PreviewReport { entries, summary })
}

#[cfg(test)]
mod tests {
  use super::*;
  use signsort_core::event::SkipReason;
  use tempfile::TempDir;

  #[test]
  fn test_preview_mixed_directory() {
    let workplace = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();

    for name in [
      "contract_StartupAlpha_2024-08-21_signed.pdf",
      "contract_StartupGamma_2024-08-20_draft.pdf",
      "invalid_filename.pdf",
      "notes.txt",
    ] {
      std::fs::write(workplace.path().join(name), b"content").unwrap();
    }
    std::fs::create_dir(workplace.path().join("subdir")).unwrap();

    let config = EngineConfig::new(workplace.path(), dest.path());
    let report = preview(&config).unwrap();

    assert_eq!(report.summary, PreviewSummary {
      total: 4,
      would_process: 1,
      would_skip: 3,
    });

    let by_name = |name: &str| {
      report
        .entries
        .iter()
        .find(|e| e.path.file_name().unwrap().to_str() == Some(name))
        .unwrap()
    };

    let signed = by_name("contract_StartupAlpha_2024-08-21_signed.pdf");
    assert_eq!(
      signed.decision,
      ProcessingDecision::Move {
        destination: dest
          .path()
          .join("contract")
          .join("StartupAlpha")
          .join("2024-08-21")
          .join("signed")
          .join("contract_StartupAlpha_2024-08-21_signed.pdf"),
      }
    );
    assert!(signed.metadata.is_some());

    assert_eq!(
      by_name("contract_StartupGamma_2024-08-20_draft.pdf").decision,
      ProcessingDecision::Skip {
        reason: SkipReason::NotSignedStatus
      }
    );
    assert_eq!(
      by_name("invalid_filename.pdf").decision,
      ProcessingDecision::Skip {
        reason: SkipReason::PatternMismatch
      }
    );
    assert_eq!(
      by_name("notes.txt").decision,
      ProcessingDecision::Skip {
        reason: SkipReason::NonPdf
      }
    );
  }

  #[test]
  fn test_preview_missing_workplace_errors() {
    let config = EngineConfig::new("/nonexistent/workplace", "/tmp/dest");
    assert!(preview(&config).is_err());
  }

  #[test]
  fn test_preview_serializes() {
    let workplace = TempDir::new().unwrap();
    std::fs::write(workplace.path().join("a_b_20240101_signed.pdf"), b"x").unwrap();

    let config = EngineConfig::new(workplace.path(), "/organized");
    let report = preview(&config).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["would_process"], 1);
    assert_eq!(json["entries"][0]["decision"], "move");
  }
}
