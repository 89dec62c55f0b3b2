//! Destination path resolution.
//!
//! Layout is bit-exact:
//! `root/<norm document>/<norm client>/<norm date>/<norm status>/<original filename>`.

use std::{
  path::{Path, PathBuf},
  time::{SystemTime, UNIX_EPOCH},
};

use signsort_core::metadata::FileMetadata;
use thiserror::Error;

use crate::normalize::normalize_segment;

/// Destination resolution failure.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// Both the computed path and its timestamp-suffixed sibling already
  /// exist. Surfaced distinctly from move errors so operators can resolve
  /// naming conflicts.
  #[error("destination collision: {0} exists even after timestamp suffix")]
  Collision(PathBuf),
}

/// The metadata-derived directory for a file, without the filename.
pub fn destination_dir(metadata: &FileMetadata, destination_root: &Path) -> PathBuf {
  destination_root
    .join(normalize_segment(&metadata.document))
    .join(normalize_segment(&metadata.client))
    .join(normalize_segment(&metadata.date))
    .join(normalize_segment(&metadata.status))
}

/// Compute the full destination path, de-colliding against existing files.
///
/// If the computed path already exists, one attempt is made with the
/// current Unix timestamp appended before the extension. A second
/// collision (sub-second double processing of identically named files)
/// fails rather than looping.
pub fn resolve_destination(
  metadata: &FileMetadata,
  destination_root: &Path,
  file_name: &str,
) -> Result<PathBuf, ResolveError> {
  let dir = destination_dir(metadata, destination_root);
  let candidate = dir.join(file_name);
  if !candidate.exists() {
    return Ok(candidate);
  }

  let suffixed = dir.join(timestamp_suffixed(file_name, unix_now_secs()));
  if suffixed.exists() {
    return Err(ResolveError::Collision(suffixed));
  }
  Ok(suffixed)
}

fn unix_now_secs() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_secs())
    .unwrap_or(0)
}

/// Insert `_<timestamp>` before the file extension.
fn timestamp_suffixed(file_name: &str, timestamp: u64) -> String {
  match file_name.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{timestamp}.{ext}"),
    _ => format!("{file_name}_{timestamp}"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn meta() -> FileMetadata {
    FileMetadata {
      document: "contract".into(),
      client: "StartupAlpha".into(),
      date: "2024-08-21".into(),
      date_canonical: "20240821".into(),
      status: "signed".into(),
    }
  }

  #[test]
  fn test_layout() {
    let temp = TempDir::new().unwrap();
    let name = "contract_StartupAlpha_2024-08-21_signed.pdf";

    let dest = resolve_destination(&meta(), temp.path(), name).unwrap();
    assert_eq!(
      dest,
      temp
        .path()
        .join("contract")
        .join("StartupAlpha")
        .join("2024-08-21")
        .join("signed")
        .join(name)
    );
  }

  #[test]
  fn test_segments_are_normalized() {
    let temp = TempDir::new().unwrap();
    let metadata = FileMetadata {
      document: "Master Agreement".into(),
      client: "Acme/Corp".into(),
      date: "20240815".into(),
      date_canonical: "20240815".into(),
      status: "fully executed".into(),
    };

    let dest = resolve_destination(&metadata, temp.path(), "x_y_20240815_z.pdf").unwrap();
    assert_eq!(
      dest,
      temp
        .path()
        .join("Master_Agreement")
        .join("AcmeCorp")
        .join("20240815")
        .join("fully_executed")
        .join("x_y_20240815_z.pdf")
    );
  }

  #[test]
  fn test_no_suffix_under_empty_tree() {
    let temp = TempDir::new().unwrap();
    let dest = resolve_destination(&meta(), temp.path(), "a_b_20240821_signed.pdf").unwrap();
    assert!(dest.to_string_lossy().ends_with("a_b_20240821_signed.pdf"));
    assert!(!dest.exists());
  }

  #[test]
  fn test_collision_gets_timestamp_suffix() {
    let temp = TempDir::new().unwrap();
    let name = "a_b_20240821_signed.pdf";

    let first = resolve_destination(&meta(), temp.path(), name).unwrap();
    std::fs::create_dir_all(first.parent().unwrap()).unwrap();
    std::fs::write(&first, b"already moved").unwrap();

    let second = resolve_destination(&meta(), temp.path(), name).unwrap();
    assert_ne!(second, first);
    assert!(!second.exists());

    let stem = second.file_name().unwrap().to_string_lossy().to_string();
    assert!(stem.starts_with("a_b_20240821_signed_"));
    assert!(stem.ends_with(".pdf"));
  }

  #[test]
  fn test_double_collision_fails() {
    let temp = TempDir::new().unwrap();
    let name = "a_b_20240821_signed.pdf";

    let first = resolve_destination(&meta(), temp.path(), name).unwrap();
    std::fs::create_dir_all(first.parent().unwrap()).unwrap();
    std::fs::write(&first, b"one").unwrap();

    // Pre-create suffixed siblings for this second and the next, so the
    // test cannot flake across a second boundary.
    let dir = first.parent().unwrap();
    let now = unix_now_secs();
    std::fs::write(dir.join(timestamp_suffixed(name, now)), b"two").unwrap();
    std::fs::write(dir.join(timestamp_suffixed(name, now + 1)), b"three").unwrap();

    assert!(matches!(
      resolve_destination(&meta(), temp.path(), name),
      Err(ResolveError::Collision(_))
    ));
  }

  #[test]
  fn test_timestamp_suffix_shapes() {
    assert_eq!(timestamp_suffixed("doc.pdf", 1724198400), "doc_1724198400.pdf");
    assert_eq!(timestamp_suffixed("no-extension", 5), "no-extension_5");
  }
}
