//! Safe relocation of a stabilized file to its resolved destination.
//!
//! On one volume the move is a single atomic rename. Across volumes it
//! falls back to copy-to-temp, rename temp into place, then delete the
//! source, so a crash mid-copy never loses the source file. Empty
//! destination directories may be left behind on failure; a half-written
//! destination file never is.

use std::{io, path::Path, path::PathBuf};

use tokio::fs;
use tracing::{debug, info, warn};

/// Move failure. In every case the source file is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
  #[error("source vanished before move: {0}")]
  SourceVanished(PathBuf),

  #[error("failed to create destination directory {path}: {source}")]
  CreateDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to move {from} to {to}: {source}")]
  Rename {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed cross-volume copy of {from} to {to}: {source}")]
  Copy {
    from: PathBuf,
    to: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Relocate `source` to `destination`, or only report it in dry-run mode.
///
/// Returns the destination path on success. Dry-run performs no
/// filesystem mutation at all.
pub async fn move_file(source: &Path, destination: &Path, dry_run: bool) -> Result<PathBuf, MoveError> {
  if dry_run {
    info!(from = %source.display(), to = %destination.display(), "[dry-run] would move");
    return Ok(destination.to_path_buf());
  }

  match fs::metadata(source).await {
    Ok(_) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {
      return Err(MoveError::SourceVanished(source.to_path_buf()));
    }
    Err(e) => {
      return Err(MoveError::Rename {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: e,
      });
    }
  }

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent).await.map_err(|e| MoveError::CreateDir {
      path: parent.to_path_buf(),
      source: e,
    })?;
  }

  match fs::rename(source, destination).await {
    Ok(()) => {
      info!(from = %source.display(), to = %destination.display(), "Moved");
      Ok(destination.to_path_buf())
    }
    Err(e) if is_cross_device(&e) => {
      debug!(from = %source.display(), "Rename crossed volumes, falling back to copy");
      copy_then_delete(source, destination).await
    }
    Err(e) => Err(MoveError::Rename {
      from: source.to_path_buf(),
      to: destination.to_path_buf(),
      source: e,
    }),
  }
}

/// Cross-volume fallback: copy to a temp file next to the destination,
/// publish it with a same-volume rename, and delete the source only after
/// the copy is confirmed complete.
async fn copy_then_delete(source: &Path, destination: &Path) -> Result<PathBuf, MoveError> {
  let tmp = part_path(destination);

  let copy_err = |e: io::Error| MoveError::Copy {
    from: source.to_path_buf(),
    to: destination.to_path_buf(),
    source: e,
  };

  if let Err(e) = fs::copy(source, &tmp).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(copy_err(e));
  }

  if let Err(e) = fs::rename(&tmp, destination).await {
    let _ = fs::remove_file(&tmp).await;
    return Err(copy_err(e));
  }

  if let Err(e) = fs::remove_file(source).await {
    // The destination is complete; losing only the source copy is the
    // safe direction. Report it but count the move as done.
    warn!(path = %source.display(), error = %e, "Moved across volumes but could not remove source");
  }

  info!(from = %source.display(), to = %destination.display(), "Moved (cross-volume copy)");
  Ok(destination.to_path_buf())
}

/// Sibling temp path for the in-progress cross-volume copy.
fn part_path(destination: &Path) -> PathBuf {
  let mut name = destination.file_name().unwrap_or_default().to_os_string();
  name.push(".part");
  destination.with_file_name(name)
}

fn is_cross_device(err: &io::Error) -> bool {
  #[cfg(unix)]
  {
    err.raw_os_error() == Some(libc::EXDEV)
  }
  #[cfg(windows)]
  {
    // ERROR_NOT_SAME_DEVICE
    err.raw_os_error() == Some(17)
  }
  #[cfg(not(any(unix, windows)))]
  {
    let _ = err;
    false
  }
}
