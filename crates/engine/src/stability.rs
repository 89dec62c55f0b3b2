//! File-size stability detection.
//!
//! "Stable" is a proxy for "write complete": the file's size is nonzero
//! and unchanged across two consecutive samples. The wait occupies a
//! single task and only suspends on the sampling sleep.

use std::{path::Path, time::Duration};

use tokio::time::Instant;
use tracing::trace;

/// Outcome of a stability wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stability {
  /// Two consecutive size samples matched.
  Stable,
  /// The timeout elapsed without the size settling. Reported as a failure
  /// for the file; it stays in place and may be retried on a later event.
  TimedOut,
  /// The file disappeared mid-check (renamed or deleted elsewhere).
  /// A non-fatal skip, not an error.
  Vanished,
}

/// Block (one task, sleep-based) until `path` stops changing size.
///
/// Samples the file size every `interval` until two consecutive samples
/// match, the `timeout` elapses, or the file vanishes. Transient metadata
/// errors other than not-found reset the comparison window; a file being
/// copied may be briefly inaccessible.
pub async fn wait_for_stability(path: &Path, timeout: Duration, interval: Duration) -> Stability {
  let deadline = Instant::now() + timeout;
  let mut last_size: Option<u64> = None;

  loop {
    match tokio::fs::metadata(path).await {
      Ok(meta) => {
        let size = meta.len();
        if size > 0 && last_size == Some(size) {
          return Stability::Stable;
        }
        trace!(path = %path.display(), size, "Size sample");
        last_size = Some(size);
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        return Stability::Vanished;
      }
      Err(e) => {
        trace!(path = %path.display(), error = %e, "File temporarily inaccessible");
        last_size = None;
      }
    }

    let now = Instant::now();
    if now >= deadline {
      return Stability::TimedOut;
    }
    tokio::time::sleep(interval.min(deadline - now)).await;
  }
}
