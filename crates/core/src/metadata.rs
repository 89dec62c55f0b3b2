//! Structured metadata parsed from a filename.

use serde::{Deserialize, Serialize};

/// The four fields encoded in `<document>_<client>_<date>_<status>.pdf`.
///
/// A value of this type is only ever fully populated: the parser either
/// produces all four fields or fails, never a partial record. All fields
/// are non-empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
  /// Document form, e.g. `contract` or `NDA`.
  pub document: String,
  /// Client name; may itself contain underscores.
  pub client: String,
  /// Date segment exactly as written (`YYYYMMDD` or `YYYY-MM-DD`).
  pub date: String,
  /// Date with separators stripped (`YYYYMMDD`).
  pub date_canonical: String,
  /// Status segment exactly as written.
  pub status: String,
}
