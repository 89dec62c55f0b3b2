//! Filename parsing for `<document>_<client>_<date>_<status>.pdf`.
//!
//! The date segment is the pivot: it has a fixed, recognizable shape
//! (`YYYYMMDD` or `YYYY-MM-DD`), so it disambiguates the three name-like
//! segments even though client and status may themselves contain
//! underscores. The document segment ends at the first underscore, the
//! client is everything between that underscore and the date, and the
//! status is everything after the date up to the extension. When several
//! date-shaped segments appear, the leftmost usable one wins.
//!
//! Parsing is total: it yields a fully populated [`FileMetadata`] or a
//! [`ParseError`], never a partial record.

use signsort_core::metadata::FileMetadata;
use thiserror::Error;

/// Rejection of a filename that does not fit the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("filename does not match <document>_<client>_<date>_<status>.pdf")]
  PatternMismatch,
}

/// Parse a filename into its four metadata fields.
pub fn parse_filename(filename: &str) -> Result<FileMetadata, ParseError> {
  let stem = strip_pdf_extension(filename).ok_or(ParseError::PatternMismatch)?;
  let bytes = stem.as_bytes();

  // The document segment is the shortest nonempty prefix ending at an
  // underscore. A leading underscore belongs to the document itself.
  let doc_end = bytes
    .iter()
    .enumerate()
    .skip(1)
    .find(|&(_, &b)| b == b'_')
    .map(|(i, _)| i)
    .ok_or(ParseError::PatternMismatch)?;

  // Scan for the leftmost underscore-delimited date with a nonempty client
  // before it and a nonempty status after it.
  for date_start in (doc_end + 2)..bytes.len() {
    if bytes[date_start - 1] != b'_' {
      continue;
    }
    let Some(date_len) = date_shape(&bytes[date_start..]) else {
      continue;
    };
    let status_start = date_start + date_len + 1; // skip the '_' after the date
    if status_start >= bytes.len() {
      continue;
    }

    let date = &stem[date_start..date_start + date_len];
    return Ok(FileMetadata {
      document: stem[..doc_end].to_string(),
      client: stem[doc_end + 1..date_start - 1].to_string(),
      date: date.to_string(),
      date_canonical: date.replace('-', ""),
      status: stem[status_start..].to_string(),
    });
  }

  Err(ParseError::PatternMismatch)
}

/// Check whether the status segment marks the document as signed.
///
/// Matching is case-insensitive and substring-based, not whole-token: a
/// status is signed when it contains `signed` next to an underscore or any
/// configured keyword anywhere. The substring policy is deliberately
/// coarse; the one carve-out is `unsigned`, which never classifies as
/// signed unless the status also contains `_signed` (so
/// `countersigned-pending` matches but `unsigned_copy` does not).
pub fn is_signed(status: &str, keywords: &[String]) -> bool {
  let lower = status.to_lowercase();

  if lower.contains("_signed") {
    return true;
  }
  if lower.contains("unsigned") {
    return false;
  }
  if lower.contains("signed_") {
    return true;
  }
  keywords
    .iter()
    .filter(|k| !k.trim().is_empty())
    .any(|k| lower.contains(&k.to_lowercase()))
}

/// Strip a case-insensitive `.pdf` extension, or return None.
fn strip_pdf_extension(filename: &str) -> Option<&str> {
  let split = filename.len().checked_sub(4)?;
  // A multibyte character spanning the split point cannot be part of a
  // ".pdf" suffix
  if split == 0 || !filename.is_char_boundary(split) {
    return None;
  }
  let (stem, ext) = filename.split_at(split);
  ext.eq_ignore_ascii_case(".pdf").then_some(stem)
}

/// Length of a valid date at the start of `bytes`, if one is present and
/// followed by an underscore. Accepts `YYYYMMDD` (8) or `YYYY-MM-DD` (10);
/// mixed separators never match either shape.
fn date_shape(bytes: &[u8]) -> Option<usize> {
  let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);

  if bytes.len() > 8 && digits(0..8) && bytes[8] == b'_' {
    return Some(8);
  }
  if bytes.len() > 10 && digits(0..4) && bytes[4] == b'-' && digits(5..7) && bytes[7] == b'-' && digits(8..10) && bytes[10] == b'_' {
    return Some(10);
  }
  None
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(name: &str) -> FileMetadata {
    parse_filename(name).unwrap_or_else(|e| panic!("{name} should parse: {e}"))
  }

  #[test]
  fn test_valid_filenames() {
    let meta = parse("contract_ClientName_2024-01-15_signed.pdf");
    assert_eq!(meta.document, "contract");
    assert_eq!(meta.client, "ClientName");
    assert_eq!(meta.date, "2024-01-15");
    assert_eq!(meta.date_canonical, "20240115");
    assert_eq!(meta.status, "signed");

    let meta = parse("NDA_Startup_Inc_20240115_executed.pdf");
    assert_eq!(meta.document, "NDA");
    assert_eq!(meta.client, "Startup_Inc");
    assert_eq!(meta.date, "20240115");
    assert_eq!(meta.date_canonical, "20240115");
    assert_eq!(meta.status, "executed");

    let meta = parse("agreement_test_client_2024-12-31_final.pdf");
    assert_eq!(meta.document, "agreement");
    assert_eq!(meta.client, "test_client");
    assert_eq!(meta.status, "final");
  }

  #[test]
  fn test_status_may_contain_underscores() {
    let meta = parse("contract_Acme_20240101_fully_executed.pdf");
    assert_eq!(meta.status, "fully_executed");
  }

  #[test]
  fn test_extension_is_case_insensitive() {
    assert!(parse_filename("contract_Acme_20240101_signed.PDF").is_ok());
    assert!(parse_filename("contract_Acme_20240101_signed.Pdf").is_ok());
    assert_eq!(
      parse_filename("contract_Acme_20240101_signed.txt"),
      Err(ParseError::PatternMismatch)
    );
  }

  #[test]
  fn test_invalid_filenames() {
    let invalid = [
      "contract.pdf",
      "contract_client.pdf",
      "contract_client_2024.pdf",
      "contract_client_invalid_date_signed.pdf",
      "no_extension",
      "invalid_filename.pdf",
      // date present but no status after it
      "contract_client_20240101.pdf",
      // date present but no client before it
      "contract_20240101_signed.pdf",
      ".pdf",
    ];
    for name in invalid {
      assert_eq!(parse_filename(name), Err(ParseError::PatternMismatch), "{name}");
    }
  }

  #[test]
  fn test_multibyte_names_rejected_not_panicked() {
    // The 4-byte extension split can land inside a multibyte character;
    // such names must come back as mismatches
    for name in ["a™bc", "é™x", "契約書", "contract™", "™™.pdf"] {
      assert_eq!(parse_filename(name), Err(ParseError::PatternMismatch), "{name}");
    }
  }

  #[test]
  fn test_mixed_date_separators_rejected() {
    assert_eq!(
      parse_filename("contract_client_2024-0115_signed.pdf"),
      Err(ParseError::PatternMismatch)
    );
    assert_eq!(
      parse_filename("contract_client_202401-15_signed.pdf"),
      Err(ParseError::PatternMismatch)
    );
  }

  #[test]
  fn test_leftmost_date_wins() {
    // Two date-shaped segments: the first usable one is the pivot and the
    // second is absorbed into the status.
    let meta = parse("contract_Acme_20240101_backup_2024-02-02_signed.pdf");
    assert_eq!(meta.date, "20240101");
    assert_eq!(meta.status, "backup_2024-02-02_signed");
  }

  #[test]
  fn test_date_shaped_client_absorbed() {
    // The first date shape directly follows the document, so there is no
    // room for a client; it gets absorbed and the second date pivots.
    let meta = parse("a_20240101_b_20240102_signed.pdf");
    assert_eq!(meta.document, "a");
    assert_eq!(meta.client, "20240101_b");
    assert_eq!(meta.date, "20240102");
    assert_eq!(meta.status, "signed");
  }

  #[test]
  fn test_round_trips_fields_exactly() {
    let name = "Master_Service_Agreement_Globex_Corp_2024-06-30_counter_signed.pdf";
    let meta = parse(name);
    let rebuilt = format!("{}_{}_{}_{}.pdf", meta.document, meta.client, meta.date, meta.status);
    assert_eq!(rebuilt, name);
  }

  #[test]
  fn test_signed_statuses() {
    let keywords: Vec<String> = ["signed", "executed", "final"].iter().map(|s| s.to_string()).collect();

    for status in [
      "signed",
      "SIGNED",
      "Signed",
      "executed",
      "EXECUTED",
      "final",
      "FINAL",
      "contract_signed",
      "signed_copy",
      "fully_executed",
      "final_version",
      // substring policy: deliberately coarse
      "countersigned-pending",
    ] {
      assert!(is_signed(status, &keywords), "{status} should be signed");
    }

    for status in [
      "draft",
      "pending",
      "review",
      "unsigned",
      "UNSIGNED",
      "template",
      // the unsigned exclusion beats the trailing-underscore match
      "unsigned_copy",
      "unsigned_draft",
      "final_unsigned",
    ] {
      assert!(!is_signed(status, &keywords), "{status} should not be signed");
    }
  }

  #[test]
  fn test_underscore_adjacent_signed_matches_without_keywords() {
    let keywords: Vec<String> = vec!["executed".to_string()];
    assert!(is_signed("contract_signed", &keywords));
    assert!(is_signed("signed_copy", &keywords));
    assert!(!is_signed("signedcopy", &keywords));
  }

  #[test]
  fn test_custom_keywords() {
    let keywords = vec!["approved".to_string()];
    assert!(is_signed("approved", &keywords));
    assert!(is_signed("APPROVED_2024", &keywords));
    assert!(!is_signed("executed", &keywords));
    // blank keywords never match everything
    assert!(!is_signed("draft", &[String::new()]));
  }
}
