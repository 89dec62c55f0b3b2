//! Filesystem-safe normalization of free-text path segments.

/// Normalize a metadata segment into a filesystem-safe path component.
///
/// Whitespace runs become a single underscore, characters outside
/// `[A-Za-z0-9_-]` are stripped, underscore runs collapse to one, and
/// leading/trailing underscores are trimmed. Idempotent: normalizing an
/// already-normalized string returns it unchanged.
pub fn normalize_segment(segment: &str) -> String {
  let mut out = String::with_capacity(segment.len());
  let mut prev_underscore = false;

  for ch in segment.chars() {
    let mapped = if ch.is_whitespace() {
      Some('_')
    } else if ch == '_' || ch == '-' || ch.is_ascii_alphanumeric() {
      Some(ch)
    } else {
      None
    };

    let Some(c) = mapped else { continue };
    if c == '_' {
      if prev_underscore {
        continue;
      }
      prev_underscore = true;
    } else {
      prev_underscore = false;
    }
    out.push(c);
  }

  out.trim_matches('_').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_basic_replacements() {
    assert_eq!(normalize_segment("Client Name"), "Client_Name");
    assert_eq!(normalize_segment("Company/LLC"), "CompanyLLC");
    assert_eq!(normalize_segment("Test<>Client"), "TestClient");
    assert_eq!(normalize_segment("  spaces  "), "spaces");
    assert_eq!(normalize_segment("Multi   Space   Name"), "Multi_Space_Name");
    assert_eq!(normalize_segment("file:name"), "filename");
    assert_eq!(normalize_segment("valid_name"), "valid_name");
  }

  #[test]
  fn test_dates_pass_through() {
    assert_eq!(normalize_segment("2024-08-21"), "2024-08-21");
    assert_eq!(normalize_segment("20240815"), "20240815");
  }

  #[test]
  fn test_underscore_runs_collapse() {
    assert_eq!(normalize_segment("a__b___c"), "a_b_c");
    assert_eq!(normalize_segment("a !b"), "a_b");
    assert_eq!(normalize_segment("__edge__"), "edge");
  }

  #[test]
  fn test_idempotence() {
    let samples = [
      "Client Name",
      "Company/LLC",
      "  spaces  ",
      "a__b___c",
      "2024-08-21",
      "Ünïcode Client™",
      "__x__ y__",
      "",
      "___",
    ];
    for s in samples {
      let once = normalize_segment(s);
      assert_eq!(normalize_segment(&once), once, "not idempotent for {s:?}");
    }
  }
}
