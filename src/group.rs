//! Grouping key extraction: which bucket an entry belongs to.

use regex::Regex;

use crate::entry::Entry;
use crate::error::StatsError;

/// Computes the grouping key for an entry. The extractor is chosen once per
/// run and applied to every entry.
pub trait GroupBy {
  fn extract(&self, entry: &Entry) -> Result<String, StatsError>;
}

/// Group by the raw value of a field.
pub struct ByValue {
  field: String,
}

impl ByValue {
  pub fn new(field: impl Into<String>) -> Self {
    Self {
      field: field.into(),
    }
  }
}

impl GroupBy for ByValue {
  fn extract(&self, entry: &Entry) -> Result<String, StatsError> {
    entry.field(&self.field).map(str::to_owned)
  }
}

/// Group by a pattern match over a field value.
///
/// With capturing groups the key is the text of the last group; without any,
/// the whole match. A value the pattern does not match at all is a
/// per-record error carrying the raw value for diagnostics.
pub struct ByRegexp {
  field: String,
  pattern: Regex,
}

impl ByRegexp {
  pub fn new(field: impl Into<String>, pattern: &str) -> Result<Self, StatsError> {
    Ok(Self {
      field: field.into(),
      pattern: Regex::new(pattern)?,
    })
  }
}

impl GroupBy for ByRegexp {
  fn extract(&self, entry: &Entry) -> Result<String, StatsError> {
    let value = entry.field(&self.field)?;
    let caps = self.pattern.captures(value).ok_or_else(|| {
      StatsError::regexp_mismatch(&self.field, value, self.pattern.as_str())
    })?;
    // Group 0 is the whole match, so the last index is the last capturing
    // group when the pattern has any, and the whole match when it has none.
    let last = caps.len() - 1;
    Ok(caps.get(last).map_or("", |m| m.as_str()).to_string())
  }
}

/// Wraps another extractor and collapses variable key fragments (numeric
/// path segments, UUIDs) into a fixed placeholder so equivalent keys merge.
pub struct ByGeneralize {
  inner: Box<dyn GroupBy>,
  pattern: Regex,
  replacement: String,
}

impl ByGeneralize {
  pub fn new(
    inner: Box<dyn GroupBy>,
    pattern: &str,
    replacement: impl Into<String>,
  ) -> Result<Self, StatsError> {
    Ok(Self {
      inner,
      pattern: Regex::new(pattern)?,
      replacement: replacement.into(),
    })
  }
}

impl GroupBy for ByGeneralize {
  fn extract(&self, entry: &Entry) -> Result<String, StatsError> {
    let key = self.inner.extract(entry)?;
    Ok(
      self
        .pattern
        .replace_all(&key, self.replacement.as_str())
        .into_owned(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(pairs: &[(&str, &str)]) -> Entry {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn by_value_returns_raw_field() {
    let group = ByValue::new("request");
    let e = entry(&[("request", "GET /foo/bar")]);
    assert_eq!(group.extract(&e).unwrap(), "GET /foo/bar");
  }

  #[test]
  fn by_value_errors_on_missing_field() {
    let group = ByValue::new("request");
    let e = entry(&[("host", "example.com")]);
    assert!(matches!(
      group.extract(&e),
      Err(StatsError::MissingField { .. })
    ));
  }

  #[test]
  fn by_regexp_takes_last_capturing_group() {
    let group = ByRegexp::new("request", r"^\w+\s+(\S+)(?:\?|$)").unwrap();
    let e = entry(&[("request", "GET /foo/bar")]);
    assert_eq!(group.extract(&e).unwrap(), "/foo/bar");
  }

  #[test]
  fn by_regexp_cuts_query_strings() {
    let group = ByRegexp::new("request", r"^\w+\s+([^?\s]+)").unwrap();
    let e = entry(&[("request", "GET /foo/bar?baz=1")]);
    assert_eq!(group.extract(&e).unwrap(), "/foo/bar");
  }

  #[test]
  fn by_regexp_without_groups_takes_whole_match() {
    let group = ByRegexp::new("request", r"^\w+").unwrap();
    let e = entry(&[("request", "GET /foo/bar")]);
    assert_eq!(group.extract(&e).unwrap(), "GET");
  }

  #[test]
  fn by_regexp_mismatch_carries_the_raw_value() {
    let group = ByRegexp::new("request", r"^(\d+)$").unwrap();
    let e = entry(&[("request", "GET /foo/bar")]);
    let err = group.extract(&e).unwrap_err();
    assert!(err.is_recoverable());
    assert!(err.to_string().contains("GET /foo/bar"));
  }

  #[test]
  fn by_regexp_propagates_missing_field() {
    let group = ByRegexp::new("request", r"^\w+").unwrap();
    let e = entry(&[("host", "example.com")]);
    assert!(matches!(
      group.extract(&e),
      Err(StatsError::MissingField { .. })
    ));
  }

  #[test]
  fn generalize_collapses_variable_suffix() {
    let group =
      ByGeneralize::new(Box::new(ByValue::new("request")), r"\d+$", ":id").unwrap();

    let e = entry(&[("request", "/foo/bar/123")]);
    assert_eq!(group.extract(&e).unwrap(), "/foo/bar/:id");

    let e = entry(&[("request", "/foo/bar/456")]);
    assert_eq!(group.extract(&e).unwrap(), "/foo/bar/:id");

    // No match leaves the key untouched.
    let e = entry(&[("request", "/foo/bar")]);
    assert_eq!(group.extract(&e).unwrap(), "/foo/bar");
  }

  #[test]
  fn generalize_replaces_every_occurrence() {
    let group =
      ByGeneralize::new(Box::new(ByValue::new("request")), r"\d+", ":id").unwrap();
    let e = entry(&[("request", "/users/42/posts/7")]);
    assert_eq!(group.extract(&e).unwrap(), "/users/:id/posts/:id");
  }

  #[test]
  fn generalize_propagates_inner_errors() {
    let inner = Box::new(ByRegexp::new("request", r"^(\d+)$").unwrap());
    let group = ByGeneralize::new(inner, r"\d+$", ":id").unwrap();
    let e = entry(&[("request", "GET /foo/bar")]);
    assert!(matches!(
      group.extract(&e),
      Err(StatsError::RegexpMismatch { .. })
    ));
  }

  #[test]
  fn invalid_pattern_is_rejected_at_construction() {
    assert!(ByRegexp::new("request", "(unclosed").is_err());
    assert!(
      ByGeneralize::new(Box::new(ByValue::new("request")), "(unclosed", ":id").is_err()
    );
  }
}
