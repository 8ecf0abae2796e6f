//! A parsed log record: field name to value mapping.

use std::collections::HashMap;

use crate::error::StatsError;

/// One structured log record. Built by the log format parser (or by hand),
/// read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
  fields: HashMap<String, String>,
}

impl Entry {
  pub fn new(fields: HashMap<String, String>) -> Self {
    Self { fields }
  }

  /// Field value, if present.
  pub fn get(&self, name: &str) -> Option<&str> {
    self.fields.get(name).map(String::as_str)
  }

  /// Field value, or a `MissingField` error naming the absent field.
  pub fn field(&self, name: &str) -> Result<&str, StatsError> {
    self.get(name).ok_or_else(|| StatsError::missing_field(name))
  }

  /// All (name, value) pairs, in arbitrary order.
  pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
    self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }
}

impl FromIterator<(String, String)> for Entry {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self {
      fields: iter.into_iter().collect(),
    }
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
  fn get_returns_present_field() {
    let e = entry(&[("request", "GET /foo/bar"), ("status", "200")]);
    assert_eq!(e.get("request"), Some("GET /foo/bar"));
    assert_eq!(e.get("host"), None);
    assert_eq!(e.len(), 2);
  }

  #[test]
  fn field_errors_on_absent_name() {
    let e = entry(&[("request", "GET /foo/bar")]);
    let err = e.field("status").unwrap_err();
    assert!(matches!(err, StatsError::MissingField { .. }));
    assert!(err.to_string().contains("status"));
  }

  #[test]
  fn empty_entry_has_no_fields() {
    let e = Entry::default();
    assert!(e.is_empty());
    assert_eq!(e.fields().count(), 0);
  }
}
