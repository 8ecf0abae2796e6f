//! Run configuration: one immutable value selects the grouping chain and
//! the aggregation mode for a whole run.

use crate::agg::{Aggregator, Mean};
use crate::error::StatsError;
use crate::group::{ByGeneralize, ByRegexp, ByValue, GroupBy};

/// Grouping and aggregation settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
  /// Entry field the grouping key is derived from.
  pub group_by_field: String,
  /// Pattern extracting the key from the field value; None (or empty)
  /// means the raw value is the key.
  pub group_by_pattern: Option<String>,
  /// Pattern whose matches are collapsed in the derived key.
  pub generalize_pattern: Option<String>,
  /// Placeholder written over generalized key fragments.
  pub generalize_replacement: String,
  /// Numeric field tracked as a running mean; None means counting-only.
  pub aggregate_field: Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      group_by_field: "request".to_string(),
      group_by_pattern: None,
      generalize_pattern: None,
      generalize_replacement: ":id".to_string(),
      aggregate_field: None,
    }
  }
}

impl Config {
  /// Build the configured extractor chain.
  pub fn group_by(&self) -> Result<Box<dyn GroupBy>, StatsError> {
    let base: Box<dyn GroupBy> = match self.group_by_pattern.as_deref() {
      Some(pattern) if !pattern.is_empty() => {
        Box::new(ByRegexp::new(&self.group_by_field, pattern)?)
      }
      _ => Box::new(ByValue::new(&self.group_by_field)),
    };
    match self.generalize_pattern.as_deref() {
      Some(pattern) if !pattern.is_empty() => Ok(Box::new(ByGeneralize::new(
        base,
        pattern,
        self.generalize_replacement.as_str(),
      )?)),
      _ => Ok(base),
    }
  }

  /// Build the configured aggregator, if any.
  pub fn aggregator(&self) -> Option<Box<dyn Aggregator>> {
    match self.aggregate_field.as_deref() {
      Some(field) if !field.is_empty() => Some(Box::new(Mean::new(field))),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entry::Entry;

  fn entry(pairs: &[(&str, &str)]) -> Entry {
    pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect()
  }

  #[test]
  fn default_groups_by_request_counting_only() {
    let config = Config::default();
    assert_eq!(config.group_by_field, "request");
    assert!(config.aggregator().is_none());

    let group = config.group_by().unwrap();
    let key = group.extract(&entry(&[("request", "GET /a")])).unwrap();
    assert_eq!(key, "GET /a");
  }

  #[test]
  fn empty_pattern_means_by_value() {
    let config = Config {
      group_by_pattern: Some(String::new()),
      ..Config::default()
    };
    let group = config.group_by().unwrap();
    let key = group.extract(&entry(&[("request", "GET /a")])).unwrap();
    assert_eq!(key, "GET /a");
  }

  #[test]
  fn pattern_and_generalize_compose() {
    let config = Config {
      group_by_pattern: Some(r"^\w+\s+(\S+)(?:\?|$)".to_string()),
      generalize_pattern: Some(r"\d+$".to_string()),
      ..Config::default()
    };
    let group = config.group_by().unwrap();
    let key = group.extract(&entry(&[("request", "GET /item/123")])).unwrap();
    assert_eq!(key, "/item/:id");
  }

  #[test]
  fn generalize_alone_wraps_the_raw_value() {
    let config = Config {
      generalize_pattern: Some(r"\d+".to_string()),
      generalize_replacement: "N".to_string(),
      ..Config::default()
    };
    let group = config.group_by().unwrap();
    let key = group.extract(&entry(&[("request", "GET /item/123")])).unwrap();
    assert_eq!(key, "GET /item/N");
  }

  #[test]
  fn aggregate_field_selects_the_running_mean() {
    let config = Config {
      aggregate_field: Some("request_time".to_string()),
      ..Config::default()
    };
    assert!(config.aggregator().is_some());

    let empty = Config {
      aggregate_field: Some(String::new()),
      ..Config::default()
    };
    assert!(empty.aggregator().is_none());
  }

  #[test]
  fn bad_generalize_pattern_errors() {
    let config = Config {
      generalize_pattern: Some("(broken".to_string()),
      ..Config::default()
    };
    assert!(config.group_by().is_err());
  }
}
