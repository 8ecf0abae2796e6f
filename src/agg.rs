//! Running per-group aggregation over a numeric entry field.

use crate::entry::Entry;
use crate::error::StatsError;
use crate::item::Item;

/// Folds one entry into a group's running metric.
///
/// Called by [`Item::update`](crate::item::Item::update) after the count
/// increment, so `item.count` already includes the entry being folded in
/// while `item.agg_value` still holds the previous value.
pub trait Aggregator {
  fn aggregate(&self, item: &Item, entry: &Entry) -> Result<f64, StatsError>;
}

/// Incremental arithmetic mean of a numeric field.
pub struct Mean {
  field: String,
}

impl Mean {
  pub fn new(field: impl Into<String>) -> Self {
    Self {
      field: field.into(),
    }
  }
}

impl Aggregator for Mean {
  fn aggregate(&self, item: &Item, entry: &Entry) -> Result<f64, StatsError> {
    let value = parse_field(&self.field, entry)?;
    if item.count <= 1 {
      Ok(value)
    } else {
      Ok((item.agg_value * (item.count - 1) as f64 + value) / item.count as f64)
    }
  }
}

/// Running sum of a numeric field.
pub struct Sum {
  field: String,
}

impl Sum {
  pub fn new(field: impl Into<String>) -> Self {
    Self {
      field: field.into(),
    }
  }
}

impl Aggregator for Sum {
  fn aggregate(&self, item: &Item, entry: &Entry) -> Result<f64, StatsError> {
    Ok(item.agg_value + parse_field(&self.field, entry)?)
  }
}

fn parse_field(field: &str, entry: &Entry) -> Result<f64, StatsError> {
  let raw = entry.field(field)?;
  raw
    .parse()
    .map_err(|_| StatsError::aggregation(field, format!("'{}' is not a number", raw)))
}
