//! Per-group accumulated state.

use serde::Serialize;

use crate::agg::Aggregator;
use crate::entry::Entry;
use crate::error::StatsError;

/// One group's accumulated state: occurrence count plus the current value
/// of the running aggregate (0.0 in counting-only mode).
#[derive(Debug, Clone, Serialize)]
pub struct Item {
  pub name: String,
  pub count: u64,
  pub agg_value: f64,
}

impl Item {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      count: 0,
      agg_value: 0.0,
    }
  }

  /// Fold one entry in. The count advances unconditionally, then the
  /// aggregator (when configured) recomputes the running value; an
  /// aggregator failure propagates with the count increment left in place.
  pub fn update(
    &mut self,
    entry: &Entry,
    agg: Option<&dyn Aggregator>,
  ) -> Result<(), StatsError> {
    self.count += 1;
    if let Some(agg) = agg {
      self.agg_value = agg.aggregate(self, entry)?;
    }
    Ok(())
  }
}
