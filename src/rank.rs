//! Ranking: order items by the configured metric, keep the index honest.

use crate::stat::Stat;

impl Stat {
  /// Sort items descending by aggregate value (when an aggregator is
  /// configured) or by count, then rebuild the name index in one linear
  /// pass so [`Stat::get`] stays correct for every key.
  ///
  /// Ties keep no particular order. Meant to run once, after all input has
  /// been consumed; adding more entries afterwards is legal and keeps the
  /// index consistent, the order is simply no longer sorted.
  pub fn rank(&mut self) {
    if self.agg.is_some() {
      self.data.sort_by(|a, b| b.agg_value.total_cmp(&a.agg_value));
    } else {
      self.data.sort_by(|a, b| b.count.cmp(&a.count));
    }
    self.index.clear();
    for (id, item) in self.data.iter().enumerate() {
      self.index.insert(item.name.clone(), id);
    }
  }
}
