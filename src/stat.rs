//! Run-level container: ordered item collection, name index, run metadata.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::agg::Aggregator;
use crate::config::Config;
use crate::entry::Entry;
use crate::error::StatsError;
use crate::group::GroupBy;
use crate::item::Item;

/// Collects per-group items for one processing run.
///
/// Items live in `data` in first-seen order until [`Stat::rank`] reorders
/// them. `index` maps each item name to its current position and is kept
/// consistent across insertion and reordering, so [`Stat::get`] stays O(1)
/// at every point of the run.
pub struct Stat {
  /// Wall-clock time the run started.
  pub started_at: DateTime<Utc>,
  /// Frozen by [`Stat::stop`]; zero until then.
  pub elapsed: Duration,
  /// Identifiers of the processed sources, in processing order.
  pub logs: Vec<String>,
  /// Number of `add` calls that completed without error.
  pub entries_parsed: u64,

  pub(crate) data: Vec<Item>,
  pub(crate) index: HashMap<String, usize>,
  pub(crate) agg: Option<Box<dyn Aggregator>>,
  group_by: Box<dyn GroupBy>,
  clock: Instant,
}

impl Stat {
  /// New collector with an explicit extractor and optional aggregator.
  pub fn new(group_by: Box<dyn GroupBy>, agg: Option<Box<dyn Aggregator>>) -> Self {
    Self {
      started_at: Utc::now(),
      elapsed: Duration::ZERO,
      logs: Vec::new(),
      entries_parsed: 0,
      data: Vec::new(),
      index: HashMap::new(),
      agg,
      group_by,
      clock: Instant::now(),
    }
  }

  /// Build the extractor chain and aggregator described by `config`.
  pub fn from_config(config: &Config) -> Result<Self, StatsError> {
    Ok(Self::new(config.group_by()?, config.aggregator()))
  }

  /// Fold one entry into the collection.
  ///
  /// Key extraction failures leave the collection untouched. For a new key
  /// the item is indexed only if its first update succeeds; a failed first
  /// update discards the item. `entries_parsed` advances only when the
  /// whole call succeeds.
  pub fn add(&mut self, entry: &Entry) -> Result<(), StatsError> {
    let key = self.group_by.extract(entry)?;

    let agg = self.agg.as_deref();
    if let Some(&id) = self.index.get(&key) {
      self.data[id].update(entry, agg)?;
    } else {
      let mut item = Item::new(key.clone());
      item.update(entry, agg)?;
      self.data.push(item);
      self.index.insert(key, self.data.len() - 1);
    }

    self.entries_parsed += 1;
    Ok(())
  }

  /// The item for `name`, if any entry was successfully added under it.
  pub fn get(&self, name: &str) -> Option<&Item> {
    self.index.get(name).map(|&id| &self.data[id])
  }

  /// Record a processed source identifier. Pure bookkeeping; does not
  /// affect counts or ranking.
  pub fn add_log(&mut self, source: impl Into<String>) {
    self.logs.push(source.into());
  }

  /// Freeze the elapsed time and return it. Recomputes on every call, so a
  /// later call yields a larger value; adds stay legal afterwards.
  pub fn stop(&mut self) -> Duration {
    self.elapsed = self.clock.elapsed();
    self.elapsed
  }

  /// Items in their current order: insertion order until ranked.
  pub fn items(&self) -> &[Item] {
    &self.data
  }

  pub fn len(&self) -> usize {
    self.data.len()
  }

  pub fn is_empty(&self) -> bool {
    self.data.is_empty()
  }

  /// Whether a running aggregate is configured. Selects the ranking metric
  /// and the report layout.
  pub fn has_aggregator(&self) -> bool {
    self.agg.is_some()
  }
}
