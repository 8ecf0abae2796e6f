//! Report output: ranked plain-text table and JSON export.

use std::io::{self, Write};

use crate::error::StatsError;
use crate::stat::Stat;

/// Write the items as a table, one group per line, in their current
/// (ranked) order. With an aggregate configured the columns are
/// `agg_value count name`; counting-only runs drop the aggregate column.
pub fn render<W: Write>(stat: &Stat, out: &mut W) -> io::Result<()> {
  for item in stat.items() {
    if stat.has_aggregator() {
      writeln!(out, "{:7.3} {:6} {}", item.agg_value, item.count, item.name)?;
    } else {
      writeln!(out, "{:6} {}", item.count, item.name)?;
    }
  }
  Ok(())
}

/// Serialize the items (current order) as a pretty-printed JSON array.
pub fn write_json<W: Write>(stat: &Stat, out: W) -> Result<(), StatsError> {
  serde_json::to_writer_pretty(out, stat.items())?;
  Ok(())
}
