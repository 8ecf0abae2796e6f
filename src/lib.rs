//! Access log grouping and aggregation engine.
//!
//! Parses raw log lines into structured entries via an nginx-style format
//! string, derives a grouping key per entry (field value, regexp extraction,
//! pattern generalization), keeps per-group counts and a running aggregate,
//! and ranks the groups for reporting.
//!
//! No DB, no network; pure computation + in-memory state.

pub mod agg;
pub mod config;
pub mod entry;
pub mod error;
pub mod format;
pub mod group;
pub mod item;
mod rank;
pub mod reader;
pub mod report;
pub mod stat;

pub use agg::Aggregator;
pub use config::Config;
pub use entry::Entry;
pub use error::StatsError;
pub use format::LogFormat;
pub use group::GroupBy;
pub use item::Item;
pub use reader::Reader;
pub use stat::Stat;
