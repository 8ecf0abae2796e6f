//! Structured error types for the stats engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
  /// A grouping or aggregation field is absent from the entry.
  #[error("field '{field}' is missing from the entry")]
  MissingField { field: String },

  /// The group-by pattern did not match the field value at all.
  #[error("'{field}' value '{value}' does not match pattern '{pattern}'")]
  RegexpMismatch {
    field: String,
    value: String,
    pattern: String,
  },

  /// The aggregate field could not be folded into the running metric.
  #[error("aggregate field '{field}': {reason}")]
  Aggregation { field: String, reason: String },

  /// A log line did not match the configured format.
  #[error("line does not match the log format: {0}")]
  UnmatchedLine(String),

  /// Malformed format string or nginx config extraction failure.
  #[error("log format: {0}")]
  Format(String),

  /// Invalid regular expression in the configuration.
  #[error("pattern: {0}")]
  Pattern(#[from] regex::Error),

  /// An input source could not be opened.
  #[error("source '{path}': {source}")]
  Source {
    path: String,
    source: std::io::Error,
  },

  #[error("io: {0}")]
  Io(#[from] std::io::Error),

  #[error("json: {0}")]
  Json(#[from] serde_json::Error),
}

impl StatsError {
  pub fn missing_field(field: impl Into<String>) -> Self {
    Self::MissingField {
      field: field.into(),
    }
  }

  pub fn regexp_mismatch(field: &str, value: &str, pattern: &str) -> Self {
    Self::RegexpMismatch {
      field: field.to_string(),
      value: value.to_string(),
      pattern: pattern.to_string(),
    }
  }

  pub fn aggregation(field: &str, reason: impl Into<String>) -> Self {
    Self::Aggregation {
      field: field.to_string(),
      reason: reason.into(),
    }
  }

  pub fn format(msg: impl Into<String>) -> Self {
    Self::Format(msg.into())
  }

  pub fn source(path: impl Into<String>, source: std::io::Error) -> Self {
    Self::Source {
      path: path.into(),
      source,
    }
  }

  /// Per-record failures the caller may log and skip. Everything else is
  /// fatal for the run.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      Self::MissingField { .. }
        | Self::RegexpMismatch { .. }
        | Self::Aggregation { .. }
        | Self::UnmatchedLine(_)
    )
  }
}
