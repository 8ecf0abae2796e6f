//! Streaming reader: raw log lines in, parsed entries out.

use std::io::{BufRead, Lines};

use crate::entry::Entry;
use crate::error::StatsError;
use crate::format::LogFormat;

/// Iterates a source line by line, parsing each into an [`Entry`] with a
/// borrowed [`LogFormat`]. Blank lines are skipped; a line the format does
/// not match yields a recoverable error, an I/O failure a fatal one.
pub struct Reader<'a, R> {
  format: &'a LogFormat,
  lines: Lines<R>,
}

impl<'a, R: BufRead> Reader<'a, R> {
  pub fn new(format: &'a LogFormat, input: R) -> Self {
    Self {
      format,
      lines: input.lines(),
    }
  }
}

impl<R: BufRead> Iterator for Reader<'_, R> {
  type Item = Result<Entry, StatsError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      match self.lines.next()? {
        Err(e) => return Some(Err(e.into())),
        Ok(line) => {
          let line = line.trim_end_matches('\r');
          if line.trim().is_empty() {
            continue;
          }
          return Some(self.format.parse(line));
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn yields_entries_and_skips_blank_lines() {
    let format = LogFormat::new("$verb $path").unwrap();
    let input = "GET /a\n\nGET /b\r\n   \nPOST /c";
    let entries: Vec<Entry> = Reader::new(&format, input.as_bytes())
      .collect::<Result<_, _>>()
      .unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].get("path"), Some("/a"));
    assert_eq!(entries[1].get("path"), Some("/b"));
    assert_eq!(entries[2].get("verb"), Some("POST"));
  }

  #[test]
  fn unmatched_lines_surface_per_record() {
    let format = LogFormat::new("\"$request\"").unwrap();
    let input = "\"GET /a\"\ngarbage\n\"GET /b\"\n";
    let results: Vec<_> = Reader::new(&format, input.as_bytes()).collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].as_ref().unwrap_err().is_recoverable());
    assert!(results[2].is_ok());
  }

  #[test]
  fn empty_input_yields_nothing() {
    let format = LogFormat::new("$verb $path").unwrap();
    assert_eq!(Reader::new(&format, "".as_bytes()).count(), 0);
  }
}
