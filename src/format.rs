//! Log format compilation: nginx-style format strings into line parsers.

use std::collections::HashMap;
use std::io::BufRead;

use regex::Regex;

use crate::entry::Entry;
use crate::error::StatsError;

/// A compiled log format.
///
/// Format strings name fields with `$var` placeholders, e.g.
/// `$remote_addr [$time_local] "$request"`. Each variable matches the run
/// of characters up to the first character of the literal that follows it;
/// a trailing variable takes the rest of the line.
#[derive(Debug, Clone)]
pub struct LogFormat {
  raw: String,
  fields: Vec<String>,
  re: Regex,
}

enum Token {
  Var(String),
  Literal(String),
}

impl LogFormat {
  /// Compile a format string. Fails on malformed patterns, e.g. the same
  /// variable named twice.
  pub fn new(format: &str) -> Result<Self, StatsError> {
    let tokens = tokenize(format);
    let mut fields = Vec::new();
    let mut pattern = String::from("^");

    for (i, token) in tokens.iter().enumerate() {
      match token {
        Token::Literal(text) => pattern.push_str(&regex::escape(text)),
        Token::Var(name) => {
          fields.push(name.clone());
          let delimiter = tokens.get(i + 1).and_then(|next| match next {
            Token::Literal(text) => text.chars().next(),
            Token::Var(_) => None,
          });
          match delimiter {
            Some(c) => pattern.push_str(&format!(
              "(?P<{}>[^{}]*)",
              name,
              regex::escape(&c.to_string())
            )),
            None => pattern.push_str(&format!("(?P<{}>.*)", name)),
          }
        }
      }
    }
    pattern.push('$');

    Ok(Self {
      raw: format.to_string(),
      fields,
      re: Regex::new(&pattern)?,
    })
  }

  /// Pull a named `log_format` directive out of an nginx config and compile
  /// it. Definitions may span lines; quoted chunks are concatenated up to
  /// the terminating `;`.
  pub fn from_nginx_conf<R: BufRead>(conf: R, name: &str) -> Result<Self, StatsError> {
    let mut format = String::new();
    let mut found = false;

    for line in conf.lines() {
      let line = line?;
      let rest = if found {
        line
      } else {
        match definition_tail(&line, name) {
          Some(tail) => {
            found = true;
            tail.to_string()
          }
          None => continue,
        }
      };
      if collect_chunks(&rest, &mut format) {
        break;
      }
    }

    if !found {
      return Err(StatsError::format(format!(
        "log_format '{}' not found in nginx config",
        name
      )));
    }
    Self::new(&format)
  }

  /// The format string this parser was compiled from.
  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// Field names in the order they appear in the format.
  pub fn fields(&self) -> &[String] {
    &self.fields
  }

  /// Parse one log line into an entry. A line the format does not match is
  /// a recoverable per-record error.
  pub fn parse(&self, line: &str) -> Result<Entry, StatsError> {
    let caps = self
      .re
      .captures(line)
      .ok_or_else(|| StatsError::UnmatchedLine(line.to_string()))?;

    let mut fields = HashMap::with_capacity(self.fields.len());
    for name in &self.fields {
      if let Some(m) = caps.name(name) {
        fields.insert(name.clone(), m.as_str().to_string());
      }
    }
    Ok(Entry::new(fields))
  }
}

/// Split a format string into `$var` and literal runs. A `$` not followed
/// by a valid variable name stays literal.
fn tokenize(format: &str) -> Vec<Token> {
  let mut tokens = Vec::new();
  let mut literal = String::new();
  let mut chars = format.chars().peekable();

  while let Some(c) = chars.next() {
    if c != '$' {
      literal.push(c);
      continue;
    }
    match chars.peek() {
      Some(&first) if first.is_ascii_lowercase() || first == '_' => {}
      _ => {
        literal.push('$');
        continue;
      }
    }
    let mut name = String::new();
    while let Some(&next) = chars.peek() {
      if next.is_ascii_lowercase() || next.is_ascii_digit() || next == '_' {
        name.push(next);
        chars.next();
      } else {
        break;
      }
    }
    if !literal.is_empty() {
      tokens.push(Token::Literal(std::mem::take(&mut literal)));
    }
    tokens.push(Token::Var(name));
  }

  if !literal.is_empty() {
    tokens.push(Token::Literal(literal));
  }
  tokens
}

/// The tail of a `log_format <name>` directive line, when `line` starts the
/// definition for the wanted name.
fn definition_tail<'a>(line: &'a str, name: &str) -> Option<&'a str> {
  let rest = line.trim_start().strip_prefix("log_format")?;
  let after_ws = rest.trim_start();
  // Require whitespace between the directive and the name.
  if after_ws.len() == rest.len() {
    return None;
  }
  let tail = after_ws.strip_prefix(name)?;
  match tail.chars().next() {
    None => Some(tail),
    Some(c) if c.is_whitespace() || c == '\'' || c == '"' || c == ';' => Some(tail),
    Some(_) => None,
  }
}

/// Append the quoted (or bare) chunks found in `text` to `format`. Returns
/// true once the terminating `;` is seen. Parameters such as `escape=json`
/// are skipped.
fn collect_chunks(text: &str, format: &mut String) -> bool {
  let mut chars = text.chars();
  while let Some(c) = chars.next() {
    match c {
      ';' => return true,
      '\'' | '"' => {
        for inner in chars.by_ref() {
          if inner == c {
            break;
          }
          format.push(inner);
        }
      }
      c if c.is_whitespace() => {}
      _ => {
        let mut token = String::new();
        token.push(c);
        let mut terminated = false;
        for inner in chars.by_ref() {
          if inner == ';' {
            terminated = true;
            break;
          }
          if inner.is_whitespace() {
            break;
          }
          token.push(inner);
        }
        if !token.starts_with("escape=") {
          format.push_str(&token);
        }
        if terminated {
          return true;
        }
      }
    }
  }
  false
}
