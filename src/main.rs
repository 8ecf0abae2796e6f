//! Binary entrypoint: parse access logs, group, aggregate, rank, report.
//!
//! Sources are processed strictly in sequence into one collection.
//! Per-record failures (missing field, pattern mismatch, unparsable
//! aggregate value, unmatched line) are logged and skipped; failing to open
//! or read a source aborts the run with no partial report.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use tracing::{debug, enabled, error, info, warn, Level};

use log_stats::{report, Config, LogFormat, Reader, Stat, StatsError};

/// Group access log entries, aggregate a metric per group, rank the groups.
#[derive(Parser, Debug)]
#[command(name = "log-stats", version, about)]
#[command(group(
  ArgGroup::new("logformat")
    .required(true)
    .args(["format", "nginx_format"])
))]
struct Cli {
  /// Log format (e.g. '$remote_addr [$time_local] "$request"')
  #[arg(long, value_name = "FORMAT")]
  format: Option<String>,

  /// Nginx config to look for a 'log_format' directive in
  #[arg(long, value_name = "FILE", requires = "nginx_format")]
  nginx: Option<PathBuf>,

  /// Name of the nginx 'log_format' to use; requires --nginx
  #[arg(long, value_name = "NAME", requires = "nginx")]
  nginx_format: Option<String>,

  /// Entry field to group by
  #[arg(short, long, value_name = "FIELD", default_value = "request")]
  group_by: String,

  /// Regexp extracting the grouping key from the group-by field, e.g.
  /// '^\w+\s+(\S+)' to group $request by path
  #[arg(short = 'r', long, value_name = "PATTERN")]
  regexp: Option<String>,

  /// Pattern whose matches are collapsed in the grouping key, e.g. '\d+'
  #[arg(long, value_name = "PATTERN")]
  generalize: Option<String>,

  /// Placeholder written over generalized key fragments
  #[arg(long, value_name = "STR", default_value = ":id")]
  generalize_replacement: String,

  /// Numeric field to aggregate as a running mean (e.g. request_time);
  /// counting-only when absent
  #[arg(short, long, value_name = "FIELD")]
  aggregate: Option<String>,

  /// Save the ranked report as a JSON encoded file
  #[arg(short = 'o', long, value_name = "FILE")]
  json: Option<PathBuf>,

  /// Log debug information (per-record field dump)
  #[arg(long)]
  debug: bool,

  /// Access log files; reads stdin when empty
  #[arg(value_name = "ACCESS_LOG")]
  files: Vec<PathBuf>,
}

fn main() {
  let cli = Cli::parse();

  let log_level = if cli.debug { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(log_level)
    .with_target(false)
    .with_writer(io::stderr)
    .init();

  if let Err(e) = run(&cli) {
    error!("{}", e);
    std::process::exit(1);
  }
}

fn run(cli: &Cli) -> Result<(), StatsError> {
  let format = resolve_format(cli)?;
  debug!("using log format '{}'", format.as_str());

  let config = Config {
    group_by_field: cli.group_by.clone(),
    group_by_pattern: cli.regexp.clone(),
    generalize_pattern: cli.generalize.clone(),
    generalize_replacement: cli.generalize_replacement.clone(),
    aggregate_field: cli.aggregate.clone(),
  };
  let mut stat = Stat::from_config(&config)?;

  if cli.files.is_empty() {
    info!("reading from stdin");
    process(&mut stat, &format, io::stdin().lock(), "stdin")?;
  } else {
    for path in &cli.files {
      let name = path.display().to_string();
      info!("parsing {}", name);
      let file = File::open(path).map_err(|e| StatsError::source(name.clone(), e))?;
      process(&mut stat, &format, BufReader::new(file), &name)?;
    }
  }

  let elapsed = stat.stop();
  println!("Parsed {} entries in {:.2?}", stat.entries_parsed, elapsed);

  stat.rank();
  let stdout = io::stdout();
  let mut out = stdout.lock();
  report::render(&stat, &mut out)?;
  out.flush()?;

  if let Some(path) = &cli.json {
    let name = path.display().to_string();
    let file = File::create(path).map_err(|e| StatsError::source(name.clone(), e))?;
    report::write_json(&stat, file)?;
    println!("Report saved to '{}'", name);
  }

  Ok(())
}

/// Feed every entry of one source into the collection. Recoverable
/// per-record failures are logged and skipped.
fn process<R: BufRead>(
  stat: &mut Stat,
  format: &LogFormat,
  input: R,
  source: &str,
) -> Result<(), StatsError> {
  stat.add_log(source);
  for entry in Reader::new(format, input) {
    match entry {
      Ok(entry) => {
        if enabled!(Level::DEBUG) {
          for (name, value) in entry.fields() {
            debug!("{}: ${} = '{}'", source, name, value);
          }
        }
        if let Err(e) = stat.add(&entry) {
          if !e.is_recoverable() {
            return Err(e);
          }
          warn!("skipping entry: {}", e);
        }
      }
      Err(e) if e.is_recoverable() => warn!("skipping line: {}", e),
      Err(e) => return Err(e),
    }
  }
  Ok(())
}

fn resolve_format(cli: &Cli) -> Result<LogFormat, StatsError> {
  if let Some(format) = &cli.format {
    return LogFormat::new(format);
  }
  match (&cli.nginx, &cli.nginx_format) {
    (Some(conf), Some(name)) => {
      let file = File::open(conf)
        .map_err(|e| StatsError::source(conf.display().to_string(), e))?;
      LogFormat::from_nginx_conf(BufReader::new(file), name)
    }
    // clap enforces the flag combinations; kept for direct callers.
    _ => Err(StatsError::format(
      "either --format or --nginx with --nginx-format is required",
    )),
  }
}
