//! `bomcheck`: aggregate saved BoM compliance and impacted-substances
//! responses.
//!
//! Reads indicator definitions from `bomcheck.toml` (or the path specified
//! with `--config`), builds a query result from one or more saved response
//! documents and prints the requested pivot.
//!
//! # Usage
//!
//! ```
//! bomcheck --pivot by-legislation response.json
//! bomcheck --pivot by-indicator --format text batch-1.json batch-2.json
//! ```

mod report;
mod settings;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bomcheck_results::{
  QueryResult, ResponseKind, ResultFactory, response::ResponseDocument,
};
use clap::Parser;
use report::{Pivot, Report};
use settings::{OutputFormat, Settings};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
  name = "bomcheck",
  version,
  about = "Aggregate BoM compliance and impacted-substances results"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "bomcheck.toml")]
  config: PathBuf,

  /// Which view of the result to print.
  #[arg(short, long, value_enum, default_value_t = Pivot::Items)]
  pivot: Pivot,

  /// Output format; overrides the configured one.
  #[arg(short, long, value_enum)]
  format: Option<OutputFormat>,

  /// Expected response kind, e.g. `PartCompliance`. Required to accept a
  /// response with an empty item list.
  #[arg(long)]
  kind: Option<ResponseKind>,

  /// Saved response documents (JSON). Several documents are combined as
  /// batches of one query and must all be of the same kind.
  #[arg(required = true, value_name = "RESPONSE")]
  responses: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout only carries the report.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)?;
  let indicators = settings
    .indicator_set()
    .context("invalid indicator definitions")?;
  let factory = ResultFactory::new(&indicators);

  let mut combined: Option<QueryResult> = None;
  for path in &cli.responses {
    let result = load_result(&factory, path, cli.kind)?;
    info!(path = %path.display(), %result, "loaded response");
    combined = Some(match combined {
      Some(previous) => previous
        .combine(result)
        .with_context(|| format!("cannot combine {}", path.display()))?,
      None => result,
    });
  }
  let result = combined.context("no response documents given")?;

  let report = Report::new(&result, cli.pivot)?;
  let output = match cli.format.unwrap_or(settings.format) {
    OutputFormat::Json => {
      report.to_json().context("failed to serialise report")?
    }
    OutputFormat::Text => report.to_text(),
  };
  println!("{}", output.trim_end());

  Ok(())
}

/// Read one response document and build its query result.
fn load_result(
  factory: &ResultFactory<'_>,
  path: &Path,
  kind: Option<ResponseKind>,
) -> anyhow::Result<QueryResult> {
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let document: ResponseDocument = serde_json::from_str(&raw)
    .with_context(|| format!("failed to parse {}", path.display()))?;

  let result = match kind {
    Some(kind) => {
      factory.create_as(kind, document.response, document.log_messages)
    }
    None => factory.create_from_document(document),
  };
  result.with_context(|| {
    format!("failed to build result from {}", path.display())
  })
}
