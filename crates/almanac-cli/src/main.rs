//! `almanac` — collect and report partner journal metrics over time.
//!
//! # Usage
//!
//! ```
//! almanac collect
//! almanac report
//! almanac series wikidata.journals.Q50814880.articles
//! almanac discover
//! ```
//!
//! Reads `almanac.toml` (or the path given with `--config`) for endpoints,
//! contributor handles, and the partner journal registry; the timeline
//! itself lives in a single JSON document next to it.

mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use almanac_sources::SourcesConfig;
use almanac_store_json::{IncompatiblePolicy, JsonFileStore};

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "almanac", version, about = "Journal metrics timeline reporter")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "almanac.toml")]
  config: PathBuf,

  /// Path of the persisted timeline document.
  #[arg(short, long, env = "ALMANAC_TIMELINE", default_value = "almanac_timeline.json")]
  timeline: PathBuf,

  /// Fail instead of starting fresh when the stored timeline has an
  /// incompatible format.
  #[arg(long)]
  strict_version: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Query all sources and record changed values into the timeline.
  Collect,
  /// Print the latest value of every metric.
  Report {
    /// Emit JSON instead of aligned text.
    #[arg(long)]
    json: bool,
  },
  /// Print the full history of one metric.
  Series {
    /// Dotted metric path, e.g. `wikidata.p1343_scholarly_count`.
    path: String,
  },
  /// Print the most recent value of one metric.
  Latest {
    path: String,
  },
  /// Find Wikidata QIDs for registry journals that lack one.
  Discover,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let policy = if cli.strict_version {
    IncompatiblePolicy::Fail
  } else {
    IncompatiblePolicy::StartFresh
  };
  let store = JsonFileStore::with_policy(&cli.timeline, policy);

  match cli.command {
    Command::Collect => {
      let cfg = load_config(&cli.config)?;
      commands::collect(&store, &cfg).await
    }
    Command::Report { json } => commands::report(&store, json),
    Command::Series { path } => commands::series(&store, &path),
    Command::Latest { path } => commands::latest(&store, &path),
    Command::Discover => {
      let cfg = load_config(&cli.config)?;
      commands::discover(&cfg).await
    }
  }
}

/// Load configuration: the TOML file (optional) overlaid with
/// `ALMANAC_`-prefixed environment variables.
fn load_config(path: &PathBuf) -> anyhow::Result<SourcesConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path.clone()).required(false))
    .add_source(config::Environment::with_prefix("ALMANAC"))
    .build()
    .context("failed to read config")?;

  settings
    .try_deserialize()
    .context("failed to deserialise source configuration")
}
