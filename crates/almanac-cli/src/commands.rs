//! Subcommand implementations.

use anyhow::Context as _;

use almanac_core::{MetricPath, TimelineStorage as _};
use almanac_sources::{DiscoveryMethod, GithubClient, SourcesConfig, SparqlClient, collect_all};
use almanac_store_json::JsonFileStore;

/// `almanac collect` — one full collection run, then save.
pub async fn collect(store: &JsonFileStore, cfg: &SourcesConfig) -> anyhow::Result<()> {
  let sparql = SparqlClient::new(&cfg.wikidata_endpoint, &cfg.user_agent)
    .context("building SPARQL client")?;
  let github = GithubClient::new(&cfg.github_api_base, &cfg.user_agent, cfg.github_token.clone())
    .context("building GitHub client")?;

  let mut doc = store.load().context("loading timeline")?;
  let outcome = collect_all(&mut doc, cfg, &sparql, &github)
    .await
    .context("collection run failed")?;
  store.save(&mut doc).context("saving timeline")?;

  println!(
    "{} appended, {} unchanged, {} failed → {}",
    outcome.appended,
    outcome.unchanged,
    outcome.failed,
    store.path().display()
  );
  Ok(())
}

/// `almanac report` — the flattened latest-value view.
pub fn report(store: &JsonFileStore, json: bool) -> anyhow::Result<()> {
  let doc = store.load().context("loading timeline")?;
  let latest = doc.latest_metrics();

  if json {
    println!("{}", serde_json::to_string_pretty(&latest)?);
    return Ok(());
  }

  if latest.is_empty() {
    println!("no observations recorded yet");
    return Ok(());
  }

  let width = latest.keys().map(String::len).max().unwrap_or(0);
  for (path, metric) in &latest {
    println!(
      "{path:<width$}  {:>12}  {}  {}",
      metric.value.to_string(),
      metric.timestamp,
      metric.name
    );
  }
  Ok(())
}

/// `almanac series <path>` — full history of one metric.
pub fn series(store: &JsonFileStore, raw_path: &str) -> anyhow::Result<()> {
  let path = MetricPath::parse(raw_path).context("invalid metric path")?;
  let doc = store.load().context("loading timeline")?;

  let series = doc.series(&path);
  if series.is_empty() {
    println!("no observations at {path}");
    return Ok(());
  }

  for obs in series {
    println!("{}  {}", obs.t, obs.v);
  }
  Ok(())
}

/// `almanac latest <path>` — most recent value of one metric.
pub fn latest(store: &JsonFileStore, raw_path: &str) -> anyhow::Result<()> {
  let path = MetricPath::parse(raw_path).context("invalid metric path")?;
  let doc = store.load().context("loading timeline")?;

  match doc.latest_value(&path) {
    Some(value) => println!("{value}"),
    None => println!("absent"),
  }
  Ok(())
}

/// `almanac discover` — QID discovery for journals missing one.
pub async fn discover(cfg: &SourcesConfig) -> anyhow::Result<()> {
  let candidates: Vec<_> = cfg.journals_without_qid().collect();
  if candidates.is_empty() {
    println!("every registry journal already has a QID");
    return Ok(());
  }

  let sparql = SparqlClient::new(&cfg.wikidata_endpoint, &cfg.user_agent)
    .context("building SPARQL client")?;
  let discoveries = sparql.discover_journals(candidates).await;

  for d in discoveries {
    match (&d.qid, d.method) {
      (Some(qid), Some(method)) => {
        let how = match method {
          DiscoveryMethod::Issn => "issn",
          DiscoveryMethod::NameSearch => "name search",
        };
        let label = d.label.as_deref().unwrap_or("?");
        println!("{:<45}  {qid}  via {how}  ({label})", d.name);
      }
      _ => println!("{:<45}  not found", d.name),
    }
  }
  Ok(())
}
