//! The collection run: query every source once, record into the timeline.
//!
//! A source that fails to answer is logged and skipped — the run always
//! completes, and the unaffected metrics still get their samples. Only a
//! defect in the timeline itself (an invalid or conflicting path) aborts.

use almanac_core::{MetricPath, MetricValue, ObservationOpts, TimelineDocument};

use crate::{
  Result,
  config::SourcesConfig,
  github::GithubClient,
  opencitations::{DepositStatus, summarize_contributions},
  wikidata::{QUERY_PACING, SparqlClient},
};

const SOURCE_WIKIDATA: &str = "wikidata";
const SOURCE_OPENCITATIONS: &str = "opencitations";

/// Tally of one collection run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionOutcome {
  /// Observations appended because the value changed (or was new).
  pub appended: usize,
  /// Observations suppressed because the value was unchanged.
  pub unchanged: usize,
  /// Metrics skipped because their source failed to answer.
  pub failed: usize,
}

impl CollectionOutcome {
  fn tally(&mut self, appended: bool) {
    if appended {
      self.appended += 1;
    } else {
      self.unchanged += 1;
    }
  }
}

/// Query all configured sources and record one observation per metric.
pub async fn collect_all(
  doc: &mut TimelineDocument,
  cfg: &SourcesConfig,
  sparql: &SparqlClient,
  github: &GithubClient,
) -> Result<CollectionOutcome> {
  let mut outcome = CollectionOutcome::default();

  collect_wikidata_globals(doc, sparql, &mut outcome).await?;
  collect_journals(doc, cfg, sparql, &mut outcome).await?;
  collect_opencitations(doc, cfg, github, &mut outcome).await?;

  tracing::info!(
    appended = outcome.appended,
    unchanged = outcome.unchanged,
    failed = outcome.failed,
    "collection run finished"
  );
  Ok(outcome)
}

async fn collect_wikidata_globals(
  doc: &mut TimelineDocument,
  sparql: &SparqlClient,
  outcome: &mut CollectionOutcome,
) -> Result<()> {
  match sparql.count_scholarly_articles().await {
    Ok(count) => {
      let appended = doc.record_observation(
        &MetricPath::parse("wikidata.scholarly_articles_total")?,
        count.into(),
        SOURCE_WIKIDATA,
        ObservationOpts {
          name: Some("Scholarly articles".to_owned()),
          description: Some("Items that are an instance of scholarly article".to_owned()),
          notes: None,
        },
      )?;
      outcome.tally(appended);
    }
    Err(e) => {
      tracing::warn!(error = %e, "scholarly article count failed");
      outcome.failed += 1;
    }
  }

  match sparql.count_p1343_scholarly_articles().await {
    Ok(count) => {
      let appended = doc.record_observation(
        &MetricPath::parse("wikidata.p1343_scholarly_count")?,
        count.into(),
        SOURCE_WIKIDATA,
        ObservationOpts {
          name: Some("Scholarly articles with P1343".to_owned()),
          description: Some(
            "Scholarly articles carrying a described-by-source statement".to_owned(),
          ),
          notes: None,
        },
      )?;
      outcome.tally(appended);
    }
    Err(e) => {
      tracing::warn!(error = %e, "P1343 count failed");
      outcome.failed += 1;
    }
  }

  match sparql.count_citations_p2860().await {
    Ok(count) => {
      let appended = doc.record_observation(
        &MetricPath::parse("wikidata.citations_p2860_total")?,
        count.into(),
        SOURCE_WIKIDATA,
        ObservationOpts {
          name: Some("Citation statements (P2860)".to_owned()),
          description: Some("Total cites-work relationships in the graph".to_owned()),
          notes: None,
        },
      )?;
      outcome.tally(appended);
    }
    Err(e) => {
      tracing::warn!(error = %e, "P2860 count failed");
      outcome.failed += 1;
    }
  }

  Ok(())
}

async fn collect_journals(
  doc: &mut TimelineDocument,
  cfg: &SourcesConfig,
  sparql: &SparqlClient,
  outcome: &mut CollectionOutcome,
) -> Result<()> {
  for journal in cfg.journals_with_qid() {
    let Some(qid) = journal.wikidata_qid.as_deref() else { continue };

    match sparql.count_journal_articles(qid).await {
      Ok(count) => {
        let appended = doc.record_journal_observation(
          qid,
          "articles",
          count.into(),
          Some(&journal.name),
          Some(&journal.partner),
        )?;
        outcome.tally(appended);
      }
      Err(e) => {
        tracing::warn!(journal = %journal.name, error = %e, "article count failed");
        outcome.failed += 1;
      }
    }

    match sparql.count_journal_citations(qid).await {
      Ok(count) => {
        let appended = doc.record_journal_observation(
          qid,
          "citations_p2860",
          count.into(),
          Some(&journal.name),
          Some(&journal.partner),
        )?;
        outcome.tally(appended);
      }
      Err(e) => {
        tracing::warn!(journal = %journal.name, error = %e, "citation count failed");
        outcome.failed += 1;
      }
    }

    tokio::time::sleep(QUERY_PACING).await;
  }

  Ok(())
}

async fn collect_opencitations(
  doc: &mut TimelineDocument,
  cfg: &SourcesConfig,
  github: &GithubClient,
  outcome: &mut CollectionOutcome,
) -> Result<()> {
  let issues = match github.all_issues(&cfg.opencitations_repo).await {
    Ok(issues) => issues,
    Err(e) => {
      tracing::warn!(repo = %cfg.opencitations_repo, error = %e, "issue fetch failed");
      outcome.failed += 1;
      return Ok(());
    }
  };

  let ours = crate::opencitations::filter_contributions(&issues, &cfg.contributors);
  let summary = summarize_contributions(ours);

  let appended = doc.record_observation(
    &MetricPath::parse("opencitations.deposit_issues_total")?,
    MetricValue::from(summary.total_issues as u64),
    SOURCE_OPENCITATIONS,
    ObservationOpts {
      name: Some("Deposit issues by contributors".to_owned()),
      description: Some("Crowdsourcing issues opened by configured handles".to_owned()),
      notes: None,
    },
  )?;
  outcome.tally(appended);

  // Record every status, zeroes included, so each series stays contiguous.
  for status in [
    DepositStatus::Done,
    DepositStatus::ToBeProcessed,
    DepositStatus::Invalid,
    DepositStatus::Rejected,
    DepositStatus::Unknown,
  ] {
    let appended = doc.record_observation(
      &MetricPath::parse(&format!("opencitations.status.{status}"))?,
      MetricValue::from(summary.count_for(status) as u64),
      SOURCE_OPENCITATIONS,
      ObservationOpts::default(),
    )?;
    outcome.tally(appended);
  }

  Ok(())
}
