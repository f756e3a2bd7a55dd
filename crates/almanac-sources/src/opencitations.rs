//! OpenCitations crowdsourcing metrics derived from deposit issues.
//!
//! Contributors deposit citation metadata by opening issues titled
//! `deposit {domain} {identifier}` on the crowdsourcing repository; the
//! triage labels on each issue track its processing state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use crate::github::Issue;

// ─── Deposit status ──────────────────────────────────────────────────────────

/// Processing state of a deposit, derived from issue labels.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DepositStatus {
  Done,
  ToBeProcessed,
  Invalid,
  Rejected,
  #[default]
  Unknown,
}

impl DepositStatus {
  /// Label precedence matches the triage workflow: a deposit marked `done`
  /// is done even if stale labels linger.
  fn from_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Self {
    let labels: Vec<&str> = labels.collect();
    if labels.contains(&"done") {
      Self::Done
    } else if labels.contains(&"to be processed") {
      Self::ToBeProcessed
    } else if labels.contains(&"invalid") {
      Self::Invalid
    } else if labels.contains(&"rejected") {
      Self::Rejected
    } else {
      Self::Unknown
    }
  }
}

// ─── Parsed deposits ─────────────────────────────────────────────────────────

/// One deposit issue with its title fields and status extracted.
#[derive(Debug, Clone, Serialize)]
pub struct DepositIssue {
  pub number: u64,
  pub title: String,
  pub state: String,
  pub labels: Vec<String>,
  pub creator: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
  pub closed_at: Option<DateTime<Utc>>,
  /// Second word of the title: the identifier's domain (e.g. `doi`).
  pub domain: Option<String>,
  /// Remainder of the title after the domain.
  pub identifier: Option<String>,
  pub status: DepositStatus,
  pub url: String,
}

/// Extract deposit metadata from a raw issue.
///
/// Titles look like `deposit {domain} {identifier}`; anything that does not
/// split that way simply leaves `domain`/`identifier` empty.
pub fn parse_deposit_issue(issue: &Issue) -> DepositIssue {
  let mut words = issue.title.splitn(3, ' ');
  let _verb = words.next();
  let domain = words.next().map(str::to_owned);
  let identifier = words.next().map(str::to_owned);

  DepositIssue {
    number: issue.number,
    title: issue.title.clone(),
    state: issue.state.clone(),
    labels: issue.label_names().map(str::to_owned).collect(),
    creator: issue.creator().map(str::to_owned),
    created_at: issue.created_at,
    closed_at: issue.closed_at,
    domain,
    identifier,
    status: DepositStatus::from_labels(issue.label_names()),
    url: issue.html_url.clone(),
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Aggregated view of a contributor group's deposits.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContributionSummary {
  pub total_issues: usize,
  pub status_breakdown: BTreeMap<DepositStatus, usize>,
  pub by_creator: BTreeMap<String, usize>,
  pub by_domain: BTreeMap<String, usize>,
  pub deposits: Vec<DepositIssue>,
}

impl ContributionSummary {
  pub fn count_for(&self, status: DepositStatus) -> usize {
    self.status_breakdown.get(&status).copied().unwrap_or(0)
  }
}

/// Issues created by one of the configured contributor handles.
pub fn filter_contributions<'a>(
  issues: &'a [Issue],
  contributors: &[String],
) -> Vec<&'a Issue> {
  issues
    .iter()
    .filter(|issue| {
      issue
        .creator()
        .is_some_and(|login| contributors.iter().any(|c| c == login))
    })
    .collect()
}

/// Summarise deposits, excluding pull requests (the issues endpoint lists
/// them too).
pub fn summarize_contributions<'a>(
  issues: impl IntoIterator<Item = &'a Issue>,
) -> ContributionSummary {
  let mut summary = ContributionSummary::default();

  for issue in issues {
    if issue.is_pull_request() {
      continue;
    }
    let deposit = parse_deposit_issue(issue);

    *summary.status_breakdown.entry(deposit.status).or_default() += 1;
    if let Some(creator) = &deposit.creator {
      *summary.by_creator.entry(creator.clone()).or_default() += 1;
    }
    if let Some(domain) = &deposit.domain {
      *summary.by_domain.entry(domain.clone()).or_default() += 1;
    }
    summary.deposits.push(deposit);
  }

  summary.total_issues = summary.deposits.len();
  summary
}
