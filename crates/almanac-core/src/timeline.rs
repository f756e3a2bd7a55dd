//! The timeline document — a hierarchical, append-only tree of metric series.
//!
//! Observations are never mutated or removed once written; the only field
//! that changes after the fact is the document's `last_updated` stamp, set at
//! save time. A recording call appends to a leaf's series only when the
//! observed value differs from the last stored sample, so re-running a
//! collection against unchanged sources leaves the document unchanged.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, MetricPath, MetricValue, Result};

/// Format discriminator for persisted documents. A stored document whose
/// `metadata.version` differs (or that lacks the `metadata`/`metrics` pair)
/// is not interpreted further.
pub const FORMAT_VERSION: &str = "2.0";

const DOCUMENT_DESCRIPTION: &str = "Partner journal evaluation metrics timeline";
const WIKIDATA_GROUP_DESCRIPTION: &str = "Wikidata scholarly graph metrics";
const JOURNALS_GROUP_DESCRIPTION: &str = "Partner journal statistics from Wikidata";
const OPENCITATIONS_GROUP_DESCRIPTION: &str = "OpenCitations crowdsourcing metrics";

/// The current instant as an ISO-8601 UTC string with microsecond precision
/// and a `Z` suffix — the only timestamp format the document ever stores.
pub fn timestamp_now() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ─── Leaf ────────────────────────────────────────────────────────────────────

/// One timestamped sample of a metric's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
  pub t: String,
  pub v: MetricValue,
}

/// A leaf node: one scalar metric's full history, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
  /// Human-readable label; flattened views fall back to the leaf's key.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub unit: Option<String>,
  pub series: Vec<Observation>,
}

impl MetricSeries {
  fn with_opts(opts: ObservationOpts) -> Self {
    Self {
      name: opts.name,
      description: opts.description,
      notes: opts.notes,
      unit: Some("count".to_owned()),
      series: Vec::new(),
    }
  }

  /// Bare leaf as created under a journal entry: no unit, no label.
  fn bare() -> Self {
    Self { name: None, description: None, notes: None, unit: None, series: Vec::new() }
  }

  /// Append `{t: now, v: value}` unless `value` equals the last sample.
  /// Returns whether an observation was written.
  fn append_if_changed(&mut self, value: MetricValue) -> bool {
    if let Some(last) = self.series.last()
      && last.v == value
    {
      return false;
    }
    self.series.push(Observation { t: timestamp_now(), v: value });
    true
  }
}

// ─── Tree ────────────────────────────────────────────────────────────────────

/// An interior node. Descriptive attributes live beside the child map; a
/// journal entry is an interior node whose `name`/`partner` are set on first
/// touch and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricGroup {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub partner: Option<String>,
  #[serde(flatten)]
  pub children: BTreeMap<String, MetricNode>,
}

impl MetricGroup {
  fn with_description(description: &str) -> Self {
    Self { description: Some(description.to_owned()), ..Self::default() }
  }
}

/// A node is a leaf exactly when it carries a `series` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricNode {
  Series(MetricSeries),
  Group(MetricGroup),
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
  pub created: String,
  /// Stamped on every save; `null` until the document is first persisted.
  pub last_updated: Option<String>,
  pub version: String,
  pub description: String,
}

/// Descriptive attributes applied only when a recording call creates a new
/// leaf; ignored on every subsequent call for the same path.
#[derive(Debug, Clone, Default)]
pub struct ObservationOpts {
  pub name: Option<String>,
  pub description: Option<String>,
  pub notes: Option<String>,
}

/// The flattened latest-value view of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestMetric {
  pub value: MetricValue,
  pub timestamp: String,
  pub name: String,
}

/// The root persisted object: metadata plus the metric tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
  pub metadata: Metadata,
  pub metrics: BTreeMap<String, MetricNode>,
}

impl TimelineDocument {
  /// A fresh document with the two top-level source groups pre-seeded.
  pub fn empty() -> Self {
    let mut wikidata = MetricGroup::with_description(WIKIDATA_GROUP_DESCRIPTION);
    wikidata.children.insert(
      "journals".to_owned(),
      MetricNode::Group(MetricGroup::with_description(JOURNALS_GROUP_DESCRIPTION)),
    );

    let mut metrics = BTreeMap::new();
    metrics.insert("wikidata".to_owned(), MetricNode::Group(wikidata));
    metrics.insert(
      "opencitations".to_owned(),
      MetricNode::Group(MetricGroup::with_description(OPENCITATIONS_GROUP_DESCRIPTION)),
    );

    Self {
      metadata: Metadata {
        created: timestamp_now(),
        last_updated: None,
        version: FORMAT_VERSION.to_owned(),
        description: DOCUMENT_DESCRIPTION.to_owned(),
      },
      metrics,
    }
  }

  // ── Recording ─────────────────────────────────────────────────────────

  /// Record one observation at `path`, creating any missing interior groups
  /// and (on first touch) the series leaf itself.
  ///
  /// Returns `Ok(true)` if an observation was appended, `Ok(false)` if the
  /// value matched the last stored sample and the document is unchanged.
  /// `source` is a provenance tag for the log; it is not persisted.
  pub fn record_observation(
    &mut self,
    path: &MetricPath,
    value: MetricValue,
    source: &str,
    opts: ObservationOpts,
  ) -> Result<bool> {
    let children = descend_mut(&mut self.metrics, path)?;

    let leaf = children
      .entry(path.leaf().to_owned())
      .or_insert_with(|| MetricNode::Series(MetricSeries::with_opts(opts)));
    let series = match leaf {
      MetricNode::Series(s) => s,
      MetricNode::Group(_) => return Err(Error::PathConflict(path.to_string())),
    };

    let appended = series.append_if_changed(value);
    tracing::debug!(%path, source, appended, "recorded observation");
    Ok(appended)
  }

  /// Record an observation for a partner journal under
  /// `wikidata.journals.<qid>.<metric>`.
  ///
  /// On the first touch of `qid` the entry is created and `journal_name` /
  /// `partner` are stored; once present they are never overwritten.
  pub fn record_journal_observation(
    &mut self,
    qid: &str,
    metric: &str,
    value: MetricValue,
    journal_name: Option<&str>,
    partner: Option<&str>,
  ) -> Result<bool> {
    let path = MetricPath::from_segments(["wikidata", "journals", qid, metric])?;

    let wikidata = group_entry(&mut self.metrics, "wikidata", WIKIDATA_GROUP_DESCRIPTION)
      .ok_or_else(|| Error::PathConflict(path.to_string()))?;
    let journals = group_entry(&mut wikidata.children, "journals", JOURNALS_GROUP_DESCRIPTION)
      .ok_or_else(|| Error::PathConflict(path.to_string()))?;

    let journal = match journals
      .children
      .entry(qid.to_owned())
      .or_insert_with(|| MetricNode::Group(MetricGroup::default()))
    {
      MetricNode::Group(g) => g,
      MetricNode::Series(_) => return Err(Error::PathConflict(path.to_string())),
    };

    // First writer wins; later calls never rename a journal.
    if journal.name.is_none()
      && let Some(n) = journal_name
    {
      journal.name = Some(n.to_owned());
    }
    if journal.partner.is_none()
      && let Some(p) = partner
    {
      journal.partner = Some(p.to_owned());
    }

    let series = match journal
      .children
      .entry(metric.to_owned())
      .or_insert_with(|| MetricNode::Series(MetricSeries::bare()))
    {
      MetricNode::Series(s) => s,
      MetricNode::Group(_) => return Err(Error::PathConflict(path.to_string())),
    };

    let appended = series.append_if_changed(value);
    tracing::debug!(%path, appended, "recorded journal observation");
    Ok(appended)
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  /// The full chronological history at `path`; empty if the path does not
  /// resolve to a series leaf.
  pub fn series(&self, path: &MetricPath) -> &[Observation] {
    let mut children = &self.metrics;
    for segment in path.parents() {
      match children.get(segment) {
        Some(MetricNode::Group(g)) => children = &g.children,
        _ => return &[],
      }
    }
    match children.get(path.leaf()) {
      Some(MetricNode::Series(s)) => &s.series,
      _ => &[],
    }
  }

  /// The most recent value at `path`, if any observation exists.
  pub fn latest_value(&self, path: &MetricPath) -> Option<&MetricValue> {
    self.series(path).last().map(|obs| &obs.v)
  }

  /// The latest value of every metric, keyed by full dotted path.
  ///
  /// Exactly the leaves with a non-empty series appear; leaves that were
  /// created but never observed, and bare interior groups, emit nothing.
  pub fn latest_metrics(&self) -> BTreeMap<String, LatestMetric> {
    let mut out = BTreeMap::new();
    collect_latest(&self.metrics, "", &mut out);
    out
  }
}

/// Walk `path.parents()` from the root, creating empty groups for missing
/// segments, and return the child map the leaf key lives in.
fn descend_mut<'a>(
  root: &'a mut BTreeMap<String, MetricNode>,
  path: &MetricPath,
) -> Result<&'a mut BTreeMap<String, MetricNode>> {
  let mut children = root;
  for segment in path.parents() {
    let node = children
      .entry(segment.clone())
      .or_insert_with(|| MetricNode::Group(MetricGroup::default()));
    match node {
      MetricNode::Group(g) => children = &mut g.children,
      MetricNode::Series(_) => return Err(Error::PathConflict(path.to_string())),
    }
  }
  Ok(children)
}

/// Fetch `key` as a group, creating it with `description` if absent.
/// `None` if the key already holds a series leaf.
fn group_entry<'a>(
  children: &'a mut BTreeMap<String, MetricNode>,
  key: &str,
  description: &str,
) -> Option<&'a mut MetricGroup> {
  match children
    .entry(key.to_owned())
    .or_insert_with(|| MetricNode::Group(MetricGroup::with_description(description)))
  {
    MetricNode::Group(g) => Some(g),
    MetricNode::Series(_) => None,
  }
}

fn collect_latest(
  children: &BTreeMap<String, MetricNode>,
  prefix: &str,
  out: &mut BTreeMap<String, LatestMetric>,
) {
  for (key, node) in children {
    let path = if prefix.is_empty() { key.clone() } else { format!("{prefix}.{key}") };
    match node {
      MetricNode::Series(s) => {
        if let Some(last) = s.series.last() {
          out.insert(path, LatestMetric {
            value: last.v.clone(),
            timestamp: last.t.clone(),
            name: s.name.clone().unwrap_or_else(|| key.clone()),
          });
        }
      }
      MetricNode::Group(g) => collect_latest(&g.children, &path, out),
    }
  }
}
