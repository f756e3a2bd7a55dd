//! SPARQL client for the Wikidata Query Service.
//!
//! Wraps [`reqwest::Client`] with the endpoint, User-Agent, and result
//! format the query service expects, plus the bibliometric queries the
//! collector runs. Long counts over the scholarly graph (~37M articles) can
//! take a while, so each query carries its own timeout.

use std::{collections::BTreeMap, time::Duration};

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::{Error, Result, config::PartnerJournal};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Timeout for cheap, well-indexed queries.
const QUERY_TIMEOUT: Duration = Duration::from_secs(60);
/// Timeout for full-graph counts.
const LONG_QUERY_TIMEOUT: Duration = Duration::from_secs(120);

/// Pause between consecutive per-journal queries, to stay polite.
pub(crate) const QUERY_PACING: Duration = Duration::from_millis(500);

// ─── Wire types ──────────────────────────────────────────────────────────────

/// The SPARQL 1.1 JSON results format.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResponse {
  #[serde(default)]
  pub head: SparqlHead,
  pub results: SparqlResults,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparqlHead {
  #[serde(default)]
  pub vars: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SparqlResults {
  #[serde(default)]
  pub bindings: Vec<BTreeMap<String, SparqlCell>>,
}

/// One bound cell: a URI or literal with its lexical value.
#[derive(Debug, Clone, Deserialize)]
pub struct SparqlCell {
  #[serde(rename = "type")]
  pub kind: Option<String>,
  pub value: String,
  #[serde(default)]
  pub datatype: Option<String>,
}

impl SparqlResponse {
  /// The value bound to `var` in the first result row, if any.
  pub fn first_value(&self, var: &str) -> Option<&str> {
    self
      .results
      .bindings
      .first()
      .and_then(|row| row.get(var))
      .map(|cell| cell.value.as_str())
  }
}

/// A journal item found on Wikidata.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JournalMatch {
  pub qid: String,
  pub label: Option<String>,
  pub issn: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async SPARQL client for one endpoint.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SparqlClient {
  client: reqwest::Client,
  endpoint: String,
}

impl SparqlClient {
  pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(SPARQL_RESULTS_JSON));
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
      headers.insert(USER_AGENT, ua);
    }

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(LONG_QUERY_TIMEOUT)
      .build()?;
    Ok(Self { client, endpoint: endpoint.into() })
  }

  /// Run a SPARQL query and parse the JSON results.
  pub async fn query(&self, sparql: &str) -> Result<SparqlResponse> {
    self.query_with_timeout(sparql, QUERY_TIMEOUT).await
  }

  pub async fn query_with_timeout(
    &self,
    sparql: &str,
    timeout: Duration,
  ) -> Result<SparqlResponse> {
    let response = self
      .client
      .get(&self.endpoint)
      .query(&[("query", sparql), ("format", "json")])
      .timeout(timeout)
      .send()
      .await?
      .error_for_status()?;
    Ok(response.json().await?)
  }

  async fn count(&self, sparql: &str, timeout: Duration) -> Result<u64> {
    let response = self.query_with_timeout(sparql, timeout).await?;
    extract_count(&response)
  }

  // ── Graph-wide counts ─────────────────────────────────────────────────

  /// Total scholarly articles (`Q13442814`) in Wikidata. Heavy query.
  pub async fn count_scholarly_articles(&self) -> Result<u64> {
    let query = "SELECT (COUNT(?item) AS ?count) WHERE {\n  \
                   ?item wdt:P31 wd:Q13442814 .\n}";
    self.count(query, LONG_QUERY_TIMEOUT).await
  }

  /// Scholarly articles carrying `P1343` (described by source).
  pub async fn count_p1343_scholarly_articles(&self) -> Result<u64> {
    let query = "SELECT (COUNT(?item) AS ?count) WHERE {\n  \
                   ?item wdt:P31/wdt:P279* wd:Q13442814 .\n  \
                   ?item wdt:P1343 ?source .\n}";
    self.count(query, QUERY_TIMEOUT).await
  }

  /// Total `P2860` (cites work) relationships. Heavy query.
  pub async fn count_citations_p2860(&self) -> Result<u64> {
    let query = "SELECT (COUNT(?citation) AS ?count) WHERE {\n  \
                   ?item wdt:P2860 ?citation .\n}";
    self.count(query, LONG_QUERY_TIMEOUT).await
  }

  // ── Per-journal counts ────────────────────────────────────────────────

  /// Articles published in the journal (`P1433` published-in).
  pub async fn count_journal_articles(&self, qid: &str) -> Result<u64> {
    let query = format!(
      "SELECT (COUNT(?article) AS ?count) WHERE {{\n  \
         ?article wdt:P1433 wd:{qid} .\n}}"
    );
    self.count(&query, QUERY_TIMEOUT).await
  }

  /// Outgoing `P2860` citations from articles published in the journal.
  pub async fn count_journal_citations(&self, qid: &str) -> Result<u64> {
    let query = format!(
      "SELECT (COUNT(?citation) AS ?count) WHERE {{\n  \
         ?article wdt:P1433 wd:{qid} .\n  \
         ?article wdt:P2860 ?citation .\n}}"
    );
    self.count(&query, QUERY_TIMEOUT).await
  }

  // ── Journal lookup ────────────────────────────────────────────────────

  /// Look a journal up by its ISSN (`P236`). The most reliable route.
  pub async fn journal_by_issn(&self, issn: &str) -> Result<Option<JournalMatch>> {
    let query = format!(
      "SELECT ?item ?itemLabel WHERE {{\n  \
         ?item wdt:P236 \"{}\" .\n  \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\" . }}\n}}\n\
       LIMIT 1",
      escape_literal(issn)
    );
    let response = self.query(&query).await?;
    Ok(response.results.bindings.first().and_then(journal_match))
  }

  /// Case-insensitive substring search over academic-journal items
  /// (`Q737498` and subclasses). Returns up to 10 candidates.
  pub async fn search_journals(&self, name: &str) -> Result<Vec<JournalMatch>> {
    let query = format!(
      "SELECT ?item ?itemLabel ?issn WHERE {{\n  \
         ?item wdt:P31/wdt:P279* wd:Q737498 .\n  \
         ?item rdfs:label ?label .\n  \
         FILTER(CONTAINS(LCASE(?label), LCASE(\"{}\")))\n  \
         OPTIONAL {{ ?item wdt:P236 ?issn . }}\n  \
         SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"en\" . }}\n}}\n\
       LIMIT 10",
      escape_literal(name)
    );
    let response = self.query(&query).await?;
    Ok(response.results.bindings.iter().filter_map(journal_match).collect())
  }

  // ── Discovery ─────────────────────────────────────────────────────────

  /// Try to find a QID for each journal: ISSN lookup first, then a name
  /// search truncated at the first parenthesis. Per-journal failures are
  /// logged and reported as "not found"; the sweep always completes.
  pub async fn discover_journals<'a>(
    &self,
    journals: impl IntoIterator<Item = &'a PartnerJournal>,
  ) -> Vec<Discovery> {
    let mut results = Vec::new();

    for journal in journals {
      let mut found = Discovery {
        name: journal.name.clone(),
        issn: journal.issn.clone(),
        qid: None,
        label: None,
        method: None,
      };

      if let Some(issn) = &journal.issn {
        match self.journal_by_issn(issn).await {
          Ok(Some(m)) => {
            found.qid = Some(m.qid);
            found.label = m.label;
            found.method = Some(DiscoveryMethod::Issn);
          }
          Ok(None) => {}
          Err(e) => tracing::warn!(journal = %journal.name, error = %e, "ISSN lookup failed"),
        }
      }

      if found.qid.is_none() {
        let needle = journal.name.split('(').next().unwrap_or(&journal.name).trim();
        match self.search_journals(needle).await {
          Ok(matches) => {
            if let Some(m) = matches.into_iter().next() {
              found.qid = Some(m.qid);
              found.label = m.label;
              found.method = Some(DiscoveryMethod::NameSearch);
            }
          }
          Err(e) => tracing::warn!(journal = %journal.name, error = %e, "name search failed"),
        }
      }

      results.push(found);
      tokio::time::sleep(QUERY_PACING).await;
    }

    results
  }
}

/// How a journal's QID was found during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
  Issn,
  NameSearch,
}

/// Discovery outcome for one registry journal.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Discovery {
  pub name: String,
  pub issn: Option<String>,
  pub qid: Option<String>,
  pub label: Option<String>,
  pub method: Option<DiscoveryMethod>,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) fn extract_count(response: &SparqlResponse) -> Result<u64> {
  let raw = response.first_value("count").ok_or(Error::MalformedResponse {
    service: "wikidata",
    detail: "no `count` binding in result".to_owned(),
  })?;
  raw.parse().map_err(|_| Error::MalformedResponse {
    service: "wikidata",
    detail: format!("`count` is not an unsigned integer: {raw:?}"),
  })
}

/// Build a [`JournalMatch`] from one binding row; the QID is the final path
/// segment of the item URI.
pub(crate) fn journal_match(row: &BTreeMap<String, SparqlCell>) -> Option<JournalMatch> {
  let item = row.get("item")?;
  let qid = item.value.rsplit('/').next()?.to_owned();
  Some(JournalMatch {
    qid,
    label: row.get("itemLabel").map(|c| c.value.clone()),
    issn: row.get("issn").map(|c| c.value.clone()),
  })
}

/// Escape a string for inclusion in a double-quoted SPARQL literal.
pub(crate) fn escape_literal(raw: &str) -> String {
  raw.replace('\\', "\\\\").replace('"', "\\\"")
}
