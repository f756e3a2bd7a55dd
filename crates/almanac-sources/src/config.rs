//! Source configuration and the partner journal registry.
//!
//! Endpoints, contributor handles, and the journal list are explicit
//! configuration deserialised from `almanac.toml` (or the environment), not
//! module-level constants — the clients receive a `SourcesConfig` at
//! construction time and hold no global state.

use serde::{Deserialize, Serialize};

/// One partner journal tracked by the evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerJournal {
  pub name: String,
  /// Partner organization operating the journal.
  pub partner: String,
  #[serde(default)]
  pub url: Option<String>,
  /// Wikidata item for the journal; absent until discovered.
  #[serde(default)]
  pub wikidata_qid: Option<String>,
  #[serde(default)]
  pub issn: Option<String>,
  #[serde(default)]
  pub ojs_version: Option<String>,
}

/// Runtime configuration for all external sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
  /// SPARQL endpoint of the Wikidata Query Service.
  pub wikidata_endpoint: String,
  /// Sent on every request; the Wikidata Query Service requires a
  /// descriptive User-Agent with a contact address.
  pub user_agent: String,
  pub github_api_base: String,
  /// `owner/repo` of the OpenCitations crowdsourcing issue tracker.
  pub opencitations_repo: String,
  /// GitHub token for a higher rate limit; anonymous works for small runs.
  pub github_token: Option<String>,
  /// GitHub handles whose issues count as contributions of this project's
  /// deposit tooling.
  pub contributors: Vec<String>,
  pub journals: Vec<PartnerJournal>,
}

impl Default for SourcesConfig {
  fn default() -> Self {
    Self {
      wikidata_endpoint: "https://query.wikidata.org/sparql".to_owned(),
      user_agent: concat!(
        "almanac/",
        env!("CARGO_PKG_VERSION"),
        " (https://github.com/almanac-metrics/almanac)"
      )
      .to_owned(),
      github_api_base: "https://api.github.com".to_owned(),
      opencitations_repo: "opencitations/crowdsourcing".to_owned(),
      github_token: None,
      contributors: Vec::new(),
      journals: Vec::new(),
    }
  }
}

impl SourcesConfig {
  /// Journals that already have a Wikidata QID.
  pub fn journals_with_qid(&self) -> impl Iterator<Item = &PartnerJournal> {
    self.journals.iter().filter(|j| j.wikidata_qid.is_some())
  }

  /// Journals still missing a QID — the discovery candidates.
  pub fn journals_without_qid(&self) -> impl Iterator<Item = &PartnerJournal> {
    self.journals.iter().filter(|j| j.wikidata_qid.is_none())
  }

  /// All known QIDs, in registry order.
  pub fn qids(&self) -> Vec<&str> {
    self
      .journals
      .iter()
      .filter_map(|j| j.wikidata_qid.as_deref())
      .collect()
  }
}
