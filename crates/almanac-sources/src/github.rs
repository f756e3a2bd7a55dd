//! GitHub REST client for issue-tracker metrics.
//!
//! Only the issues endpoint is needed: the OpenCitations crowdsourcing
//! workflow runs entirely through issues on a public repository.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::Result;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";
const PAGE_SIZE: usize = 100;
/// Pause between pages when paginating through a large issue list.
const PAGE_PACING: Duration = Duration::from_millis(500);

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUser {
  pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueLabel {
  pub name: String,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues`.
///
/// Pull requests appear on this endpoint too; they carry a `pull_request`
/// key and are filtered out by the contribution summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
  pub number: u64,
  #[serde(default)]
  pub title: String,
  pub state: String,
  #[serde(default)]
  pub labels: Vec<IssueLabel>,
  pub user: Option<IssueUser>,
  pub created_at: Option<DateTime<Utc>>,
  pub closed_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub html_url: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub pull_request: Option<serde_json::Value>,
}

impl Issue {
  pub fn is_pull_request(&self) -> bool { self.pull_request.is_some() }

  pub fn creator(&self) -> Option<&str> {
    self.user.as_ref().map(|u| u.login.as_str())
  }

  pub fn label_names(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(|l| l.name.as_str())
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the GitHub REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GithubClient {
  client: reqwest::Client,
  api_base: String,
  token: Option<String>,
}

impl GithubClient {
  pub fn new(
    api_base: impl Into<String>,
    user_agent: &str,
    token: Option<String>,
  ) -> Result<Self> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
      headers.insert(USER_AGENT, ua);
    }

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, api_base: api_base.into(), token })
  }

  /// `GET /repos/{repo}/issues` — one page.
  pub async fn issues_page(&self, repo: &str, state: &str, page: usize) -> Result<Vec<Issue>> {
    let url = format!("{}/repos/{repo}/issues", self.api_base.trim_end_matches('/'));
    let per_page = PAGE_SIZE.to_string();
    let page = page.to_string();

    let mut request = self.client.get(&url).query(&[
      ("state", state),
      ("per_page", per_page.as_str()),
      ("page", page.as_str()),
    ]);
    if let Some(token) = &self.token {
      request = request.header("Authorization", format!("token {token}"));
    }

    let response = request.send().await?.error_for_status()?;
    Ok(response.json().await?)
  }

  /// Every issue in the repository, paginating until a short page.
  pub async fn all_issues(&self, repo: &str) -> Result<Vec<Issue>> {
    let mut all = Vec::new();
    let mut page = 1;

    loop {
      let batch = self.issues_page(repo, "all", page).await?;
      let short = batch.len() < PAGE_SIZE;
      all.extend(batch);
      if short {
        break;
      }
      page += 1;
      tokio::time::sleep(PAGE_PACING).await;
    }

    tracing::debug!(repo, issues = all.len(), pages = page, "fetched issue tracker");
    Ok(all)
  }
}
