//! Dot-separated metric paths.

use std::fmt;

use crate::{Error, Result};

/// A validated address of a node in the metrics tree, e.g.
/// `wikidata.journals.Q50814880.articles`.
///
/// Every segment is non-empty and dot-free; parsing rejects anything else up
/// front, so the store never materialises an empty-string key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricPath {
  segments: Vec<String>,
}

impl MetricPath {
  /// Parse a dotted path string.
  pub fn parse(raw: &str) -> Result<Self> {
    if raw.is_empty() {
      return Err(Error::InvalidPath(raw.to_owned()));
    }
    let segments: Vec<String> = raw.split('.').map(str::to_owned).collect();
    if segments.iter().any(|s| s.is_empty()) {
      return Err(Error::InvalidPath(raw.to_owned()));
    }
    Ok(Self { segments })
  }

  /// Build a path from pre-split segments (e.g. a journal QID that must be
  /// treated as a single key even if it somehow contained a dot — rejected
  /// here rather than silently re-split later).
  pub fn from_segments<I, S>(segments: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
    if segments.is_empty() || segments.iter().any(|s| s.is_empty() || s.contains('.')) {
      return Err(Error::InvalidPath(segments.join(".")));
    }
    Ok(Self { segments })
  }

  pub fn segments(&self) -> &[String] { &self.segments }

  /// The final segment — the key the series leaf lives under.
  pub fn leaf(&self) -> &str { &self.segments[self.segments.len() - 1] }

  /// All segments except the last — the interior groups to descend through.
  pub fn parents(&self) -> &[String] { &self.segments[..self.segments.len() - 1] }
}

impl fmt::Display for MetricPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.segments.join("."))
  }
}

impl std::str::FromStr for MetricPath {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}
