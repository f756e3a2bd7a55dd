//! Error types for `almanac-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The raw path was empty or contained an empty segment.
  #[error("invalid metric path: {0:?}")]
  InvalidPath(String),

  /// The path descends through a series leaf, or addresses a series where
  /// an interior group already exists. Nodes never change shape once
  /// created.
  #[error("metric path {0:?} conflicts with an existing node of a different shape")]
  PathConflict(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
