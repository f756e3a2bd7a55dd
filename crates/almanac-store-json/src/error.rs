//! Error type for `almanac-store-json`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The stored bytes are not a parseable timeline document. Never
  /// auto-recovered: a corrupt timeline should be inspected, not silently
  /// replaced.
  #[error("corrupt timeline document: {0}")]
  Corrupt(serde_json::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// The stored document parses but is not a compatible timeline format,
  /// and the store is configured to fail instead of starting fresh.
  #[error("incompatible timeline format: expected version {expected:?}, found {found:?}")]
  IncompatibleFormat {
    expected: &'static str,
    found:    Option<String>,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
