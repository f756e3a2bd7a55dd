//! Error type for `almanac-sources`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] almanac_core::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The service answered 2xx but the body did not carry the expected
  /// variable or a parseable value.
  #[error("malformed response from {service}: {detail}")]
  MalformedResponse { service: &'static str, detail: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
