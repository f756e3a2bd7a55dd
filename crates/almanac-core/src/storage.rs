//! The `TimelineStorage` trait.
//!
//! Implemented by storage backends (e.g. `almanac-store-json`). Higher
//! layers depend on this abstraction, not on any concrete backend. The
//! whole lifecycle is a synchronous load → record → save cycle with a
//! single writer; backends do not provide cross-process locking.

use crate::timeline::TimelineDocument;

pub trait TimelineStorage {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Load the persisted document.
  ///
  /// A missing source is not an error: the backend returns a fresh empty
  /// document. Only a structurally corrupt byte stream is fatal. How an
  /// incompatible-but-parseable document is handled is backend policy.
  fn load(&self) -> Result<TimelineDocument, Self::Error>;

  /// Stamp `metadata.last_updated` with the current time, then persist the
  /// full document, atomically replacing any previous content.
  fn save(&self, doc: &mut TimelineDocument) -> Result<(), Self::Error>;
}
