//! [`JsonFileStore`] — the JSON-file implementation of [`TimelineStorage`].

use std::{
  fs::{self, File},
  io::{self, Write as _},
  path::{Path, PathBuf},
};

use almanac_core::{
  FORMAT_VERSION, TimelineDocument, TimelineStorage, timeline::timestamp_now,
};
use serde_json::Value;

use crate::{Error, Result};

/// What to do when the stored document parses as JSON but does not carry the
/// expected `metadata`/`metrics` shape and version marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IncompatiblePolicy {
  /// Return a fresh empty document. The incompatible document stays on disk
  /// untouched until the next save overwrites it. This matches the
  /// historical behavior of the collection scripts; it discards old data
  /// rather than migrating it.
  #[default]
  StartFresh,
  /// Surface [`Error::IncompatibleFormat`] and leave the file alone.
  Fail,
}

/// A timeline store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
  path:            PathBuf,
  on_incompatible: IncompatiblePolicy,
}

impl JsonFileStore {
  /// Store at `path` with the default [`IncompatiblePolicy::StartFresh`].
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), on_incompatible: IncompatiblePolicy::default() }
  }

  pub fn with_policy(path: impl Into<PathBuf>, policy: IncompatiblePolicy) -> Self {
    Self { path: path.into(), on_incompatible: policy }
  }

  pub fn path(&self) -> &Path { &self.path }
}

impl TimelineStorage for JsonFileStore {
  type Error = Error;

  fn load(&self) -> Result<TimelineDocument> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        tracing::debug!(path = %self.path.display(), "no timeline on disk, starting empty");
        return Ok(TimelineDocument::empty());
      }
      Err(e) => return Err(e.into()),
    };

    let value: Value = serde_json::from_str(&raw).map_err(Error::Corrupt)?;

    if !is_compatible(&value) {
      let found = found_version(&value);
      match self.on_incompatible {
        IncompatiblePolicy::StartFresh => {
          tracing::warn!(
            path = %self.path.display(),
            ?found,
            "stored timeline has an incompatible format; starting fresh \
             (the old document will be discarded on the next save)"
          );
          return Ok(TimelineDocument::empty());
        }
        IncompatiblePolicy::Fail => {
          return Err(Error::IncompatibleFormat { expected: FORMAT_VERSION, found });
        }
      }
    }

    serde_json::from_value(value).map_err(Error::Corrupt)
  }

  fn save(&self, doc: &mut TimelineDocument) -> Result<()> {
    doc.metadata.last_updated = Some(timestamp_now());
    let json = serde_json::to_string_pretty(doc)?;
    write_atomic(&self.path, json.as_bytes())?;
    tracing::debug!(path = %self.path.display(), bytes = json.len(), "timeline saved");
    Ok(())
  }
}

/// A document is compatible when it has an object `metrics`, a `metadata`
/// object, and `metadata.version` equal to [`FORMAT_VERSION`]. Nothing else
/// about the shape is inspected here; node-level problems surface as
/// [`Error::Corrupt`] from the typed parse.
fn is_compatible(value: &Value) -> bool {
  value.get("metrics").is_some_and(Value::is_object)
    && value
      .get("metadata")
      .and_then(|m| m.get("version"))
      .and_then(Value::as_str)
      == Some(FORMAT_VERSION)
}

fn found_version(value: &Value) -> Option<String> {
  value
    .get("metadata")
    .and_then(|m| m.get("version"))
    .and_then(Value::as_str)
    .map(str::to_owned)
}

/// Write to a sibling `.tmp` file, sync, then rename over the destination.
/// Readers either see the old document or the new one, never a torn write.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent)?;
  }

  let mut tmp_name = path.as_os_str().to_owned();
  tmp_name.push(".tmp");
  let tmp = PathBuf::from(tmp_name);

  let mut file = File::create(&tmp)?;
  file.write_all(bytes)?;
  file.sync_all()?;
  drop(file);

  fs::rename(&tmp, path)?;
  Ok(())
}
