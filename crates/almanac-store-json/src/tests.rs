//! Tests for the JSON-file backend against a temp directory.

use std::fs;
use std::path::PathBuf;

use almanac_core::{
  MetricPath, MetricValue, ObservationOpts, TimelineDocument, TimelineStorage,
};
use tempfile::TempDir;

use crate::{Error, IncompatiblePolicy, JsonFileStore};

fn store_in(dir: &TempDir) -> JsonFileStore {
  JsonFileStore::new(dir.path().join("timeline.json"))
}

fn populated() -> TimelineDocument {
  let mut doc = TimelineDocument::empty();
  doc
    .record_observation(
      &MetricPath::parse("wikidata.p1343_count").unwrap(),
      14i64.into(),
      "wikidata",
      ObservationOpts { name: Some("Articles with P1343".into()), ..Default::default() },
    )
    .unwrap();
  doc
    .record_journal_observation(
      "Q50814880",
      "articles",
      25i64.into(),
      Some("Journal of Spatial Information Science"),
      Some("JOSIS / TU Dresden"),
    )
    .unwrap();
  doc
}

// ─── Load ────────────────────────────────────────────────────────────────────

#[test]
fn missing_file_loads_as_fresh_empty_document() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);

  let doc = store.load().unwrap();
  assert_eq!(doc.metrics, TimelineDocument::empty().metrics);
  assert!(doc.metadata.last_updated.is_none());
}

#[test]
fn incompatible_shape_loads_as_fresh_empty_document() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);
  fs::write(store.path(), r#"{"foo": "bar"}"#).unwrap();

  let doc = store.load().unwrap();
  // Indistinguishable from a first run against a nonexistent file.
  assert_eq!(doc.metrics, TimelineDocument::empty().metrics);
}

#[test]
fn wrong_version_marker_counts_as_incompatible() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);
  fs::write(
    store.path(),
    r#"{"metadata": {"created": "x", "last_updated": null, "version": "1.0",
        "description": "old flat log"}, "metrics": {}}"#,
  )
  .unwrap();

  let doc = store.load().unwrap();
  assert_eq!(doc.metrics, TimelineDocument::empty().metrics);
}

#[test]
fn strict_policy_surfaces_incompatible_format() {
  let dir = TempDir::new().unwrap();
  let path = dir.path().join("timeline.json");
  fs::write(&path, r#"{"metadata": {"version": "1.0"}, "metrics": {}}"#).unwrap();

  let store = JsonFileStore::with_policy(&path, IncompatiblePolicy::Fail);
  let err = store.load().unwrap_err();
  match err {
    Error::IncompatibleFormat { expected, found } => {
      assert_eq!(expected, "2.0");
      assert_eq!(found.as_deref(), Some("1.0"));
    }
    other => panic!("expected IncompatibleFormat, got {other}"),
  }
}

#[test]
fn unparseable_bytes_are_a_fatal_error() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);
  fs::write(store.path(), "{ this is not json").unwrap();

  assert!(matches!(store.load().unwrap_err(), Error::Corrupt(_)));
}

// ─── Save ────────────────────────────────────────────────────────────────────

#[test]
fn save_then_load_round_trips_exactly() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);

  let mut doc = populated();
  store.save(&mut doc).unwrap();

  // `save` stamps last_updated on the in-memory document, so the loaded
  // copy must be identical to it, series order included.
  let loaded = store.load().unwrap();
  assert_eq!(loaded, doc);
  assert_eq!(
    loaded.latest_value(&MetricPath::parse("wikidata.p1343_count").unwrap()),
    Some(&MetricValue::Integer(14))
  );
}

#[test]
fn save_stamps_last_updated() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);

  let mut doc = TimelineDocument::empty();
  assert!(doc.metadata.last_updated.is_none());
  store.save(&mut doc).unwrap();

  let stamp = doc.metadata.last_updated.expect("stamped on save");
  assert!(stamp.ends_with('Z'));
}

#[test]
fn save_replaces_the_file_without_leaving_a_temp_behind() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);

  let mut doc = populated();
  store.save(&mut doc).unwrap();
  store.save(&mut doc).unwrap();

  let names: Vec<String> = fs::read_dir(dir.path())
    .unwrap()
    .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  assert_eq!(names, ["timeline.json"]);
}

#[test]
fn save_creates_missing_parent_directories() {
  let dir = TempDir::new().unwrap();
  let path: PathBuf = dir.path().join("nested/deeper/timeline.json");
  let store = JsonFileStore::new(&path);

  let mut doc = TimelineDocument::empty();
  store.save(&mut doc).unwrap();
  assert!(path.is_file());
}

#[test]
fn incompatible_document_is_discarded_on_next_save() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);
  fs::write(store.path(), r#"{"version": "0.1", "observations": []}"#).unwrap();

  let mut doc = store.load().unwrap();
  doc
    .record_observation(
      &MetricPath::parse("opencitations.deposit_issues_total").unwrap(),
      7i64.into(),
      "opencitations",
      ObservationOpts::default(),
    )
    .unwrap();
  store.save(&mut doc).unwrap();

  let raw: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
  assert_eq!(raw["metadata"]["version"], "2.0");
  assert!(raw.get("observations").is_none());
}

#[test]
fn persisted_file_is_pretty_printed() {
  let dir = TempDir::new().unwrap();
  let store = store_in(&dir);

  let mut doc = populated();
  store.save(&mut doc).unwrap();

  let raw = fs::read_to_string(store.path()).unwrap();
  assert!(raw.contains("\n  \"metadata\""));
}
