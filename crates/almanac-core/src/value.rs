//! The scalar value type stored in a metric series.
//!
//! The timeline is value-type-agnostic: counts, labels, and missing readings
//! all persist as whatever scalar the producer observed. The set of shapes is
//! closed so change detection has exhaustive equality semantics.

use serde::{Deserialize, Serialize};

/// One observed sample value.
///
/// Serialised untagged, so the persisted JSON holds the native scalar
/// (`14`, `3.5`, `"done"`, `true`, `null`) with no wrapper object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
  /// The source was queried but had no value to report.
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
}

impl MetricValue {
  pub fn is_null(&self) -> bool { matches!(self, Self::Null) }
}

/// Equality drives the append-suppression check: two numbers are equal when
/// they are numerically equal regardless of integer/float representation,
/// `Null == Null`, and there is no coercion across any other pair of
/// variants (`Integer(0) != String("0")`).
impl PartialEq for MetricValue {
  fn eq(&self, other: &Self) -> bool {
    use MetricValue::*;
    match (self, other) {
      (Null, Null) => true,
      (Bool(a), Bool(b)) => a == b,
      (Integer(a), Integer(b)) => a == b,
      (Float(a), Float(b)) => a == b,
      (Integer(a), Float(b)) | (Float(b), Integer(a)) => *a as f64 == *b,
      (String(a), String(b)) => a == b,
      _ => false,
    }
  }
}

impl From<i64> for MetricValue {
  fn from(v: i64) -> Self { Self::Integer(v) }
}

impl From<u64> for MetricValue {
  /// Counts from external services arrive unsigned; anything beyond `i64`
  /// range falls back to a float, matching what a JSON round trip would do.
  fn from(v: u64) -> Self {
    match i64::try_from(v) {
      Ok(i) => Self::Integer(i),
      Err(_) => Self::Float(v as f64),
    }
  }
}

impl From<f64> for MetricValue {
  fn from(v: f64) -> Self { Self::Float(v) }
}

impl From<bool> for MetricValue {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<&str> for MetricValue {
  fn from(v: &str) -> Self { Self::String(v.to_owned()) }
}

impl From<String> for MetricValue {
  fn from(v: String) -> Self { Self::String(v) }
}

/// `None` maps to `Null` — a query that answered "no value" is still an
/// observation worth recording.
impl<T: Into<MetricValue>> From<Option<T>> for MetricValue {
  fn from(v: Option<T>) -> Self {
    match v {
      Some(inner) => inner.into(),
      None => Self::Null,
    }
  }
}

impl std::fmt::Display for MetricValue {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Null => write!(f, "null"),
      Self::Bool(v) => write!(f, "{v}"),
      Self::Integer(v) => write!(f, "{v}"),
      Self::Float(v) => write!(f, "{v}"),
      Self::String(v) => write!(f, "{v}"),
    }
  }
}
