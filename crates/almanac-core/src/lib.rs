//! Core types and operations for the Almanac metrics timeline.
//!
//! This crate is deliberately free of HTTP and filesystem dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod path;
pub mod storage;
pub mod timeline;
pub mod value;

pub use error::{Error, Result};
pub use path::MetricPath;
pub use storage::TimelineStorage;
pub use timeline::{
  LatestMetric, Metadata, MetricGroup, MetricNode, MetricSeries, Observation,
  ObservationOpts, TimelineDocument, FORMAT_VERSION,
};
pub use value::MetricValue;
