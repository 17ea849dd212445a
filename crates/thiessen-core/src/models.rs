//! Domain models shared across all thiessen crates.

pub mod attributes;
pub mod crs;
pub mod feature;
pub mod rows;
pub mod summary;

pub use attributes::{AttributeValue, Attributes, UNKNOWN_SENTINEL};
pub use crs::Crs;
pub use feature::{BoundaryPolygon, GaugePoint};
pub use rows::{CoordinateRow, ResultRow};
pub use summary::{PolygonOutcome, RunSummary};
