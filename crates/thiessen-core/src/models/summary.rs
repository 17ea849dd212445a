//! Per-run accounting returned by the pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one boundary polygon's clip-and-accumulate step.
///
/// Geometry-operation failures do not abort the run; they surface here so
/// the caller can report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PolygonOutcome {
    Processed {
        polygon_name: String,
        cells_retained: usize,
        area_km2: f64,
    },
    Skipped {
        polygon_name: String,
        reason: String,
    },
}

impl PolygonOutcome {
    pub fn polygon_name(&self) -> &str {
        match self {
            PolygonOutcome::Processed { polygon_name, .. } => polygon_name,
            PolygonOutcome::Skipped { polygon_name, .. } => polygon_name,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, PolygonOutcome::Skipped { .. })
    }
}

/// Summary of one workflow invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub boundary_crs_epsg: u32,
    pub gauge_count: usize,
    pub gauges_reprojected: bool,
    pub outcomes: Vec<PolygonOutcome>,
    pub result_rows: usize,
    pub coordinate_rows: Option<usize>,
    pub results_path: PathBuf,
    pub coordinates_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn processed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_skipped()).count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PolygonOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }
}
