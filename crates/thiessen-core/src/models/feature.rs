//! Input features: boundary polygons and rain-gauge points.

use geo::{MultiPolygon, Point};

use super::attributes::Attributes;

/// One polygon record of the boundary layer.
///
/// Read once, immutable during the run. `index` is the 0-based position in
/// source order; generated output names are 1-based.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    pub index: usize,
    pub geometry: MultiPolygon<f64>,
    pub attributes: Attributes,
}

impl BoundaryPolygon {
    pub fn new(index: usize, geometry: MultiPolygon<f64>, attributes: Attributes) -> Self {
        Self { index, geometry, attributes }
    }

    /// Generated per-polygon label: `polygon_<1-based index>`.
    pub fn label(&self) -> String {
        format!("polygon_{}", self.index + 1)
    }

    /// Filename of the intersected-cells output for this polygon.
    pub fn intersected_label(&self) -> String {
        format!("{}_intersected", self.label())
    }
}

/// One rain-gauge point record.
#[derive(Debug, Clone)]
pub struct GaugePoint {
    pub geometry: Point<f64>,
    pub attributes: Attributes,
}

impl GaugePoint {
    pub fn new(geometry: Point<f64>, attributes: Attributes) -> Self {
        Self { geometry, attributes }
    }
}
