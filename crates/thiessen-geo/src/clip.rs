//! Clipping Voronoi cells against one boundary polygon.
//!
//! A failure here is scoped to the boundary polygon being processed: the
//! caller records the reason and continues with the next polygon.

use geo::{Area, BooleanOps, MultiPolygon};
use thiserror::Error;

use crate::tessellation::Tessellation;
use crate::validation::validate_boundary;
use thiessen_core::models::Attributes;

/// Square metres per square kilometre. Areas assume a metre-based
/// projected CRS; with any other linear unit the km² figures are wrong.
pub const SQ_M_PER_SQ_KM: f64 = 1_000_000.0;

/// Per-polygon clipping failure; does not abort the run.
#[derive(Debug, Clone, Error)]
#[error("{reason}")]
pub struct ClipError {
    pub reason: String,
}

/// A Voronoi cell clipped to one boundary polygon.
///
/// Carries the originating gauge attributes and the computed area in km².
#[derive(Debug, Clone)]
pub struct IntersectedCell {
    pub geometry: MultiPolygon<f64>,
    pub attributes: Attributes,
    pub area_km2: f64,
}

/// Intersect every tessellation cell with `boundary`.
///
/// Cells whose intersection has zero or negative area are discarded.
/// Output order follows cell (site) order; the retained set is what
/// correctness is judged on.
pub fn clip_to_boundary(
    tessellation: &Tessellation,
    boundary: &MultiPolygon<f64>,
) -> Result<Vec<IntersectedCell>, ClipError> {
    let validation = validate_boundary(boundary);
    if !validation.is_valid {
        return Err(ClipError {
            reason: validation.first_reason().unwrap_or_else(|| "invalid geometry".to_string()),
        });
    }

    let mut retained = Vec::new();
    for cell in tessellation.cells() {
        if cell.geometry.exterior().0.is_empty() {
            continue; // degenerate cell from coincident sites
        }

        let intersection = boundary.intersection(&MultiPolygon::from(cell.geometry.clone()));
        let area_km2 = intersection.unsigned_area() / SQ_M_PER_SQ_KM;
        if area_km2 <= 0.0 {
            continue;
        }

        retained.push(IntersectedCell {
            geometry: intersection,
            attributes: cell.attributes.clone(),
            area_km2,
        });
    }

    Ok(retained)
}
