//! CRS reconciliation for the gauge set.
//!
//! Geometry operations are only meaningful when both entity sets share one
//! CRS, so gauges are reprojected onto the boundary CRS before anything
//! else runs — never the converse. proj4rs works in radians for geographic
//! CRS, so coordinates are converted at both ends of the transform.

use geo::{Coord, MapCoords};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use thiessen_core::models::{Crs, GaugePoint};
use thiessen_core::{Result, ThiessenError};
use tracing::debug;

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// Resolve an EPSG code to a proj4rs projection.
pub fn projection_for(crs: &Crs) -> Result<Proj> {
    u16::try_from(crs.epsg)
        .ok()
        .and_then(|code| Proj::from_epsg_code(code).ok())
        .ok_or(ThiessenError::UnknownCrs { epsg: crs.epsg })
}

/// Transform a single coordinate between two resolved projections.
fn convert_coord(
    from: &Proj,
    to: &Proj,
    from_crs: &Crs,
    to_crs: &Crs,
    coord: Coord<f64>,
) -> Result<Coord<f64>> {
    // Radians in for geographic sources, radians out for geographic targets.
    let mut point = if from.is_latlong() {
        (coord.x.to_radians(), coord.y.to_radians(), 0.0)
    } else {
        (coord.x, coord.y, 0.0)
    };

    transform(from, to, &mut point).map_err(|e| ThiessenError::ReprojectionFailed {
        from: from_crs.epsg,
        to: to_crs.epsg,
        reason: e.to_string(),
    })?;

    if to.is_latlong() {
        Ok(Coord { x: point.0.to_degrees(), y: point.1.to_degrees() })
    } else {
        Ok(Coord { x: point.0, y: point.1 })
    }
}

/// Reproject the gauge set onto the boundary CRS.
///
/// Returns the gauges untouched when the two CRS already match.
pub fn reproject_gauges(
    gauges: Vec<GaugePoint>,
    gauge_crs: &Crs,
    boundary_crs: &Crs,
) -> Result<Vec<GaugePoint>> {
    if crs_match(gauge_crs, boundary_crs) {
        return Ok(gauges);
    }

    debug!(from = gauge_crs.epsg, to = boundary_crs.epsg, "reprojecting gauge set");

    let from = projection_for(gauge_crs)?;
    let to = projection_for(boundary_crs)?;

    gauges
        .into_iter()
        .map(|gauge| {
            let geometry = gauge
                .geometry
                .try_map_coords(|c| convert_coord(&from, &to, gauge_crs, boundary_crs, c))?;
            Ok(GaugePoint::new(geometry, gauge.attributes))
        })
        .collect()
}
