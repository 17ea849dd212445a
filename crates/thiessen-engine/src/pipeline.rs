//! One end-to-end workflow run.

use std::path::{Path, PathBuf};

use geo::{BoundingRect, Coord, Rect};
use tracing::{info, warn};

use thiessen_core::models::{
    AttributeValue, BoundaryPolygon, GaugePoint, PolygonOutcome, ResultRow, RunSummary,
};
use thiessen_core::{Result, ThiessenError};
use thiessen_geo::clip::clip_to_boundary;
use thiessen_geo::tessellation::{build_tessellation, DEFAULT_PADDING};
use thiessen_geo::transform::{crs_match, reproject_gauges};
use thiessen_io::{
    read_boundaries, read_gauges, write_coordinate_table, write_polygon_layer, write_result_table,
};

use crate::coords::coordinate_rows_for;

/// Name of the per-cell area field added to intersected outputs. DBF field
/// names are capped at 10 characters.
pub const AREA_FIELD: &str = "AREA_KM2";

const RESULTS_FILE: &str = "results.csv";
const COORDINATES_FILE: &str = "coordinates_results.csv";

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub boundary_path: PathBuf,
    pub gauge_path: PathBuf,
    pub output_dir: PathBuf,
    /// Gauge field used as `Station_Name` in the coordinates table.
    pub name_field: String,
    /// Gauge field used as the station identifier in both tables.
    pub id_field: String,
    /// Also write the vertex-coordinates table.
    pub export_coordinates: bool,
    /// Padding factor for the tessellation clipping box.
    pub padding: f64,
}

impl RunOptions {
    pub fn new(
        boundary_path: impl Into<PathBuf>,
        gauge_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            boundary_path: boundary_path.into(),
            gauge_path: gauge_path.into(),
            output_dir: output_dir.into(),
            name_field: "Name".to_string(),
            id_field: "ID".to_string(),
            export_coordinates: false,
            padding: DEFAULT_PADDING,
        }
    }
}

/// Combined bounding rect of the gauge set and every boundary polygon.
fn coverage_extent(gauges: &[GaugePoint], boundaries: &[BoundaryPolygon]) -> Rect<f64> {
    let mut min = Coord { x: f64::INFINITY, y: f64::INFINITY };
    let mut max = Coord { x: f64::NEG_INFINITY, y: f64::NEG_INFINITY };
    let mut grow = |rect: Rect<f64>| {
        min.x = min.x.min(rect.min().x);
        min.y = min.y.min(rect.min().y);
        max.x = max.x.max(rect.max().x);
        max.y = max.y.max(rect.max().y);
    };

    for gauge in gauges {
        let c = gauge.geometry.0;
        grow(Rect::new(c, c));
    }
    for boundary in boundaries {
        if let Some(rect) = boundary.geometry.bounding_rect() {
            grow(rect);
        }
    }

    Rect::new(min, max)
}

/// Run the workflow: read, reconcile CRS, tessellate once, clip per
/// boundary polygon, write outputs.
///
/// Input, tessellation and output failures abort the run; geometry failures
/// on individual boundary polygons are recorded as skipped outcomes and the
/// run continues.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let (boundaries, boundary_crs) = read_boundaries(&options.boundary_path)?;
    let (mut gauges, gauge_crs) = read_gauges(&options.gauge_path)?;
    info!(
        boundaries = boundaries.len(),
        gauges = gauges.len(),
        boundary_crs = %boundary_crs,
        gauge_crs = %gauge_crs,
        "layers loaded"
    );

    // Gauges move onto the boundary CRS, never the converse: every output
    // geometry stays in the boundary layer's frame.
    let gauges_reprojected = !crs_match(&gauge_crs, &boundary_crs);
    if gauges_reprojected {
        warn!(
            from = %gauge_crs,
            to = %boundary_crs,
            "CRS mismatch; reprojecting gauges onto the boundary CRS"
        );
        gauges = reproject_gauges(gauges, &gauge_crs, &boundary_crs)?;
    }

    std::fs::create_dir_all(&options.output_dir).map_err(|e| ThiessenError::OutputWrite {
        path: options.output_dir.clone(),
        message: e.to_string(),
    })?;

    let coverage = coverage_extent(&gauges, &boundaries);
    let tessellation = build_tessellation(&gauges, coverage, options.padding)?;

    let mut outcomes = Vec::with_capacity(boundaries.len());
    let mut result_rows: Vec<ResultRow> = Vec::new();
    let mut coordinate_rows = Vec::new();

    for boundary in &boundaries {
        let polygon_name = boundary.label();

        write_polygon_layer(
            &shp_path(&options.output_dir, &polygon_name),
            &[(boundary.geometry.clone(), boundary.attributes.clone())],
        )?;

        let cells = match clip_to_boundary(&tessellation, &boundary.geometry) {
            Ok(cells) => cells,
            Err(err) => {
                warn!(polygon = %polygon_name, reason = %err, "skipping polygon");
                outcomes.push(PolygonOutcome::Skipped {
                    polygon_name,
                    reason: err.reason,
                });
                continue;
            }
        };

        if cells.is_empty() {
            warn!(polygon = %polygon_name, "skipping polygon");
            outcomes.push(PolygonOutcome::Skipped {
                polygon_name,
                reason: "no tessellation cell intersects this polygon".to_string(),
            });
            continue;
        }

        let intersected_name = boundary.intersected_label();
        let shape_name = format!("{}.shp", intersected_name);

        let features: Vec<_> = cells
            .iter()
            .map(|cell| {
                let mut attributes = cell.attributes.clone();
                attributes.insert(AREA_FIELD, AttributeValue::Number(cell.area_km2));
                (cell.geometry.clone(), attributes)
            })
            .collect();
        write_polygon_layer(&shp_path(&options.output_dir, &intersected_name), &features)?;

        let mut area_km2 = 0.0;
        for cell in &cells {
            area_km2 += cell.area_km2;
            result_rows.push(ResultRow {
                polygon_name: polygon_name.clone(),
                shape_name: shape_name.clone(),
                station_id: cell.attributes.identifier(&options.id_field),
                area_km2: cell.area_km2,
            });
            if options.export_coordinates {
                coordinate_rows.extend(coordinate_rows_for(
                    cell,
                    &polygon_name,
                    &options.name_field,
                    &options.id_field,
                ));
            }
        }

        info!(polygon = %polygon_name, cells = cells.len(), area_km2, "polygon processed");
        outcomes.push(PolygonOutcome::Processed {
            polygon_name,
            cells_retained: cells.len(),
            area_km2,
        });
    }

    let results_path = options.output_dir.join(RESULTS_FILE);
    write_result_table(&results_path, &result_rows)?;

    let coordinates_path = if options.export_coordinates {
        let path = options.output_dir.join(COORDINATES_FILE);
        write_coordinate_table(&path, &coordinate_rows)?;
        Some(path)
    } else {
        None
    };

    Ok(RunSummary {
        boundary_crs_epsg: boundary_crs.epsg,
        gauge_count: gauges.len(),
        gauges_reprojected,
        outcomes,
        result_rows: result_rows.len(),
        coordinate_rows: options.export_coordinates.then_some(coordinate_rows.len()),
        results_path,
        coordinates_path,
    })
}

fn shp_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{}.shp", stem))
}
