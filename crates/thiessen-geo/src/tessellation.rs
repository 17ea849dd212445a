//! Voronoi tessellation over the gauge point set.
//!
//! The tessellation is built exactly once per run from the full gauge set
//! and shared read-only across every boundary polygon. Unbounded outer
//! cells are capped by a finite clipping box; that box is derived from the
//! combined extent of gauges and boundaries with symmetric padding, so
//! every boundary polygon is strictly inside it and the later intersection
//! step is what truncates outer cells, not the tessellation itself.

use geo::{Coord, LineString, Polygon, Rect};
use thiessen_core::models::{Attributes, GaugePoint};
use thiessen_core::{Result, ThiessenError};
use tracing::debug;
use voronoice::{BoundingBox, Point as Site, VoronoiBuilder};

/// Default padding factor applied to the clipping extent.
pub const DEFAULT_PADDING: f64 = 2.0;

/// Minimum half-span of the clipping box, for degenerate extents
/// (e.g. a single gauge point).
const MIN_HALF_SPAN: f64 = 1.0;

/// One Voronoi cell carrying the attributes of its generating gauge.
#[derive(Debug, Clone)]
pub struct AttributedCell {
    pub geometry: Polygon<f64>,
    pub attributes: Attributes,
}

/// The shared tessellation: one attributed cell per gauge point.
#[derive(Debug, Clone)]
pub struct Tessellation {
    cells: Vec<AttributedCell>,
    clip_extent: Rect<f64>,
}

impl Tessellation {
    pub fn cells(&self) -> &[AttributedCell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The finite box that caps unbounded outer cells.
    pub fn clip_extent(&self) -> Rect<f64> {
        self.clip_extent
    }
}

/// Expand the coverage extent into the cell clipping box.
fn clip_extent(coverage: Rect<f64>, padding: f64) -> Rect<f64> {
    let half_span = (coverage.width().max(coverage.height()) * padding.max(1.0))
        .max(MIN_HALF_SPAN);
    let center = coverage.center();
    Rect::new(
        Coord { x: center.x - half_span, y: center.y - half_span },
        Coord { x: center.x + half_span, y: center.y + half_span },
    )
}

fn rect_to_polygon(rect: Rect<f64>) -> Polygon<f64> {
    let (min, max) = (rect.min(), rect.max());
    Polygon::new(
        LineString::from(vec![
            (min.x, min.y),
            (max.x, min.y),
            (max.x, max.y),
            (min.x, max.y),
            (min.x, min.y),
        ]),
        vec![],
    )
}

/// Build the Voronoi tessellation from the full gauge set.
///
/// `coverage` is the combined bounding rect of gauges and boundary
/// polygons; `padding` scales how far the clipping box extends beyond it.
/// Coincident gauge points are not deduplicated — duplicate-input
/// responsibility belongs to the caller.
pub fn build_tessellation(
    gauges: &[GaugePoint],
    coverage: Rect<f64>,
    padding: f64,
) -> Result<Tessellation> {
    if gauges.is_empty() {
        return Err(ThiessenError::EmptyGaugeSet);
    }

    let extent = clip_extent(coverage, padding);

    // A single gauge owns the entire plane; within the finite clipping box
    // that is the box itself.
    if gauges.len() == 1 {
        return Ok(Tessellation {
            cells: vec![AttributedCell {
                geometry: rect_to_polygon(extent),
                attributes: gauges[0].attributes.clone(),
            }],
            clip_extent: extent,
        });
    }

    let sites: Vec<Site> = gauges
        .iter()
        .map(|g| Site { x: g.geometry.x(), y: g.geometry.y() })
        .collect();

    let center = extent.center();
    let bounding_box = BoundingBox::new(
        Site { x: center.x, y: center.y },
        extent.width(),
        extent.height(),
    );

    let diagram = VoronoiBuilder::default()
        .set_sites(sites)
        .set_bounding_box(bounding_box)
        .build()
        .ok_or_else(|| ThiessenError::TessellationFailed {
            reason: "gauge sites are coincident or collinear".to_string(),
        })?;

    // Identity join: each cell is indexed by its generating site, so the
    // gauge attributes attach directly.
    let mut cells: Vec<AttributedCell> = Vec::with_capacity(gauges.len());
    for cell in diagram.iter_cells() {
        let vertices: Vec<Coord<f64>> =
            cell.iter_vertices().map(|v| Coord { x: v.x, y: v.y }).collect();

        // Degenerate cells (coincident sites) keep their slot with an empty
        // geometry; the zero-area filter drops them downstream.
        let geometry = if vertices.len() < 3 {
            Polygon::new(LineString::new(vec![]), vec![])
        } else {
            Polygon::new(LineString::from(vertices), vec![])
        };

        cells.push(AttributedCell {
            geometry,
            attributes: gauges[cell.site()].attributes.clone(),
        });
    }

    debug!(cells = cells.len(), "tessellation built");

    Ok(Tessellation { cells, clip_extent: extent })
}
