//! Accumulated tabular output rows.
//!
//! Serde field renames pin the exact column headers consumers of the
//! result tables rely on.

use serde::{Deserialize, Serialize};

/// One row of the `results` table: a retained intersected cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(rename = "Polygon_Name")]
    pub polygon_name: String,
    #[serde(rename = "Shape_Name")]
    pub shape_name: String,
    /// Gauge identifier; empty column when the source has no ID field.
    #[serde(rename = "ID")]
    pub station_id: Option<String>,
    #[serde(rename = "Area_km2")]
    pub area_km2: f64,
}

/// One row of the `coordinates_results` table: one exterior ring of one
/// retained intersected cell (multi-part cells contribute several rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRow {
    #[serde(rename = "Polygon_Name")]
    pub polygon_name: String,
    #[serde(rename = "Station_Name")]
    pub station_name: String,
    #[serde(rename = "Station_ID")]
    pub station_id: String,
    /// `REGION=<vertex count>` where the count includes the closing vertex.
    #[serde(rename = "Region")]
    pub region: String,
    /// Flattened `x1,y1,x2,y2,…` string, closing vertex included.
    #[serde(rename = "Vertex_Coordinates")]
    pub vertex_coordinates: String,
    /// `REGION=<count>,<coords>` — consumers parse this exact delimiter scheme.
    #[serde(rename = "Region_and_Coordinates")]
    pub region_and_coordinates: String,
}

impl CoordinateRow {
    /// Assemble a row from a flattened ring, deriving the `Region` and
    /// combined-label columns.
    pub fn new(
        polygon_name: impl Into<String>,
        station_name: impl Into<String>,
        station_id: impl Into<String>,
        vertex_count: usize,
        coords: impl Into<String>,
    ) -> Self {
        let coords = coords.into();
        Self {
            polygon_name: polygon_name.into(),
            station_name: station_name.into(),
            station_id: station_id.into(),
            region: format!("REGION={}", vertex_count),
            region_and_coordinates: format!("REGION={},{}", vertex_count, coords),
            vertex_coordinates: coords,
        }
    }
}
