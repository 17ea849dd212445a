//! CSV result tables.
//!
//! Both tables are always written with their header row, even when the run
//! retained no cells, so downstream consumers can rely on the schema.

use std::path::Path;

use tracing::info;

use thiessen_core::models::{CoordinateRow, ResultRow};
use thiessen_core::{Result, ThiessenError};

const RESULT_HEADERS: [&str; 4] = ["Polygon_Name", "Shape_Name", "ID", "Area_km2"];

const COORDINATE_HEADERS: [&str; 6] = [
    "Polygon_Name",
    "Station_Name",
    "Station_ID",
    "Region",
    "Vertex_Coordinates",
    "Region_and_Coordinates",
];

fn write_error(path: &Path, err: impl std::fmt::Display) -> ThiessenError {
    ThiessenError::OutputWrite { path: path.to_path_buf(), message: err.to_string() }
}

/// Write the per-cell results table (`Polygon_Name`, `Shape_Name`, `ID`,
/// `Area_km2`).
pub fn write_result_table(path: &Path, rows: &[ResultRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;

    if rows.is_empty() {
        writer.write_record(RESULT_HEADERS).map_err(|e| write_error(path, e))?;
    } else {
        for row in rows {
            writer.serialize(row).map_err(|e| write_error(path, e))?;
        }
    }
    writer.flush().map_err(|e| write_error(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "Wrote results table");
    Ok(())
}

/// Write the vertex-coordinates table; one row per exterior ring of each
/// retained cell.
pub fn write_coordinate_table(path: &Path, rows: &[CoordinateRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;

    if rows.is_empty() {
        writer.write_record(COORDINATE_HEADERS).map_err(|e| write_error(path, e))?;
    } else {
        for row in rows {
            writer.serialize(row).map_err(|e| write_error(path, e))?;
        }
    }
    writer.flush().map_err(|e| write_error(path, e))?;

    info!(path = %path.display(), rows = rows.len(), "Wrote coordinates table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result_row(name: &str, id: Option<&str>, area: f64) -> ResultRow {
        ResultRow {
            polygon_name: name.to_string(),
            shape_name: format!("{}_intersected.shp", name),
            station_id: id.map(str::to_string),
            area_km2: area,
        }
    }

    #[test]
    fn test_result_table_headers_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let rows =
            vec![result_row("polygon_1", Some("17"), 1.25), result_row("polygon_1", None, 0.5)];

        write_result_table(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Polygon_Name,Shape_Name,ID,Area_km2");
        assert_eq!(lines.next().unwrap(), "polygon_1,polygon_1_intersected.shp,17,1.25");
        // A missing station ID serializes as an empty field.
        assert_eq!(lines.next().unwrap(), "polygon_1,polygon_1_intersected.shp,,0.5");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_result_table_still_has_headers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");

        write_result_table(&path, &[]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), "Polygon_Name,Shape_Name,ID,Area_km2");
    }

    #[test]
    fn test_coordinate_table_quotes_embedded_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("coordinates_results.csv");
        let rows = vec![CoordinateRow::new(
            "polygon_1",
            "Gauge A",
            "17",
            5,
            "0,0,0,10,10,10,10,0,0,0",
        )];

        write_coordinate_table(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Polygon_Name,Station_Name,Station_ID,Region,Vertex_Coordinates,Region_and_Coordinates"
        );
        // The coordinate strings contain commas, so csv must quote them.
        assert_eq!(
            lines.next().unwrap(),
            "polygon_1,Gauge A,17,REGION=5,\"0,0,0,10,10,10,10,0,0,0\",\"REGION=5,0,0,0,10,10,10,10,0,0,0\""
        );
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let rows = vec![result_row("polygon_1", Some("3"), 2.0)];

        write_result_table(&path, &rows).unwrap();
        let first = std::fs::read(&path).unwrap();
        write_result_table(&path, &rows).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unwritable_path_is_an_output_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("results.csv");

        let err = write_result_table(&path, &[]).unwrap_err();
        assert!(matches!(err, ThiessenError::OutputWrite { .. }));
    }
}
