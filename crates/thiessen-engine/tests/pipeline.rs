//! End-to-end runs over freshly written shapefile fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use shapefile::dbase::{FieldValue, Record, TableWriterBuilder};
use shapefile::{Point, Polygon, PolygonRing, Writer};
use tempfile::TempDir;

use thiessen_core::models::{PolygonOutcome, ResultRow};
use thiessen_core::ThiessenError;
use thiessen_engine::{run, RunOptions};

const UTM_33N_PRJ: &str = concat!(
    "PROJCS[\"WGS 84 / UTM zone 33N\",GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",",
    "SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],",
    "UNIT[\"degree\",0.0174532925199433]],PROJECTION[\"Transverse_Mercator\"],",
    "UNIT[\"metre\",1],AUTHORITY[\"EPSG\",\"32633\"]]"
);

const WEB_MERCATOR_PRJ: &str = concat!(
    "PROJCS[\"WGS 84 / Pseudo-Mercator\",GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",",
    "SPHEROID[\"WGS 84\",6378137,298.257223563]],PRIMEM[\"Greenwich\",0],",
    "UNIT[\"degree\",0.0174532925199433]],PROJECTION[\"Mercator_1SP\"],",
    "UNIT[\"metre\",1],AUTHORITY[\"EPSG\",\"3857\"]]"
);

const WGS84_PRJ: &str = concat!(
    "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",SPHEROID[\"WGS 84\",6378137,",
    "298.257223563]],PRIMEM[\"Greenwich\",0],UNIT[\"degree\",",
    "0.0174532925199433],AUTHORITY[\"EPSG\",\"4326\"]]"
);

fn write_prj(shp_path: &Path, wkt: &str) {
    fs::write(shp_path.with_extension("prj"), wkt).unwrap();
}

fn write_boundaries(dir: &Path, squares: &[(&str, f64, f64, f64)], prj: &str) -> PathBuf {
    let path = dir.join("boundaries.shp");
    let table = TableWriterBuilder::new().add_character_field("Region".try_into().unwrap(), 64);
    let mut writer = Writer::from_path(&path, table).unwrap();

    for (region, x, y, side) in squares {
        let ring = PolygonRing::Outer(vec![
            Point::new(*x, *y),
            Point::new(*x, *y + side),
            Point::new(*x + side, *y + side),
            Point::new(*x + side, *y),
            Point::new(*x, *y),
        ]);
        let mut record = Record::default();
        record.insert("Region".to_string(), FieldValue::Character(Some(region.to_string())));
        writer.write_shape_and_record(&Polygon::with_rings(vec![ring]), &record).unwrap();
    }
    drop(writer);

    write_prj(&path, prj);
    path
}

fn write_gauges(dir: &Path, gauges: &[(&str, f64, f64, f64)], prj: &str) -> PathBuf {
    let path = dir.join("gauges.shp");
    let table = TableWriterBuilder::new()
        .add_character_field("Name".try_into().unwrap(), 64)
        .add_numeric_field("ID".try_into().unwrap(), 20, 8);
    let mut writer = Writer::from_path(&path, table).unwrap();

    for (name, id, x, y) in gauges {
        let mut record = Record::default();
        record.insert("Name".to_string(), FieldValue::Character(Some(name.to_string())));
        record.insert("ID".to_string(), FieldValue::Numeric(Some(*id)));
        writer.write_shape_and_record(&Point::new(*x, *y), &record).unwrap();
    }
    drop(writer);

    write_prj(&path, prj);
    path
}

fn read_result_rows(path: &Path) -> Vec<ResultRow> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    reader.deserialize().map(|r| r.unwrap()).collect()
}

#[test]
fn test_full_run_writes_every_output() {
    let dir = TempDir::new().unwrap();
    let boundary_path =
        write_boundaries(dir.path(), &[("North", 0.0, 0.0, 10.0)], UTM_33N_PRJ);
    let gauge_path = write_gauges(
        dir.path(),
        &[("Gauge A", 1.0, 2.0, 2.0), ("Gauge B", 2.0, 8.0, 2.0), ("Gauge C", 3.0, 5.0, 8.0)],
        UTM_33N_PRJ,
    );
    let out = dir.path().join("out");

    let mut options = RunOptions::new(&boundary_path, &gauge_path, &out);
    options.export_coordinates = true;
    let summary = run(&options).unwrap();

    assert_eq!(summary.boundary_crs_epsg, 32633);
    assert_eq!(summary.gauge_count, 3);
    assert!(!summary.gauges_reprojected);
    assert_eq!(summary.processed_count(), 1);
    assert_eq!(summary.result_rows, 3);

    for name in
        ["polygon_1.shp", "polygon_1.dbf", "polygon_1_intersected.shp", "results.csv"]
    {
        assert!(out.join(name).exists(), "{} missing", name);
    }
    assert_eq!(summary.coordinates_path.as_deref(), Some(out.join("coordinates_results.csv").as_path()));

    let rows = read_result_rows(&summary.results_path);
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.polygon_name == "polygon_1"));
    assert!(rows.iter().all(|r| r.shape_name == "polygon_1_intersected.shp"));
    let ids: Vec<_> = rows.iter().map(|r| r.station_id.clone().unwrap()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    // The three cells partition the 10 m x 10 m square.
    let total: f64 = rows.iter().map(|r| r.area_km2).sum();
    assert!((total - 100.0 / 1_000_000.0).abs() < 1e-12, "total was {}", total);

    let coords = fs::read_to_string(out.join("coordinates_results.csv")).unwrap();
    let mut lines = coords.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Polygon_Name,Station_Name,Station_ID,Region,Vertex_Coordinates,Region_and_Coordinates"
    );
    assert!(lines.next().unwrap().starts_with("polygon_1,Gauge A,1,REGION="));
}

#[test]
fn test_second_run_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let boundary_path =
        write_boundaries(dir.path(), &[("North", 0.0, 0.0, 10.0)], UTM_33N_PRJ);
    let gauge_path = write_gauges(
        dir.path(),
        &[("Gauge A", 1.0, 2.0, 2.0), ("Gauge B", 2.0, 8.0, 2.0)],
        UTM_33N_PRJ,
    );
    let out = dir.path().join("out");
    let options = RunOptions::new(&boundary_path, &gauge_path, &out);

    run(&options).unwrap();
    let first = fs::read(out.join("results.csv")).unwrap();
    run(&options).unwrap();
    let second = fs::read(out.join("results.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_each_boundary_polygon_gets_its_own_outputs() {
    let dir = TempDir::new().unwrap();
    let boundary_path = write_boundaries(
        dir.path(),
        &[("West", 0.0, 0.0, 10.0), ("East", 20.0, 0.0, 10.0)],
        UTM_33N_PRJ,
    );
    let gauge_path = write_gauges(
        dir.path(),
        &[("Gauge A", 1.0, 5.0, 5.0), ("Gauge B", 2.0, 25.0, 5.0)],
        UTM_33N_PRJ,
    );
    let out = dir.path().join("out");

    let summary = run(&RunOptions::new(&boundary_path, &gauge_path, &out)).unwrap();

    assert_eq!(summary.processed_count(), 2);
    for name in [
        "polygon_1.shp",
        "polygon_1_intersected.shp",
        "polygon_2.shp",
        "polygon_2_intersected.shp",
    ] {
        assert!(out.join(name).exists(), "{} missing", name);
    }

    // Each square is wholly owned by its nearest gauge.
    let rows = read_result_rows(&summary.results_path);
    let west: Vec<_> = rows.iter().filter(|r| r.polygon_name == "polygon_1").collect();
    let east: Vec<_> = rows.iter().filter(|r| r.polygon_name == "polygon_2").collect();
    assert_eq!(west.len(), 1);
    assert_eq!(east.len(), 1);
    assert_eq!(west[0].station_id.as_deref(), Some("1"));
    assert_eq!(east[0].station_id.as_deref(), Some("2"));
}

#[test]
fn test_crs_mismatch_reprojects_gauges() {
    let dir = TempDir::new().unwrap();
    // Boundary in Web Mercator metres around the origin; gauges in WGS 84
    // degrees. 0.1 degrees of longitude is ~11 km in Web Mercator, well
    // inside the 100 km boundary square.
    let boundary_path =
        write_boundaries(dir.path(), &[("Origin", -50_000.0, -50_000.0, 100_000.0)], WEB_MERCATOR_PRJ);
    let gauge_path = write_gauges(
        dir.path(),
        &[("Gauge A", 1.0, -0.1, -0.1), ("Gauge B", 2.0, 0.1, 0.1)],
        WGS84_PRJ,
    );
    let out = dir.path().join("out");

    let summary = run(&RunOptions::new(&boundary_path, &gauge_path, &out)).unwrap();

    assert!(summary.gauges_reprojected);
    assert_eq!(summary.boundary_crs_epsg, 3857);
    assert_eq!(summary.processed_count(), 1);
    // Both gauges land inside the boundary, so both cells are retained.
    assert_eq!(summary.result_rows, 2);
}

#[test]
fn test_zero_boundary_polygons_completes_with_empty_table() {
    let dir = TempDir::new().unwrap();
    let boundary_path = write_boundaries(dir.path(), &[], UTM_33N_PRJ);
    let gauge_path = write_gauges(
        dir.path(),
        &[("Gauge A", 1.0, 2.0, 2.0), ("Gauge B", 2.0, 8.0, 8.0)],
        UTM_33N_PRJ,
    );
    let out = dir.path().join("out");

    let summary = run(&RunOptions::new(&boundary_path, &gauge_path, &out)).unwrap();

    assert!(summary.outcomes.is_empty());
    assert_eq!(summary.result_rows, 0);
    assert_eq!(summary.gauge_count, 2);

    // Header-only results table, no per-polygon shapefiles.
    let content = fs::read_to_string(&summary.results_path).unwrap();
    assert_eq!(content.trim_end(), "Polygon_Name,Shape_Name,ID,Area_km2");
    assert!(!out.join("polygon_1.shp").exists());
}

#[test]
fn test_empty_gauge_layer_aborts() {
    let dir = TempDir::new().unwrap();
    let boundary_path =
        write_boundaries(dir.path(), &[("North", 0.0, 0.0, 10.0)], UTM_33N_PRJ);
    let gauge_path = write_gauges(dir.path(), &[], UTM_33N_PRJ);
    let out = dir.path().join("out");

    let err = run(&RunOptions::new(&boundary_path, &gauge_path, &out)).unwrap_err();
    assert!(matches!(
        err,
        ThiessenError::EmptySource { .. } | ThiessenError::SourceUnreadable { .. }
    ));
    // Nothing was written.
    assert!(!out.exists());
}

#[test]
fn test_missing_boundary_file_aborts() {
    let dir = TempDir::new().unwrap();
    let gauge_path = write_gauges(dir.path(), &[("Gauge A", 1.0, 2.0, 2.0)], UTM_33N_PRJ);
    let out = dir.path().join("out");

    let err = run(&RunOptions::new(dir.path().join("nope.shp"), &gauge_path, &out)).unwrap_err();
    assert!(matches!(
        err,
        ThiessenError::MissingComponents { .. } | ThiessenError::SourceUnreadable { .. }
    ));
}

#[test]
fn test_no_skips_on_clean_inputs() {
    let dir = TempDir::new().unwrap();
    let boundary_path =
        write_boundaries(dir.path(), &[("North", 0.0, 0.0, 10.0)], UTM_33N_PRJ);
    let gauge_path = write_gauges(dir.path(), &[("Gauge A", 1.0, 5.0, 5.0)], UTM_33N_PRJ);
    let out = dir.path().join("out");

    let summary = run(&RunOptions::new(&boundary_path, &gauge_path, &out)).unwrap();
    assert!(summary.skipped().next().is_none());
    assert!(summary
        .outcomes
        .iter()
        .all(|o| matches!(o, PolygonOutcome::Processed { .. })));
}
