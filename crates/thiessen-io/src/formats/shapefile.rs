//! ESRI Shapefile reading and writing.
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf, .prj)
//! and the required ones must all be present for reading. The `.prj` file,
//! when present, yields the layer CRS as an EPSG code; without it the
//! layer defaults to EPSG:4326.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use shapefile::dbase::{FieldName, FieldValue, Record, TableWriterBuilder};
use shapefile::{Reader, Shape};
use tracing::warn;

use thiessen_core::models::{
    AttributeValue, Attributes, BoundaryPolygon, Crs, GaugePoint,
};
use thiessen_core::{Result, ThiessenError};

/// Metadata of one shapefile layer, for operator inspection.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    pub path: PathBuf,
    pub crs: Crs,
    pub geometry_type: String,
    pub feature_count: usize,
    pub fields: Vec<String>,
}

fn unreadable(path: &Path, message: impl Into<String>) -> ThiessenError {
    ThiessenError::SourceUnreadable { path: path.to_path_buf(), message: message.into() }
}

/// Base path of a shapefile (without extension).
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);
    if !is_shp {
        return Err(unreadable(path, "not a shapefile (.shp)"));
    }
    Ok(path.with_extension(""))
}

/// Verify that all required shapefile component files exist.
fn verify_components(path: &Path) -> Result<()> {
    let base = shapefile_base(path)?;
    let mut missing = Vec::new();

    for ext in ["shp", "shx", "dbf"] {
        if !base.with_extension(ext).exists() {
            missing.push(format!(".{}", ext));
        }
    }

    if !missing.is_empty() {
        return Err(ThiessenError::MissingComponents {
            path: path.to_path_buf(),
            missing: missing.join(", "),
        });
    }
    Ok(())
}

/// Parse an EPSG code out of a `.prj` WKT string.
///
/// Looks for `AUTHORITY["EPSG","<code>"]` and the `EPSG:<code>` shorthand.
fn parse_epsg_from_wkt(wkt_text: &str) -> Option<u32> {
    if let Some(start) = wkt_text.rfind("AUTHORITY[\"EPSG\",\"") {
        let code_start = start + "AUTHORITY[\"EPSG\",\"".len();
        if let Some(end) = wkt_text[code_start..].find('"') {
            if let Ok(code) = wkt_text[code_start..code_start + end].parse::<u32>() {
                return Some(code);
            }
        }
    }

    if let Some(start) = wkt_text.find("EPSG:") {
        let digits: String = wkt_text[start + 5..]
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse::<u32>() {
            return Some(code);
        }
    }

    None
}

/// Extract the layer CRS from the sibling `.prj` file.
fn extract_crs(path: &Path) -> Result<Crs> {
    let prj_path = shapefile_base(path)?.with_extension("prj");

    if !prj_path.exists() {
        warn!(path = %path.display(), "no .prj file, assuming EPSG:4326");
        return Ok(Crs::wgs84());
    }

    let content = fs::read_to_string(&prj_path)
        .map_err(|e| unreadable(path, format!("failed to read .prj file: {}", e)))?;

    if let Some(epsg) = parse_epsg_from_wkt(&content) {
        return Ok(Crs::from_epsg(epsg));
    }

    // Well-formed WKT without an extractable authority code still defaults,
    // but malformed .prj content is worth a warning.
    if wkt::Wkt::<f64>::from_str(&content).is_err() {
        warn!(path = %prj_path.display(), "unparseable .prj content, assuming EPSG:4326");
    }
    Ok(Crs::wgs84())
}

/// Convert a dBase field value to an attribute value.
fn convert_field_value(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s),
        FieldValue::Character(None) => AttributeValue::Null,
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(n),
        FieldValue::Numeric(None) => AttributeValue::Null,
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(b),
        FieldValue::Logical(None) => AttributeValue::Null,
        FieldValue::Date(Some(date)) => AttributeValue::Text(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        FieldValue::Date(None) => AttributeValue::Null,
        FieldValue::Float(Some(f)) => AttributeValue::Number(f as f64),
        FieldValue::Float(None) => AttributeValue::Null,
        FieldValue::Integer(i) => AttributeValue::Integer(i as i64),
        FieldValue::Currency(c) => AttributeValue::Number(c),
        FieldValue::DateTime(dt) => AttributeValue::Text(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        FieldValue::Double(d) => AttributeValue::Number(d),
        FieldValue::Memo(s) => AttributeValue::Text(s),
    }
}

fn convert_record(record: Record) -> Attributes {
    record.into_iter().map(|(name, value)| (name, convert_field_value(value))).collect()
}

/// Signed area of a coordinate ring (negative for shapefile holes).
fn ring_signed_area(coords: &[geo::Coord<f64>]) -> f64 {
    let mut area = 0.0;
    for pair in coords.windows(2) {
        area += pair[0].x * pair[1].y - pair[1].x * pair[0].y;
    }
    area / 2.0
}

fn close_ring(coords: &mut Vec<geo::Coord<f64>>) {
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
}

/// Group flat shapefile rings into a `geo::MultiPolygon`.
///
/// Shapefiles store rings flat: each outer ring opens a new polygon part
/// and is followed by its holes.
fn group_rings(rings: Vec<(bool, Vec<geo::Coord<f64>>)>) -> geo::MultiPolygon<f64> {
    let mut parts: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();

    for (is_outer, mut coords) in rings {
        close_ring(&mut coords);
        let ls = geo::LineString(coords);

        if is_outer {
            if let Some(ext) = exterior.take() {
                parts.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
            }
            exterior = Some(ls);
        } else {
            holes.push(ls);
        }
    }
    if let Some(ext) = exterior {
        parts.push(geo::Polygon::new(ext, holes));
    }

    geo::MultiPolygon(parts)
}

fn shape_to_multi_polygon(shape: &Shape) -> Option<geo::MultiPolygon<f64>> {
    use shapefile::PolygonRing;

    let rings: Vec<(bool, Vec<geo::Coord<f64>>)> = match shape {
        Shape::Polygon(p) => p
            .rings()
            .iter()
            .map(|ring| {
                let coords =
                    ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
                (matches!(ring, PolygonRing::Outer(_)), coords)
            })
            .collect(),
        Shape::PolygonZ(p) => p
            .rings()
            .iter()
            .map(|ring| {
                let coords =
                    ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
                (matches!(ring, PolygonRing::Outer(_)), coords)
            })
            .collect(),
        Shape::PolygonM(p) => p
            .rings()
            .iter()
            .map(|ring| {
                let coords =
                    ring.points().iter().map(|pt| geo::Coord { x: pt.x, y: pt.y }).collect();
                (matches!(ring, PolygonRing::Outer(_)), coords)
            })
            .collect(),
        _ => return None,
    };

    Some(group_rings(rings))
}

fn shape_to_point(shape: &Shape) -> Option<geo::Point<f64>> {
    match shape {
        Shape::Point(p) => Some(geo::Point::new(p.x, p.y)),
        Shape::PointZ(p) => Some(geo::Point::new(p.x, p.y)),
        Shape::PointM(p) => Some(geo::Point::new(p.x, p.y)),
        _ => None,
    }
}

fn shape_type_name(shape: &Shape) -> String {
    format!("{}", shape.shapetype())
}

/// Read the boundary polygon layer.
///
/// A layer with zero features is legal and yields an empty vector; the
/// workflow then completes with empty result tables.
pub fn read_boundaries(path: &Path) -> Result<(Vec<BoundaryPolygon>, Crs)> {
    verify_components(path)?;
    let crs = extract_crs(path)?;

    let mut reader = Reader::from_path(path)
        .map_err(|e| unreadable(path, format!("failed to open shapefile: {}", e)))?;

    let mut boundaries = Vec::new();
    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) =
            result.map_err(|e| unreadable(path, format!("failed to read feature: {}", e)))?;

        let geometry = shape_to_multi_polygon(&shape).ok_or_else(|| {
            unreadable(
                path,
                format!(
                    "feature {} is {}, expected polygon geometry",
                    index,
                    shape_type_name(&shape)
                ),
            )
        })?;

        boundaries.push(BoundaryPolygon::new(index, geometry, convert_record(record)));
    }

    Ok((boundaries, crs))
}

/// Read the rain-gauge point layer.
pub fn read_gauges(path: &Path) -> Result<(Vec<GaugePoint>, Crs)> {
    verify_components(path)?;
    let crs = extract_crs(path)?;

    let mut reader = Reader::from_path(path)
        .map_err(|e| unreadable(path, format!("failed to open shapefile: {}", e)))?;

    let mut gauges = Vec::new();
    for (index, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) =
            result.map_err(|e| unreadable(path, format!("failed to read feature: {}", e)))?;

        let geometry = shape_to_point(&shape).ok_or_else(|| {
            unreadable(
                path,
                format!(
                    "feature {} is {}, expected point geometry",
                    index,
                    shape_type_name(&shape)
                ),
            )
        })?;

        gauges.push(GaugePoint::new(geometry, convert_record(record)));
    }

    if gauges.is_empty() {
        return Err(ThiessenError::EmptySource {
            path: path.to_path_buf(),
            expected: "point".to_string(),
        });
    }
    Ok((gauges, crs))
}

/// Read layer metadata without materializing geometries.
pub fn inspect_layer(path: &Path) -> Result<LayerInfo> {
    verify_components(path)?;
    let crs = extract_crs(path)?;

    let mut reader = Reader::from_path(path)
        .map_err(|e| unreadable(path, format!("failed to open shapefile: {}", e)))?;

    let mut geometry_type = String::from("(empty)");
    let mut feature_count = 0;
    let mut fields: Vec<String> = Vec::new();

    for result in reader.iter_shapes_and_records() {
        let (shape, record) =
            result.map_err(|e| unreadable(path, format!("failed to read feature: {}", e)))?;
        if feature_count == 0 {
            geometry_type = shape_type_name(&shape);
            fields = record.into_iter().map(|(name, _)| name).collect();
            fields.sort();
        }
        feature_count += 1;
    }

    Ok(LayerInfo { path: path.to_path_buf(), crs, geometry_type, feature_count, fields })
}

// --- Writing ---------------------------------------------------------------

/// DBF column names are limited to 10 bytes.
fn dbf_field_name(name: &str) -> String {
    name.chars().take(10).collect()
}

/// Field type chosen for a DBF column, from the first non-null value.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Character,
    Numeric,
    Logical,
}

fn column_kind(features: &[(geo::MultiPolygon<f64>, Attributes)], field: &str) -> ColumnKind {
    for (_, attrs) in features {
        match attrs.get(field) {
            Some(AttributeValue::Text(_)) => return ColumnKind::Character,
            Some(AttributeValue::Number(_)) | Some(AttributeValue::Integer(_)) => {
                return ColumnKind::Numeric
            }
            Some(AttributeValue::Boolean(_)) => return ColumnKind::Logical,
            _ => continue,
        }
    }
    ColumnKind::Character
}

fn to_field_value(value: Option<&AttributeValue>, kind: ColumnKind) -> FieldValue {
    match kind {
        ColumnKind::Character => FieldValue::Character(match value {
            Some(v) if !v.is_null() => Some(v.as_label()),
            _ => None,
        }),
        ColumnKind::Numeric => FieldValue::Numeric(match value {
            Some(AttributeValue::Number(n)) => Some(*n),
            Some(AttributeValue::Integer(i)) => Some(*i as f64),
            _ => None,
        }),
        ColumnKind::Logical => FieldValue::Logical(match value {
            Some(AttributeValue::Boolean(b)) => Some(*b),
            _ => None,
        }),
    }
}

/// Convert a `geo::MultiPolygon` to shapefile rings.
///
/// Exterior rings are written clockwise and holes counter-clockwise, per
/// the ESRI convention.
fn multi_polygon_to_shape(mp: &geo::MultiPolygon<f64>) -> shapefile::Polygon {
    fn ring_points(ls: &geo::LineString<f64>, clockwise: bool) -> Vec<shapefile::Point> {
        let mut coords: Vec<geo::Coord<f64>> = ls.0.clone();
        close_ring(&mut coords);
        let is_ccw = ring_signed_area(&coords) > 0.0;
        if is_ccw == clockwise {
            coords.reverse();
        }
        coords.into_iter().map(|c| shapefile::Point { x: c.x, y: c.y }).collect()
    }

    let mut rings = Vec::new();
    for part in &mp.0 {
        rings.push(shapefile::PolygonRing::Outer(ring_points(part.exterior(), true)));
        for hole in part.interiors() {
            rings.push(shapefile::PolygonRing::Inner(ring_points(hole, false)));
        }
    }
    shapefile::Polygon::with_rings(rings)
}

/// Write a polygon layer with its attribute table.
///
/// The DBF schema is the union of attribute fields across all features,
/// in deterministic (sorted) order; values missing from a feature are
/// written as NULL.
pub fn write_polygon_layer(
    path: &Path,
    features: &[(geo::MultiPolygon<f64>, Attributes)],
) -> Result<()> {
    let write_err = |e: String| ThiessenError::OutputWrite {
        path: path.to_path_buf(),
        message: e,
    };

    let mut field_names: Vec<String> = Vec::new();
    for (_, attrs) in features {
        for name in attrs.field_names() {
            if !field_names.iter().any(|f| f == name) {
                field_names.push(name.to_string());
            }
        }
    }
    field_names.sort();

    let columns: Vec<(String, ColumnKind)> =
        field_names.iter().map(|f| (f.clone(), column_kind(features, f))).collect();

    let mut table = TableWriterBuilder::new();
    for (name, kind) in &columns {
        let field_name = FieldName::try_from(dbf_field_name(name).as_str())
            .map_err(|_| write_err(format!("invalid DBF field name {:?}", name)))?;
        table = match kind {
            ColumnKind::Character => table.add_character_field(field_name, 64),
            ColumnKind::Numeric => table.add_numeric_field(field_name, 20, 8),
            ColumnKind::Logical => table.add_logical_field(field_name),
        };
    }

    let mut writer = shapefile::Writer::from_path(path, table)
        .map_err(|e| write_err(format!("failed to create shapefile: {}", e)))?;

    for (geometry, attrs) in features {
        let shape = multi_polygon_to_shape(geometry);
        let mut record = Record::default();
        for (name, kind) in &columns {
            record.insert(dbf_field_name(name), to_field_value(attrs.get(name), *kind));
        }
        writer
            .write_shape_and_record(&shape, &record)
            .map_err(|e| write_err(format!("failed to write feature: {}", e)))?;
    }

    Ok(())
}
