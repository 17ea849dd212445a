//! Boundary geometry validation.
//!
//! Clipping never aborts the whole run: an invalid boundary polygon is
//! reported and skipped. These checks produce the reasons.

use geo::{Area, MultiPolygon, Polygon};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    pub fn add_error(&mut self, location: impl Into<String>, reason: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(ValidationError { location: location.into(), reason: reason.into() });
    }

    /// First recorded reason, for single-line reporting.
    pub fn first_reason(&self) -> Option<String> {
        self.errors.first().map(|e| format!("{}: {}", e.location, e.reason))
    }
}

fn validate_ring(ring: &geo::LineString<f64>, location: &str, result: &mut ValidationResult) {
    if ring.0.len() < 4 {
        result.add_error(
            location,
            format!("ring must have at least 4 points, found {}", ring.0.len()),
        );
        return;
    }

    if ring.0.first() != ring.0.last() {
        result.add_error(location, "ring must be closed (first point == last point)");
    }

    for (i, coord) in ring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result.add_error(format!("{}[{}]", location, i), "coordinates must be finite");
            return;
        }
    }
}

fn validate_polygon(polygon: &Polygon<f64>, index: usize, result: &mut ValidationResult) {
    validate_ring(polygon.exterior(), &format!("part[{}].exterior", index), result);
    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior, &format!("part[{}].interior[{}]", index, i), result);
    }
}

/// Validate a boundary polygon prior to clipping.
pub fn validate_boundary(boundary: &MultiPolygon<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if boundary.0.is_empty() {
        result.add_error("boundary", "geometry is empty");
        return result;
    }

    for (i, polygon) in boundary.0.iter().enumerate() {
        validate_polygon(polygon, i, &mut result);
    }

    if result.is_valid && boundary.unsigned_area() <= 0.0 {
        result.add_error("boundary", "geometry has zero area");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};

    #[test]
    fn test_valid_square() {
        let square = polygon![
            (x: 0.0, y: 0.0),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
        ];
        assert!(validate_boundary(&MultiPolygon(vec![square])).is_valid);
    }

    #[test]
    fn test_empty_multipolygon() {
        let result = validate_boundary(&MultiPolygon(vec![]));
        assert!(!result.is_valid);
        assert!(result.first_reason().unwrap().contains("empty"));
    }

    #[test]
    fn test_degenerate_ring() {
        let sliver = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        );
        let result = validate_boundary(&MultiPolygon(vec![sliver]));
        assert!(!result.is_valid);
    }

    #[test]
    fn test_zero_area() {
        // A closed ring that traces a line back and forth encloses nothing.
        let flat = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (5.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        let result = validate_boundary(&MultiPolygon(vec![flat]));
        assert!(!result.is_valid);
        assert!(result.first_reason().unwrap().contains("zero area"));
    }

    #[test]
    fn test_non_finite_coordinate() {
        let broken = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (f64::NAN, 0.0),
                (1.0, 1.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let result = validate_boundary(&MultiPolygon(vec![broken]));
        assert!(!result.is_valid);
        assert!(result.first_reason().unwrap().contains("finite"));
    }
}
