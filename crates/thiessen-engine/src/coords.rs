//! Vertex-coordinate extraction for the coordinates table.
//!
//! Each exterior ring of a retained cell becomes one row. Rings are
//! flattened to `x1,y1,x2,y2,…` with the closing vertex included, and the
//! vertex count in the `REGION=` label counts that closing vertex too.

use geo::LineString;

use thiessen_core::models::CoordinateRow;
use thiessen_geo::clip::IntersectedCell;

/// Flatten a ring into its vertex count and `x,y,…` coordinate string.
///
/// Values use the shortest `f64` rendering, so integral coordinates print
/// without a trailing `.0`.
pub fn flatten_ring(ring: &LineString<f64>) -> (usize, String) {
    let coords: Vec<String> =
        ring.0.iter().flat_map(|c| [c.x.to_string(), c.y.to_string()]).collect();
    (ring.0.len(), coords.join(","))
}

/// Build the coordinate rows for one retained cell.
///
/// Multi-part cells contribute one row per part; interior rings are not
/// reported.
pub fn coordinate_rows_for(
    cell: &IntersectedCell,
    polygon_name: &str,
    name_field: &str,
    id_field: &str,
) -> Vec<CoordinateRow> {
    let station_name = cell.attributes.label(name_field);
    let station_id = cell.attributes.label(id_field);

    cell.geometry
        .iter()
        .map(|part| {
            let (count, coords) = flatten_ring(part.exterior());
            CoordinateRow::new(polygon_name, &station_name, &station_id, count, coords)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use proptest::prelude::*;
    use thiessen_core::models::{AttributeValue, Attributes};

    fn square_ring() -> LineString<f64> {
        LineString::from(vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)])
    }

    #[test]
    fn test_flatten_square_ring() {
        let (count, coords) = flatten_ring(&square_ring());
        assert_eq!(count, 5);
        assert_eq!(coords, "0,0,0,10,10,10,10,0,0,0");
    }

    #[test]
    fn test_rows_per_part_with_sentinel_name() {
        let part1 = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 0.0, y: 1.0)];
        let part2 = polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 5.0, y: 6.0)];
        let mut attrs = Attributes::new();
        attrs.insert("ID", AttributeValue::Integer(17));
        let cell = IntersectedCell {
            geometry: MultiPolygon(vec![part1, part2]),
            attributes: attrs,
            area_km2: 1.0,
        };

        let rows = coordinate_rows_for(&cell, "polygon_3", "Name", "ID");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].polygon_name, "polygon_3");
        assert_eq!(rows[0].station_name, "Unknown");
        assert_eq!(rows[0].station_id, "17");
        // geo closes rings, so a triangle reports 4 vertices.
        assert_eq!(rows[0].region, "REGION=4");
        assert!(rows[1].region_and_coordinates.starts_with("REGION=4,5,5,"));
    }

    proptest! {
        #[test]
        fn prop_count_matches_coordinate_pairs(
            points in prop::collection::vec((-1e6_f64..1e6, -1e6_f64..1e6), 1..40)
        ) {
            let ring = LineString::from(points);
            let (count, coords) = flatten_ring(&ring);
            prop_assert_eq!(count, ring.0.len());
            prop_assert_eq!(coords.split(',').count(), 2 * count);
        }
    }
}
