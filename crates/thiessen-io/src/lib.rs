//! Thiessen IO - Shapefile and tabular persistence
//!
//! Reading of the boundary and gauge layers (including `.prj` CRS
//! extraction), writing of the per-polygon shapefile outputs, and the CSV
//! result tables.

pub mod formats;
pub mod tables;

pub use formats::shapefile::{
    inspect_layer, read_boundaries, read_gauges, write_polygon_layer, LayerInfo,
};
pub use tables::{write_coordinate_table, write_result_table};
