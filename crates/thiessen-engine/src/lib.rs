//! Thiessen Engine - The catchment-polygon workflow
//!
//! Orchestrates one full run: load the boundary and gauge layers, reconcile
//! their CRS, build the Voronoi tessellation once, clip it against every
//! boundary polygon, and persist the shapefile and CSV outputs.

pub mod coords;
pub mod pipeline;

pub use pipeline::{run, RunOptions};
