//! Thiessen Geo - CRS transforms, tessellation and clipping
//!
//! This crate holds every geometry operation of the workflow: reprojecting
//! the gauge set onto the boundary CRS, building the shared Voronoi
//! tessellation, and clipping cells against boundary polygons.

pub mod clip;
pub mod tessellation;
pub mod transform;
pub mod validation;
