//! File-format readers and writers.

pub mod shapefile;
