//! Error types for the Thiessen workflow

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThiessenError {
    // Input errors — fatal, abort before any processing
    #[error("Failed to read {path}: {message}")]
    SourceUnreadable { path: PathBuf, message: String },

    #[error("{path} is missing required shapefile components: {missing}")]
    MissingComponents { path: PathBuf, missing: String },

    #[error("Source {path} contains no {expected} features")]
    EmptySource { path: PathBuf, expected: String },

    // CRS errors
    #[error("EPSG:{epsg} has no known projection definition")]
    UnknownCrs { epsg: u32 },

    #[error("Reprojection from EPSG:{from} to EPSG:{to} failed: {reason}")]
    ReprojectionFailed { from: u32, to: u32, reason: String },

    // Tessellation errors — abort before any polygon processing
    #[error("Cannot build a Voronoi tessellation from an empty gauge set")]
    EmptyGaugeSet,

    #[error("Voronoi tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    // Output errors — fatal, remaining work abandoned
    #[error("Failed to write {path}: {message}")]
    OutputWrite { path: PathBuf, message: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ThiessenError>;
