//! Thiessen Core - Domain models and error types
//!
//! This crate contains the entity types shared by the whole workflow:
//! boundary polygons, gauge points, attribute tables and result rows.

pub mod error;
pub mod models;

pub use error::{Result, ThiessenError};
