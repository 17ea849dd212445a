//! Serializable payloads for `--json` output.

use serde::Serialize;
use std::path::PathBuf;

use thiessen_io::LayerInfo;

/// JSON payload of the `inspect` command.
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: PathBuf,
    pub crs_epsg: u32,
    pub crs_name: String,
    pub geometry_type: String,
    pub feature_count: usize,
    pub fields: Vec<String>,
}

impl From<LayerInfo> for InspectOutput {
    fn from(info: LayerInfo) -> Self {
        Self {
            path: info.path,
            crs_epsg: info.crs.epsg,
            crs_name: info.crs.name,
            geometry_type: info.geometry_type,
            feature_count: info.feature_count,
            fields: info.fields,
        }
    }
}
