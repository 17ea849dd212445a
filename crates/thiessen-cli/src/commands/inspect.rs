//! Inspect command implementation

use anyhow::Result;

use thiessen_io::inspect_layer;

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::InspectOutput;

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let info = match inspect_layer(&args.path) {
        Ok(info) => info,
        Err(err) => {
            output.error(&err);
            return Err(err.into());
        }
    };

    if output.is_json() {
        return output.result(InspectOutput::from(info));
    }

    output.section("Layer");
    output.kv("Path", info.path.display());
    output.kv("CRS", &info.crs);
    output.kv("Geometry", &info.geometry_type);
    output.kv("Features", info.feature_count);
    output.kv(
        "Fields",
        if info.fields.is_empty() { "(none)".to_string() } else { info.fields.join(", ") },
    );

    Ok(())
}
