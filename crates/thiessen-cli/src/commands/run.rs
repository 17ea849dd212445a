//! Run command implementation

use anyhow::Result;
use tabled::Tabled;

use thiessen_core::models::PolygonOutcome;
use thiessen_engine::{run, RunOptions};

use crate::cli::RunArgs;
use crate::output::OutputWriter;
use crate::progress::{create_spinner, finish_error, finish_success};

pub fn execute(args: RunArgs, output: &OutputWriter) -> Result<()> {
    let mut options = RunOptions::new(&args.boundary, &args.gauges, &args.output);
    options.name_field = args.name_field;
    options.id_field = args.id_field;
    options.export_coordinates = args.export_coordinates;
    options.padding = args.padding;

    let spinner = if output.is_json() {
        None
    } else {
        Some(create_spinner("Building catchment polygons..."))
    };

    let summary = match run(&options) {
        Ok(summary) => {
            if let Some(pb) = &spinner {
                finish_success(pb, "Catchment polygons built");
            }
            summary
        }
        Err(err) => {
            if let Some(pb) = &spinner {
                finish_error(pb, "Run failed");
            }
            output.error(&err);
            return Err(err.into());
        }
    };

    if output.is_json() {
        return output.result(&summary);
    }

    output.section("Run Summary");
    output.kv("Boundary CRS", format!("EPSG:{}", summary.boundary_crs_epsg));
    let gauges = if summary.gauges_reprojected {
        format!("{} (reprojected onto the boundary CRS)", summary.gauge_count)
    } else {
        summary.gauge_count.to_string()
    };
    output.kv("Gauges", gauges);
    output.kv("Polygons processed", summary.processed_count());
    output.kv("Result rows", summary.result_rows);
    output.kv("Results table", summary.results_path.display());
    if let Some(path) = &summary.coordinates_path {
        output.kv("Coordinates table", path.display());
    }

    #[derive(Tabled)]
    struct OutcomeRow {
        #[tabled(rename = "Polygon")]
        polygon: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Cells")]
        cells: String,
        #[tabled(rename = "Area km²")]
        area: String,
    }

    let rows: Vec<OutcomeRow> = summary
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            PolygonOutcome::Processed { polygon_name, cells_retained, area_km2 } => OutcomeRow {
                polygon: polygon_name.clone(),
                status: "processed".to_string(),
                cells: cells_retained.to_string(),
                area: format!("{:.6}", area_km2),
            },
            PolygonOutcome::Skipped { polygon_name, .. } => OutcomeRow {
                polygon: polygon_name.clone(),
                status: "skipped".to_string(),
                cells: "-".to_string(),
                area: "-".to_string(),
            },
        })
        .collect();
    output.table(rows);

    for outcome in summary.skipped() {
        if let PolygonOutcome::Skipped { polygon_name, reason } = outcome {
            output.warning(format!("{} skipped: {}", polygon_name, reason));
        }
    }

    output.success(format!(
        "Wrote {} result rows to {}",
        summary.result_rows,
        args.output.display()
    ));

    Ok(())
}
