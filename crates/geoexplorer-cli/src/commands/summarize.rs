//! Summarize command implementation

use crate::cli::SummarizeArgs;
use crate::output::Output;
use crate::output_types::PropertyRow;
use anyhow::Result;
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::summary;

use super::input;

pub async fn execute(args: SummarizeArgs, config: &LayeredConfig, output: &Output) -> Result<()> {
    let document = input::read(&args.source, config).await?;
    let summary = summary::summarize(document)?;

    output.report(&summary, |out| {
        out.heading("Geometry")?;
        out.field("Point-like", yes_no(summary.types.point_alike))?;
        out.field("Line-like", yes_no(summary.types.line_alike))?;
        out.field("Polygon-like", yes_no(summary.types.polygon_alike))?;

        out.heading("Properties")?;
        let rows = summary
            .properties
            .iter()
            .map(|(name, property)| PropertyRow::new(name, property))
            .collect();
        out.records::<PropertyRow>(rows)
    })
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
