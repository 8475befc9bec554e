//! Color scale commands

use crate::cli::ColorScaleArgs;
use crate::output::Output;
use crate::output_types::{ColorScaleOutput, SchemeRow};
use anyhow::{bail, Context, Result};
use geoexplorer_core::color::{self, ScaleOptions};
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::summary;
use geojson::FeatureCollection;
use std::fs;

use super::input;

pub async fn execute(args: ColorScaleArgs, config: &LayeredConfig, output: &Output) -> Result<()> {
    let document = input::read(&args.source, config).await?;
    let mut collection = summary::normalize(document)?;
    let summary = summary::summarize_collection(&collection);

    let Some(property) = summary.properties.get(&args.property) else {
        let known: Vec<&str> = summary.properties.keys().map(String::as_str).collect();
        bail!("Property '{}' not found. Available: {}", args.property, known.join(", "));
    };

    let clamp = match args.clamp.as_deref() {
        None => None,
        Some([min, max]) => Some((*min, *max)),
        Some(_) => bail!("--clamp takes exactly two values: MIN,MAX"),
    };

    if color::from_palettable(&args.scheme).is_none() {
        output.warn(format!("Unknown color scheme '{}', every feature gets the fallback color", args.scheme));
    }

    let options = ScaleOptions {
        log: args.log,
        quantile: args.quantile,
        clamp,
        data: if args.quantile { numeric_values(&collection, &args.property) } else { Vec::new() },
    };
    let scale = color::color_scale(&args.scheme, property, &options);
    let colored = summary::apply_color_scale(&mut collection, &args.property, &scale, &args.target);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&collection)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let result = ColorScaleOutput {
        property: args.property,
        scheme: args.scheme,
        domain: scale.domain(),
        range: scale.range().to_vec(),
        colored,
        features: collection.features.len(),
        output: args.output.as_ref().map(|path| path.display().to_string()),
    };

    output.report(&result, |out| {
        out.heading("Color Scale")?;
        out.field("Property", &result.property)?;
        out.field("Scheme", &result.scheme)?;
        if let Some((lo, hi)) = result.domain {
            out.field("Domain", format!("{} .. {}", lo, hi))?;
        }
        out.field("Colors", result.range.join(" "))?;
        out.field("Colored", format!("{} of {} features", result.colored, result.features))?;
        if let Some(path) = &result.output {
            out.done(format!("Wrote colored features to {}", path))?;
        }
        Ok(())
    })
}

/// List the ColorBrewer schemes
pub fn schemes(output: &Output) -> Result<()> {
    let rows: Vec<SchemeRow> = color::schemes().iter().map(SchemeRow::from).collect();
    output.records(rows)
}

fn numeric_values(collection: &FeatureCollection, property: &str) -> Vec<f64> {
    collection
        .features
        .iter()
        .filter_map(|feature| feature.properties.as_ref()?.get(property)?.as_f64())
        .collect()
}
