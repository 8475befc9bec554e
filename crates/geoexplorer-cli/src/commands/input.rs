//! GeoJSON input read from disk or downloaded from the backend

use anyhow::{Context, Result};
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::models::{Condition, DatasetId};
use geoexplorer_core::summary;
use geoexplorer_gateway::loader;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::cli::GeoJsonSource;

pub async fn read(source: &GeoJsonSource, config: &LayeredConfig) -> Result<Value> {
    match (&source.file, &source.dataset) {
        (Some(path), _) => read_file(path),
        (None, Some(id)) => {
            let gateway = super::connect(config)?;
            let data = loader::load_dataset_data(&gateway, &DatasetId::new(id.as_str()))
                .await
                .with_context(|| format!("Failed to download data of dataset {}", id))?;
            Ok(data)
        }
        (None, None) => anyhow::bail!("Either a file or --dataset is required"),
    }
}

pub fn read_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// One region condition per feature of a GeoJSON file
pub fn read_regions(path: &Path) -> Result<Vec<Condition>> {
    let collection = summary::normalize(read_file(path)?)
        .with_context(|| format!("{} is not usable as a region", path.display()))?;
    Ok(collection
        .features
        .into_iter()
        .filter(|feature| feature.geometry.is_some())
        .map(Condition::region)
        .collect())
}
