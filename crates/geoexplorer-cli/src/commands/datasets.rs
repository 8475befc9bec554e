//! Dataset commands

use crate::cli::DatasetsCommand;
use crate::output::Output;
use crate::output_types::DatasetRow;
use anyhow::{Context, Result};
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::models::{Dataset, DatasetId, WorkingSetId};
use geoexplorer_gateway::loader;
use std::sync::Arc;

use super::input;

pub async fn execute(command: DatasetsCommand, config: &LayeredConfig, output: &Output) -> Result<()> {
    match command {
        DatasetsCommand::List => {
            let gateway = super::connect(config)?;
            let datasets = loader::load_datasets(&gateway).await?;
            output.records(datasets.iter().map(DatasetRow::from).collect::<Vec<_>>())
        }
        DatasetsCommand::Get { id } => {
            let gateway = super::connect(config)?;
            let dataset = loader::load_dataset_by_id(&gateway, &DatasetId::new(id)).await?;
            output.report(&dataset, |out| {
                out.records(vec![DatasetRow::from(&dataset)])?;
                if !dataset.meta.is_empty() {
                    out.heading("Meta")?;
                    out.pretty(&dataset.meta)?;
                }
                Ok(())
            })
        }
        DatasetsCommand::Ids { ids } => {
            let store = super::open_store(config)?;
            let ids: Vec<DatasetId> = ids.into_iter().map(DatasetId::new).collect();
            store.load_dataset_by_ids(&ids).await;

            let state = store.read();
            let loaded = state.working_set.datasets();
            if loaded.len() < ids.len() {
                output.warn(format!("{} of {} datasets could not be loaded", ids.len() - loaded.len(), ids.len()));
            }
            print_datasets(loaded, output)
        }
        DatasetsCommand::Search { regions } => {
            let mut conditions = Vec::new();
            for path in &regions {
                conditions.extend(input::read_regions(path)?);
            }

            let store = super::open_store(config)?;
            store.load_filter_datasets(&conditions).await?;

            let state = store.read();
            tracing::debug!("{} datasets match, {} heatmap points", state.filter.datasets().len(), state.filter.heatmap_data().len());
            print_datasets(state.filter.datasets(), output)
        }
        DatasetsCommand::WorkingSet { id } => {
            let store = super::open_store(config)?;
            store
                .load_dataset_by_working_set_id(&WorkingSetId::new(id.as_str()))
                .await
                .with_context(|| format!("Failed to load datasets of working set {}", id))?;

            let state = store.read();
            print_datasets(state.working_set.datasets(), output)
        }
        DatasetsCommand::Metadata { id } => {
            let gateway = super::connect(config)?;
            let metadata = loader::load_dataset_metadata(&gateway, &DatasetId::new(id)).await?;
            output.report(&metadata, |out| out.pretty(&metadata))
        }
        DatasetsCommand::Tiles { id } => {
            let gateway = super::connect(config)?;
            let tiles = loader::load_large_image_meta(&gateway, &DatasetId::new(id)).await?;
            output.report(&tiles, |out| {
                out.heading("Tiles")?;
                out.field("Levels", display(tiles.levels))?;
                out.field("Size", format!("{} x {}", display(tiles.size_x), display(tiles.size_y)))?;
                out.field("Tile size", format!("{} x {}", display(tiles.tile_width), display(tiles.tile_height)))
            })
        }
    }
}

fn print_datasets(datasets: &[Arc<Dataset>], output: &Output) -> Result<()> {
    let datasets: Vec<&Dataset> = datasets.iter().map(|dataset| dataset.as_ref()).collect();
    output.report(&datasets, |out| out.records(datasets.iter().copied().map(DatasetRow::from).collect::<Vec<_>>()))
}

fn display<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string())
}
