//! Filter commands

use crate::cli::FiltersCommand;
use crate::output::Output;
use crate::output_types::{ConditionRow, FilterRow};
use anyhow::Result;
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::models::FilterId;
use geoexplorer_gateway::catalog;

pub async fn execute(command: FiltersCommand, config: &LayeredConfig, output: &Output) -> Result<()> {
    match command {
        FiltersCommand::List => {
            let store = super::open_store(config)?;
            store.load_filters().await?;

            let state = store.read();
            output.records(state.filters.filters().iter().map(FilterRow::from).collect::<Vec<_>>())
        }
        FiltersCommand::Show { id } => {
            let gateway = super::connect(config)?;
            let filter = catalog::load_filter(&gateway, &FilterId::new(id)).await?;
            output.report(&filter, |out| {
                out.field("Name", &filter.name)?;
                out.heading("Conditions")?;
                let rows: Vec<ConditionRow> = filter
                    .conditions
                    .iter()
                    .enumerate()
                    .map(|(index, condition)| ConditionRow::new(index, condition))
                    .collect();
                out.records(rows)
            })
        }
    }
}
