//! Working set commands

use crate::cli::WorkingSetsCommand;
use crate::output::Output;
use crate::output_types::WorkingSetRow;
use anyhow::Result;
use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::models::WorkingSetId;

pub async fn execute(command: WorkingSetsCommand, config: &LayeredConfig, output: &Output) -> Result<()> {
    let store = super::open_store(config)?;

    match command {
        WorkingSetsCommand::List => {
            store.load_working_sets().await?;

            let state = store.read();
            let rows: Vec<WorkingSetRow> = state
                .working_sets
                .flattened()
                .iter()
                .map(|entry| WorkingSetRow::new(entry, !output.is_json()))
                .collect();
            output.records(rows)
        }
        WorkingSetsCommand::Add { name, parent } => {
            let mut working_set = store.try_add_working_set(&name).await?;
            if let Some(parent) = parent {
                working_set.parent_working_set_id = Some(WorkingSetId::new(parent));
                working_set = store.save_working_set(&working_set).await?;
            }

            output.report(&working_set, |out| {
                let id = working_set.id.as_ref().map(ToString::to_string).unwrap_or_default();
                out.done(format!("Created working set '{}' ({})", working_set.name, id))
            })
        }
        WorkingSetsCommand::Delete { id } => {
            store.delete_working_set(&WorkingSetId::new(id.as_str())).await?;
            output.done(format!("Deleted working set {}", id))
        }
    }
}
