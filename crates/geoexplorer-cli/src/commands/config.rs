//! Config command implementation

use crate::output::Output;
use crate::output_types::ConfigRow;
use anyhow::Result;
use geoexplorer_core::config::LayeredConfig;

pub fn execute(config: &LayeredConfig, output: &Output) -> Result<()> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow::new(key, value, source))
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.records(rows)
}
