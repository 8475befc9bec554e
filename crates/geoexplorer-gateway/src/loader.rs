//! Dataset loader: domain queries translated into gateway calls

use futures::future::join_all;
use geoexplorer_core::error::{ExplorerError, Result};
use geoexplorer_core::models::{Condition, Dataset, DatasetId, WorkingSetId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ports::Gateway;

/// Tile pyramid description of a large image item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMetadata {
    #[serde(default)]
    pub levels: Option<u32>,

    #[serde(default)]
    pub size_x: Option<u64>,

    #[serde(default)]
    pub size_y: Option<u64>,

    #[serde(default)]
    pub tile_width: Option<u32>,

    #[serde(default)]
    pub tile_height: Option<u32>,

    /// Remaining fields (magnification, mm_x, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Decode a gateway response body
pub(crate) fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ExplorerError::Serialization(format!("Invalid {} response: {}", what, e)))
}

/// All datasets visible to the user
pub async fn load_datasets(gateway: &dyn Gateway) -> Result<Vec<Dataset>> {
    let value = gateway.get("dataset", &[]).await?;
    decode(value, "dataset list")
}

/// A single dataset. A missing id fails with `NotFound`.
pub async fn load_dataset_by_id(gateway: &dyn Gateway, id: &DatasetId) -> Result<Dataset> {
    let value = gateway.get(&format!("dataset/{}", id), &[]).await?;
    decode(value, "dataset")
}

/// Load several datasets concurrently.
///
/// Each id is fetched independently; ids that fail to load are logged and
/// left out of the result, which keeps the order of `ids` otherwise.
pub async fn load_dataset_by_ids(gateway: &dyn Gateway, ids: &[DatasetId]) -> Vec<Dataset> {
    let results = join_all(ids.iter().map(|id| load_dataset_by_id(gateway, id))).await;

    ids.iter()
        .zip(results)
        .filter_map(|(id, result)| match result {
            Ok(dataset) => Some(dataset),
            Err(e) => {
                tracing::warn!("Dropping dataset {} from batch: {}", id, e);
                None
            }
        })
        .collect()
}

/// Datasets belonging to a working set
pub async fn load_dataset_by_working_set_id(
    gateway: &dyn Gateway,
    id: &WorkingSetId,
) -> Result<Vec<Dataset>> {
    let value = gateway.get(&format!("dataset/workingset/{}", id), &[]).await?;
    decode(value, "working set datasets")
}

/// Datasets matching a list of filter conditions
pub async fn load_dataset_by_filter_conditions(
    gateway: &dyn Gateway,
    conditions: &[Condition],
) -> Result<Vec<Dataset>> {
    let conditions = serde_json::to_string(conditions)?;
    let value = gateway.get("dataset/search", &[("conditions", conditions)]).await?;
    decode(value, "dataset search")
}

/// Raw GeoJSON content of a dataset item
pub async fn load_dataset_data(gateway: &dyn Gateway, id: &DatasetId) -> Result<Value> {
    gateway.get(&format!("item/{}/download", id), &[]).await
}

/// Free-form metadata of a dataset item
pub async fn load_dataset_metadata(gateway: &dyn Gateway, id: &DatasetId) -> Result<Value> {
    gateway.get(&format!("item/{}/metadata", id), &[]).await
}

/// Tile metadata of a large image item
pub async fn load_large_image_meta(gateway: &dyn Gateway, id: &DatasetId) -> Result<TileMetadata> {
    let value = gateway.get(&format!("item/{}/tiles", id), &[]).await?;
    decode(value, "tile metadata")
}
