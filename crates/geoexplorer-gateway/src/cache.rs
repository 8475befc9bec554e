use geoexplorer_core::error::Result;
use geoexplorer_core::models::DatasetId;
use geoexplorer_core::summary::normalize;
use geojson::FeatureCollection;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::loader::load_dataset_data;
use crate::ports::Gateway;

/// Memoizes downloaded dataset GeoJSON, normalized to a FeatureCollection.
///
/// Two concurrent misses for the same id may both download; the later
/// insert wins. Failed downloads are not cached.
#[derive(Debug, Clone, Default)]
pub struct DatasetDataCache {
    entries: Arc<RwLock<HashMap<DatasetId, Arc<FeatureCollection>>>>,
}

impl DatasetDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached data for `id`, downloading it on first use
    pub async fn get(&self, gateway: &dyn Gateway, id: &DatasetId) -> Result<Arc<FeatureCollection>> {
        if let Some(hit) = self.peek(id) {
            return Ok(hit);
        }

        tracing::debug!("Downloading data for dataset {}", id);
        let raw = load_dataset_data(gateway, id).await?;
        let collection = Arc::new(normalize(raw)?);

        self.entries.write().unwrap().insert(id.clone(), collection.clone());
        Ok(collection)
    }

    /// Cached data for `id`, without downloading
    pub fn peek(&self, id: &DatasetId) -> Option<Arc<FeatureCollection>> {
        self.entries.read().unwrap().get(id).cloned()
    }

    pub fn invalidate(&self, id: &DatasetId) -> bool {
        self.entries.write().unwrap().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
