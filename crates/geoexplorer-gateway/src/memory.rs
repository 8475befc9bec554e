//! In-memory gateway for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. Against a real backend, use [`crate::RestGateway`].

use async_trait::async_trait;
use geoexplorer_core::error::{ExplorerError, Result};
use geoexplorer_core::geo::geometries_intersect;
use geoexplorer_core::models::{
    Condition, Dataset, DatasetId, Filter, FilterId, WorkingSet, WorkingSetId,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::ports::{Gateway, Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Item payloads served under `item/{id}/...`
#[derive(Debug, Clone, Default)]
struct ItemPayloads {
    download: Option<Value>,
    metadata: Option<Value>,
    tiles: Option<Value>,
}

/// In-memory implementation of [`Gateway`] serving the backend's resource paths
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    datasets: Arc<RwLock<HashMap<DatasetId, Dataset>>>,
    working_sets: Arc<RwLock<HashMap<WorkingSetId, WorkingSet>>>,
    filters: Arc<RwLock<HashMap<FilterId, Filter>>>,
    items: Arc<RwLock<HashMap<String, ItemPayloads>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    requests: Arc<RwLock<Vec<String>>>,
    next_id: Arc<RwLock<u64>>,
}

impl MemoryGateway {
    /// Create an empty in-memory gateway
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a dataset
    pub fn insert_dataset(&self, dataset: Dataset) {
        self.datasets.write().unwrap().insert(dataset.id.clone(), dataset);
    }

    /// Seed a working set, assigning an id when it has none
    pub fn insert_working_set(&self, mut working_set: WorkingSet) -> WorkingSetId {
        let id = working_set.id.clone().unwrap_or_else(|| WorkingSetId::new(self.allocate_id()));
        working_set.id = Some(id.clone());
        self.working_sets.write().unwrap().insert(id.clone(), working_set);
        id
    }

    /// Seed a filter, assigning an id when it has none
    pub fn insert_filter(&self, mut filter: Filter) -> FilterId {
        let id = filter.id.clone().unwrap_or_else(|| FilterId::new(self.allocate_id()));
        filter.id = Some(id.clone());
        self.filters.write().unwrap().insert(id.clone(), filter);
        id
    }

    /// Serve `geojson` from `item/{id}/download`
    pub fn set_item_data(&self, id: &DatasetId, geojson: Value) {
        self.items.write().unwrap().entry(id.to_string()).or_default().download = Some(geojson);
    }

    /// Serve `metadata` from `item/{id}/metadata`
    pub fn set_item_metadata(&self, id: &DatasetId, metadata: Value) {
        self.items.write().unwrap().entry(id.to_string()).or_default().metadata = Some(metadata);
    }

    /// Serve `tiles` from `item/{id}/tiles`
    pub fn set_item_tiles(&self, id: &DatasetId, tiles: Value) {
        self.items.write().unwrap().entry(id.to_string()).or_default().tiles = Some(tiles);
    }

    /// Delay every response for one exact path
    pub fn set_delay(&self, path: impl Into<String>, delay: Duration) {
        self.delays.write().unwrap().insert(path.into(), delay);
    }

    /// Requests served so far, as `"METHOD path"`
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().unwrap().clone()
    }

    fn allocate_id(&self) -> String {
        let mut next_id = self.next_id.write().unwrap();
        *next_id += 1;
        format!("{:024x}", *next_id)
    }

    async fn handle(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let path = path.trim_matches('/');
        self.requests.write().unwrap().push(format!("{} {}", method.as_str(), path));

        let delay = self.delays.read().unwrap().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.route(method, path, params, body)
    }

    fn route(
        &self,
        method: Method,
        path: &str,
        params: Params<'_>,
        body: Option<&Value>,
    ) -> Result<Value> {
        let segments: Vec<&str> = path.split('/').collect();
        match (method, segments.as_slice()) {
            (Method::Get, ["dataset"]) => to_value(&self.list_datasets()),
            (Method::Get, ["dataset", "search"]) => {
                let conditions = search_conditions(params)?;
                to_value(&self.search_datasets(&conditions))
            }
            (Method::Get, ["dataset", "workingset", id]) => {
                to_value(&self.working_set_datasets(&WorkingSetId::new(*id))?)
            }
            (Method::Get, ["dataset", id]) => {
                let datasets = self.datasets.read().unwrap();
                datasets
                    .get(&DatasetId::new(*id))
                    .map(to_value)
                    .unwrap_or_else(|| Err(ExplorerError::not_found(path)))
            }

            (Method::Get, ["workingSet"]) => {
                let mut working_sets: Vec<WorkingSet> =
                    self.working_sets.read().unwrap().values().cloned().collect();
                working_sets.sort_by(|a, b| a.id.cmp(&b.id));
                to_value(&working_sets)
            }
            (Method::Post, ["workingSet"]) => {
                let mut working_set: WorkingSet = from_body(body, path)?;
                working_set.id = None;
                let id = self.insert_working_set(working_set);
                self.entity(&self.working_sets, &id, path)
            }
            (method, ["workingSet", id]) => {
                let id = WorkingSetId::new(*id);
                match method {
                    Method::Get => self.entity(&self.working_sets, &id, path),
                    Method::Put => {
                        let mut working_set: WorkingSet = from_body(body, path)?;
                        working_set.id = Some(id.clone());
                        self.replace(&self.working_sets, id, working_set, path)
                    }
                    Method::Delete => self.remove(&self.working_sets, &id, path),
                    Method::Post => Err(unsupported(method, path)),
                }
            }

            (Method::Get, ["filter"]) => {
                let mut filters: Vec<Filter> =
                    self.filters.read().unwrap().values().cloned().collect();
                filters.sort_by(|a, b| a.id.cmp(&b.id));
                to_value(&filters)
            }
            (Method::Post, ["filter"]) => {
                let mut filter: Filter = from_body(body, path)?;
                filter.id = None;
                let id = self.insert_filter(filter);
                self.entity(&self.filters, &id, path)
            }
            (method, ["filter", id]) => {
                let id = FilterId::new(*id);
                match method {
                    Method::Get => self.entity(&self.filters, &id, path),
                    Method::Put => {
                        let mut filter: Filter = from_body(body, path)?;
                        filter.id = Some(id.clone());
                        self.replace(&self.filters, id, filter, path)
                    }
                    Method::Delete => self.remove(&self.filters, &id, path),
                    Method::Post => Err(unsupported(method, path)),
                }
            }

            (Method::Get, ["item", id, resource]) => {
                let items = self.items.read().unwrap();
                let payloads = items.get(*id);
                let payload = match *resource {
                    "download" => payloads.and_then(|p| p.download.clone()),
                    "metadata" => payloads.and_then(|p| p.metadata.clone()),
                    "tiles" => payloads.and_then(|p| p.tiles.clone()),
                    _ => None,
                };
                payload.ok_or_else(|| ExplorerError::not_found(path))
            }

            (method, _) => Err(unsupported(method, path)),
        }
    }

    fn list_datasets(&self) -> Vec<Dataset> {
        let mut datasets: Vec<Dataset> = self.datasets.read().unwrap().values().cloned().collect();
        datasets.sort_by(|a, b| a.id.cmp(&b.id));
        datasets
    }

    /// Datasets whose bounds intersect every region condition.
    /// Non-region conditions are not evaluated in memory.
    fn search_datasets(&self, conditions: &[Condition]) -> Vec<Dataset> {
        let regions: Vec<&geojson::Geometry> = conditions
            .iter()
            .filter_map(Condition::region_feature)
            .filter_map(|feature| feature.geometry.as_ref())
            .collect();

        self.list_datasets()
            .into_iter()
            .filter(|dataset| {
                regions.is_empty()
                    || dataset.bounds().is_some_and(|bounds| {
                        regions.iter().all(|region| geometries_intersect(bounds, region))
                    })
            })
            .collect()
    }

    fn working_set_datasets(&self, id: &WorkingSetId) -> Result<Vec<Dataset>> {
        let working_sets = self.working_sets.read().unwrap();
        let working_set = working_sets
            .get(id)
            .ok_or_else(|| ExplorerError::not_found(format!("workingSet/{}", id)))?;

        let datasets = self.datasets.read().unwrap();
        Ok(working_set.dataset_ids.iter().filter_map(|id| datasets.get(id).cloned()).collect())
    }

    fn entity<K, V>(&self, map: &RwLock<HashMap<K, V>>, id: &K, path: &str) -> Result<Value>
    where
        K: std::hash::Hash + Eq,
        V: serde::Serialize,
    {
        let map = map.read().unwrap();
        map.get(id).map(to_value).unwrap_or_else(|| Err(ExplorerError::not_found(path)))
    }

    fn replace<K, V>(&self, map: &RwLock<HashMap<K, V>>, id: K, value: V, path: &str) -> Result<Value>
    where
        K: std::hash::Hash + Eq,
        V: serde::Serialize,
    {
        let mut map = map.write().unwrap();
        if !map.contains_key(&id) {
            return Err(ExplorerError::not_found(path));
        }
        let stored = to_value(&value)?;
        map.insert(id, value);
        Ok(stored)
    }

    fn remove<K, V>(&self, map: &RwLock<HashMap<K, V>>, id: &K, path: &str) -> Result<Value>
    where
        K: std::hash::Hash + Eq,
    {
        map.write()
            .unwrap()
            .remove(id)
            .map(|_| Value::Null)
            .ok_or_else(|| ExplorerError::not_found(path))
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn get(&self, path: &str, params: Params<'_>) -> Result<Value> {
        self.handle(Method::Get, path, params, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.handle(Method::Post, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.handle(Method::Put, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value> {
        self.handle(Method::Delete, path, &[], None).await
    }
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn from_body<T: serde::de::DeserializeOwned>(body: Option<&Value>, path: &str) -> Result<T> {
    let body = body.ok_or_else(|| ExplorerError::invalid_input(format!("{}: missing body", path)))?;
    serde_json::from_value(body.clone())
        .map_err(|e| ExplorerError::invalid_input(format!("{}: {}", path, e)))
}

fn search_conditions(params: Params<'_>) -> Result<Vec<Condition>> {
    let Some((_, raw)) = params.iter().find(|(key, _)| *key == "conditions") else {
        return Ok(Vec::new());
    };
    serde_json::from_str(raw)
        .map_err(|e| ExplorerError::invalid_input(format!("Invalid conditions parameter: {}", e)))
}

fn unsupported(method: Method, path: &str) -> ExplorerError {
    ExplorerError::NetworkFailure {
        status: Some(405),
        message: format!("{} {} is not supported", method.as_str(), path),
    }
}
