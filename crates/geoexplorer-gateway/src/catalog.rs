//! Working set and filter persistence.
//!
//! Every mutation returns the entity as stored by the backend so callers can
//! replace their cached copy with it.

use geoexplorer_core::error::{ExplorerError, Result};
use geoexplorer_core::models::{Filter, FilterId, WorkingSet, WorkingSetId};

use crate::loader::decode;
use crate::ports::Gateway;

pub async fn load_working_sets(gateway: &dyn Gateway) -> Result<Vec<WorkingSet>> {
    let value = gateway.get("workingSet", &[]).await?;
    decode(value, "working set list")
}

pub async fn load_working_set(gateway: &dyn Gateway, id: &WorkingSetId) -> Result<WorkingSet> {
    let value = gateway.get(&format!("workingSet/{}", id), &[]).await?;
    decode(value, "working set")
}

/// Create a working set; the returned copy carries the assigned id
pub async fn create_working_set(gateway: &dyn Gateway, working_set: &WorkingSet) -> Result<WorkingSet> {
    let value = gateway.post("workingSet", &serde_json::to_value(working_set)?).await?;
    decode(value, "working set")
}

/// Save changes to a persisted working set
pub async fn save_working_set(gateway: &dyn Gateway, working_set: &WorkingSet) -> Result<WorkingSet> {
    let id = working_set
        .id
        .as_ref()
        .ok_or_else(|| ExplorerError::invalid_input("Cannot save a working set without an id"))?;
    let value = gateway.put(&format!("workingSet/{}", id), &serde_json::to_value(working_set)?).await?;
    decode(value, "working set")
}

pub async fn delete_working_set(gateway: &dyn Gateway, id: &WorkingSetId) -> Result<()> {
    gateway.delete(&format!("workingSet/{}", id)).await?;
    Ok(())
}

pub async fn load_filters(gateway: &dyn Gateway) -> Result<Vec<Filter>> {
    let value = gateway.get("filter", &[]).await?;
    decode(value, "filter list")
}

/// A persisted filter. A missing id fails with `NotFound`.
pub async fn load_filter(gateway: &dyn Gateway, id: &FilterId) -> Result<Filter> {
    let value = gateway.get(&format!("filter/{}", id), &[]).await?;
    decode(value, "filter")
}

pub async fn create_filter(gateway: &dyn Gateway, filter: &Filter) -> Result<Filter> {
    let value = gateway.post("filter", &serde_json::to_value(filter)?).await?;
    decode(value, "filter")
}

pub async fn save_filter(gateway: &dyn Gateway, filter: &Filter) -> Result<Filter> {
    let id = filter
        .id
        .as_ref()
        .ok_or_else(|| ExplorerError::invalid_input("Cannot save a filter without an id"))?;
    let value = gateway.put(&format!("filter/{}", id), &serde_json::to_value(filter)?).await?;
    decode(value, "filter")
}

pub async fn delete_filter(gateway: &dyn Gateway, id: &FilterId) -> Result<()> {
    gateway.delete(&format!("filter/{}", id)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGateway;

    #[tokio::test]
    async fn test_working_set_lifecycle() {
        let gateway = MemoryGateway::new();

        let created = create_working_set(&gateway, &WorkingSet::new("Site A")).await.unwrap();
        let id = created.id.clone().unwrap();

        let mut renamed = created.clone();
        renamed.name = "Site B".to_string();
        let saved = save_working_set(&gateway, &renamed).await.unwrap();
        assert_eq!(saved.name, "Site B");
        assert_eq!(saved.id.as_ref(), Some(&id));

        assert_eq!(load_working_sets(&gateway).await.unwrap().len(), 1);
        delete_working_set(&gateway, &id).await.unwrap();
        assert!(load_working_set(&gateway, &id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_save_requires_id() {
        let gateway = MemoryGateway::new();
        let err = save_filter(&gateway, &Filter::new("unsaved")).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_filter_round_trip_through_backend() {
        let gateway = MemoryGateway::new();
        let created = create_filter(&gateway, &Filter::new("Downtown")).await.unwrap();
        assert!(created.is_saved());

        let loaded = load_filter(&gateway, created.id.as_ref().unwrap()).await.unwrap();
        assert_eq!(loaded, created);
        assert_eq!(load_filters(&gateway).await.unwrap(), vec![created]);
    }
}
