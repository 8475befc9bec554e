use geoexplorer_core::config::LayeredConfig;
use geoexplorer_core::error::Result;
use geoexplorer_core::models::{Condition, DatasetId, Filter, FilterId, WorkingSet, WorkingSetId};
use geoexplorer_gateway::ports::Gateway;
use geoexplorer_gateway::{catalog, loader};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::filter::{FilterCatalog, FilterState};
use crate::working_set::{WorkingSetCatalog, WorkingSetState};
use crate::workspace::WorkspaceState;

/// Store behavior switches
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Leave the selected condition out of the editing conditions layer
    pub exclude_selected_condition: bool,
}

impl StoreOptions {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self { exclude_selected_condition: config.exclude_selected_condition.value }
    }
}

/// Everything the explorer holds in memory
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub filter: FilterState,
    pub filters: FilterCatalog,
    pub working_set: WorkingSetState,
    pub working_sets: WorkingSetCatalog,
    pub workspace: WorkspaceState,
}

impl AppState {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            filter: FilterState::new().with_exclude_selected_condition(options.exclude_selected_condition),
            working_set: WorkingSetState::new()
                .with_exclude_selected_condition(options.exclude_selected_condition),
            ..Default::default()
        }
    }
}

/// Owner of the application state.
///
/// Synchronous changes go through [`update`](Self::update), each one applied
/// as a single step under the write lock. Backend actions release the lock
/// while the request is in flight and reacquire it to apply the response.
pub struct AppStore<G: Gateway> {
    gateway: Arc<G>,
    state: Arc<RwLock<AppState>>,
}

impl<G: Gateway> Clone for AppStore<G> {
    fn clone(&self) -> Self {
        Self { gateway: self.gateway.clone(), state: self.state.clone() }
    }
}

impl<G: Gateway> AppStore<G> {
    pub fn new(gateway: G, options: StoreOptions) -> Self {
        Self::with_shared_gateway(Arc::new(gateway), options)
    }

    pub fn with_shared_gateway(gateway: Arc<G>, options: StoreOptions) -> Self {
        Self { gateway, state: Arc::new(RwLock::new(AppState::new(options))) }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Read access to the current state
    pub fn read(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply one change to the state
    pub fn update<R>(&self, change: impl FnOnce(&mut AppState) -> R) -> R {
        change(&mut self.write())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the filter editor's datasets with those matching `conditions`.
    ///
    /// Returns false when a later load was started before this one finished;
    /// the superseded result is dropped.
    pub async fn load_filter_datasets(&self, conditions: &[Condition]) -> Result<bool> {
        let ticket = self.write().filter.begin_dataset_load();
        let datasets = loader::load_dataset_by_filter_conditions(&*self.gateway, conditions).await?;
        Ok(self.write().filter.finish_dataset_load(ticket, datasets))
    }

    /// Replace the working set editor's datasets with those matching `conditions`
    pub async fn load_dataset_by_filter_conditions(&self, conditions: &[Condition]) -> Result<bool> {
        let ticket = self.write().working_set.begin_dataset_load();
        let datasets = loader::load_dataset_by_filter_conditions(&*self.gateway, conditions).await?;
        Ok(self.write().working_set.finish_dataset_load(ticket, datasets))
    }

    /// Replace the working set editor's datasets with those of a working set
    pub async fn load_dataset_by_working_set_id(&self, id: &WorkingSetId) -> Result<bool> {
        let ticket = self.write().working_set.begin_dataset_load();
        let datasets = loader::load_dataset_by_working_set_id(&*self.gateway, id).await?;
        Ok(self.write().working_set.finish_dataset_load(ticket, datasets))
    }

    /// Replace the working set editor's datasets with the given ids; ids that
    /// fail to load are left out
    pub async fn load_dataset_by_ids(&self, ids: &[DatasetId]) -> bool {
        let ticket = self.write().working_set.begin_dataset_load();
        let datasets = loader::load_dataset_by_ids(&*self.gateway, ids).await;
        self.write().working_set.finish_dataset_load(ticket, datasets)
    }

    /// Adopt a persisted filter's conditions as the editing conditions
    pub async fn load_conditions_by_filter(&self, filter_id: &FilterId) -> Result<()> {
        let filter = catalog::load_filter(&*self.gateway, filter_id).await?;
        self.update(|state| state.working_set.set_editing_conditions(filter.conditions));
        Ok(())
    }

    pub async fn load_working_sets(&self) -> Result<()> {
        let working_sets = catalog::load_working_sets(&*self.gateway).await?;
        tracing::debug!("Loaded {} working sets", working_sets.len());
        self.update(|state| state.working_sets.replace_all(working_sets));
        Ok(())
    }

    /// Create an empty working set named `name`
    pub async fn try_add_working_set(&self, name: &str) -> Result<WorkingSet> {
        let created = catalog::create_working_set(&*self.gateway, &WorkingSet::new(name)).await?;
        self.update(|state| state.working_sets.add(created.clone()));
        Ok(created)
    }

    pub async fn save_working_set(&self, working_set: &WorkingSet) -> Result<WorkingSet> {
        let saved = catalog::save_working_set(&*self.gateway, working_set).await?;
        self.update(|state| state.working_sets.upsert(saved.clone()));
        Ok(saved)
    }

    /// Delete a working set. The selection is cleared first if it points at it.
    pub async fn delete_working_set(&self, id: &WorkingSetId) -> Result<()> {
        self.update(|state| {
            if state.working_sets.selected_working_set_id() == Some(id) {
                state.working_sets.select_working_set_id(None);
            }
        });
        catalog::delete_working_set(&*self.gateway, id).await?;
        self.update(|state| state.working_sets.remove(id));
        Ok(())
    }

    pub fn select_working_set_id(&self, id: Option<WorkingSetId>) {
        self.update(|state| state.working_sets.select_working_set_id(id));
    }

    pub async fn load_filters(&self) -> Result<()> {
        let filters = catalog::load_filters(&*self.gateway).await?;
        self.update(|state| state.filters.replace_all(filters));
        Ok(())
    }

    /// Persist a new filter; the backend's copy, with its id, is cached and returned
    pub async fn create_filter(&self, filter: &Filter) -> Result<Filter> {
        let created = catalog::create_filter(&*self.gateway, filter).await?;
        self.update(|state| state.filters.upsert(created.clone()));
        Ok(created)
    }

    pub async fn save_filter(&self, filter: &Filter) -> Result<Filter> {
        let saved = catalog::save_filter(&*self.gateway, filter).await?;
        self.update(|state| state.filters.upsert(saved.clone()));
        Ok(saved)
    }

    pub async fn delete_filter(&self, id: &FilterId) -> Result<()> {
        catalog::delete_filter(&*self.gateway, id).await?;
        self.update(|state| state.filters.remove(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoexplorer_core::models::Dataset;
    use geoexplorer_gateway::MemoryGateway;

    #[test]
    fn test_update_is_visible_to_readers() {
        let store = AppStore::new(MemoryGateway::new(), StoreOptions::default());
        let reader = store.clone();

        store.update(|state| state.filter.set_pick_date_range(true));
        assert!(reader.read().filter.pick_date_range());
    }

    #[test]
    fn test_options_reach_state() {
        let store = AppStore::new(
            MemoryGateway::new(),
            StoreOptions { exclude_selected_condition: true },
        );
        assert!(store.read().filter.exclude_selected_condition());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_datasets_cleared() {
        let store = AppStore::new(MemoryGateway::new(), StoreOptions::default());
        store.update(|state| {
            state.working_set.set_datasets(vec![Arc::new(Dataset::new("a", "A"))]);
        });

        let err = store.load_dataset_by_working_set_id(&WorkingSetId::new("missing")).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(store.read().working_set.datasets().is_empty());
    }
}
