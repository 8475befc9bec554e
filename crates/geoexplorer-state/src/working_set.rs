mod hierarchy;

pub use hierarchy::{build_forest, flatten_forest, FlatWorkingSet, WorkingSetNode};

use geoexplorer_core::models::{Condition, Dataset, WorkingSet, WorkingSetId};
use geojson::{Feature, FeatureCollection};
use std::sync::Arc;

use crate::sequencer::{RequestSequencer, RequestTicket};
use crate::views;

/// State of the working set editor
#[derive(Debug, Clone, Default)]
pub struct WorkingSetState {
    editing_working_set: Option<WorkingSet>,
    datasets: Vec<Arc<Dataset>>,
    selected_dataset: Option<Arc<Dataset>>,
    selected_condition: Option<Condition>,
    upload_geojson_dialog: bool,
    editing_conditions: Vec<Condition>,
    exclude_selected_condition: bool,
    sequencer: RequestSequencer,
}

impl WorkingSetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclude_selected_condition(mut self, exclude: bool) -> Self {
        self.exclude_selected_condition = exclude;
        self
    }

    pub fn set_editing_working_set(&mut self, working_set: Option<WorkingSet>) {
        self.editing_working_set = working_set;
    }

    pub fn set_datasets(&mut self, datasets: Vec<Arc<Dataset>>) {
        self.datasets = datasets;
    }

    pub fn set_selected_dataset(&mut self, dataset: Option<Arc<Dataset>>) {
        self.selected_dataset = dataset;
    }

    pub fn set_selected_condition(&mut self, condition: Option<Condition>) {
        self.selected_condition = condition;
    }

    pub fn set_editing_conditions(&mut self, conditions: Vec<Condition>) {
        self.editing_conditions = conditions;
    }

    pub fn set_upload_geojson_dialog(&mut self, value: bool) {
        self.upload_geojson_dialog = value;
    }

    /// Reset datasets, editing conditions and the edited working set in one step
    pub fn clear(&mut self) {
        self.datasets.clear();
        self.editing_conditions.clear();
        self.editing_working_set = None;
    }

    pub fn editing_working_set(&self) -> Option<&WorkingSet> {
        self.editing_working_set.as_ref()
    }

    pub fn datasets(&self) -> &[Arc<Dataset>] {
        &self.datasets
    }

    pub fn selected_dataset(&self) -> Option<&Arc<Dataset>> {
        self.selected_dataset.as_ref()
    }

    pub fn selected_condition(&self) -> Option<&Condition> {
        self.selected_condition.as_ref()
    }

    pub fn editing_conditions(&self) -> &[Condition] {
        &self.editing_conditions
    }

    pub fn upload_geojson_dialog(&self) -> bool {
        self.upload_geojson_dialog
    }

    pub fn editing_conditions_geojson(&self) -> FeatureCollection {
        let excluded = self
            .selected_condition
            .as_ref()
            .filter(|_| self.exclude_selected_condition);
        views::conditions_geojson(&self.editing_conditions, excluded)
    }

    pub fn editing_selected_condition_geojson(&self) -> Option<&Feature> {
        views::selected_condition_geojson(self.selected_condition.as_ref())
    }

    pub fn datasets_geojson(&self) -> FeatureCollection {
        views::datasets_geojson(&self.datasets)
    }

    /// Drop the current datasets and take a ticket for the load replacing them
    pub(crate) fn begin_dataset_load(&mut self) -> RequestTicket {
        self.datasets.clear();
        self.sequencer.issue()
    }

    pub(crate) fn finish_dataset_load(&mut self, ticket: RequestTicket, datasets: Vec<Dataset>) -> bool {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!("Discarding superseded working set dataset load {}", ticket.value());
            return false;
        }
        self.datasets = datasets.into_iter().map(Arc::new).collect();
        true
    }
}

/// Cached copy of the persisted working sets and the current selection
#[derive(Debug, Clone, Default)]
pub struct WorkingSetCatalog {
    working_sets: Vec<WorkingSet>,
    selected_working_set_id: Option<WorkingSetId>,
}

impl WorkingSetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working_sets(&self) -> &[WorkingSet] {
        &self.working_sets
    }

    pub fn get(&self, id: &WorkingSetId) -> Option<&WorkingSet> {
        self.working_sets.iter().find(|ws| ws.id.as_ref() == Some(id))
    }

    pub fn replace_all(&mut self, working_sets: Vec<WorkingSet>) {
        self.working_sets = working_sets;
    }

    pub fn add(&mut self, working_set: WorkingSet) {
        self.working_sets.push(working_set);
    }

    /// Replace the cached copy with the same id, or append
    pub fn upsert(&mut self, working_set: WorkingSet) {
        let existing = self
            .working_sets
            .iter_mut()
            .find(|cached| cached.id.is_some() && cached.id == working_set.id);
        match existing {
            Some(cached) => *cached = working_set,
            None => self.working_sets.push(working_set),
        }
    }

    /// Remove a working set, clearing the selection if it pointed at it
    pub fn remove(&mut self, id: &WorkingSetId) -> Option<WorkingSet> {
        if self.selected_working_set_id.as_ref() == Some(id) {
            self.selected_working_set_id = None;
        }
        let position = self.working_sets.iter().position(|ws| ws.id.as_ref() == Some(id))?;
        Some(self.working_sets.remove(position))
    }

    pub fn select_working_set_id(&mut self, id: Option<WorkingSetId>) {
        self.selected_working_set_id = id;
    }

    pub fn selected_working_set_id(&self) -> Option<&WorkingSetId> {
        self.selected_working_set_id.as_ref()
    }

    pub fn selected(&self) -> Option<&WorkingSet> {
        self.selected_working_set_id.as_ref().and_then(|id| self.get(id))
    }

    /// The catalog as an indented tree listing
    pub fn flattened(&self) -> Vec<FlatWorkingSet<'_>> {
        flatten_forest(&build_forest(&self.working_sets))
    }
}
