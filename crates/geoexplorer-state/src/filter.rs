use geoexplorer_core::models::{Condition, Dataset, Filter, FilterId};
use geojson::{Feature, FeatureCollection};
use serde_json::Value;
use std::sync::Arc;

use crate::sequencer::{RequestSequencer, RequestTicket};
use crate::views;

/// Whether a filter is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    Idle,
    Editing,
}

/// State of the filter editor: the filter being edited, its conditions,
/// and the datasets those conditions currently match.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    editing_filter: Option<Filter>,
    selected_condition: Option<Condition>,
    editing_conditions: Option<Vec<Condition>>,
    annotations: Vec<Value>,
    pick_date_range: bool,
    upload_geojson_dialog: bool,
    datasets: Vec<Arc<Dataset>>,
    selected_dataset: Option<Arc<Dataset>>,
    exclude_selected_condition: bool,
    sequencer: RequestSequencer,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave the selected condition out of [`editing_conditions_geojson`](Self::editing_conditions_geojson)
    pub fn with_exclude_selected_condition(mut self, exclude: bool) -> Self {
        self.exclude_selected_condition = exclude;
        self
    }

    pub fn phase(&self) -> FilterPhase {
        if self.editing_filter.is_some() {
            FilterPhase::Editing
        } else {
            FilterPhase::Idle
        }
    }

    /// Start or stop editing. Stopping also drops the selected condition
    /// and the editing conditions.
    pub fn set_editing_filter(&mut self, filter: Option<Filter>) {
        if filter.is_none() {
            self.selected_condition = None;
            self.editing_conditions = None;
        }
        tracing::debug!(
            "Filter editor {}",
            if filter.is_some() { "editing" } else { "idle" }
        );
        self.editing_filter = filter;
    }

    pub fn set_selected_condition(&mut self, condition: Option<Condition>) {
        self.selected_condition = condition;
    }

    pub fn set_editing_conditions(&mut self, conditions: Option<Vec<Condition>>) {
        self.editing_conditions = conditions;
    }

    pub fn set_annotations(&mut self, annotations: Vec<Value>) {
        self.annotations = annotations;
    }

    pub fn set_pick_date_range(&mut self, value: bool) {
        self.pick_date_range = value;
    }

    pub fn set_upload_geojson_dialog(&mut self, value: bool) {
        self.upload_geojson_dialog = value;
    }

    pub fn set_datasets(&mut self, datasets: Vec<Arc<Dataset>>) {
        self.datasets = datasets;
    }

    pub fn set_selected_dataset(&mut self, dataset: Option<Arc<Dataset>>) {
        self.selected_dataset = dataset;
    }

    pub fn editing_filter(&self) -> Option<&Filter> {
        self.editing_filter.as_ref()
    }

    pub fn selected_condition(&self) -> Option<&Condition> {
        self.selected_condition.as_ref()
    }

    pub fn editing_conditions(&self) -> Option<&[Condition]> {
        self.editing_conditions.as_deref()
    }

    pub fn annotations(&self) -> &[Value] {
        &self.annotations
    }

    pub fn pick_date_range(&self) -> bool {
        self.pick_date_range
    }

    pub fn upload_geojson_dialog(&self) -> bool {
        self.upload_geojson_dialog
    }

    pub fn datasets(&self) -> &[Arc<Dataset>] {
        &self.datasets
    }

    pub fn selected_dataset(&self) -> Option<&Arc<Dataset>> {
        self.selected_dataset.as_ref()
    }

    pub fn exclude_selected_condition(&self) -> bool {
        self.exclude_selected_condition
    }

    /// Region conditions as a FeatureCollection, or `None` when there are no
    /// editing conditions at all
    pub fn editing_conditions_geojson(&self) -> Option<FeatureCollection> {
        let conditions = self.editing_conditions.as_deref()?;
        let excluded = self
            .selected_condition
            .as_ref()
            .filter(|_| self.exclude_selected_condition);
        Some(views::conditions_geojson(conditions, excluded))
    }

    pub fn editing_selected_condition_geojson(&self) -> Option<&Feature> {
        views::selected_condition_geojson(self.selected_condition.as_ref())
    }

    /// Representative point of the selected dataset
    pub fn selected_dataset_point(&self) -> Option<geojson::Geometry> {
        self.selected_dataset.as_deref().and_then(views::dataset_point)
    }

    pub fn heatmap_data(&self) -> Vec<[f64; 2]> {
        views::heatmap_points(&self.datasets)
    }

    pub fn datasets_geojson(&self) -> FeatureCollection {
        views::datasets_geojson(&self.datasets)
    }

    pub(crate) fn begin_dataset_load(&mut self) -> RequestTicket {
        self.sequencer.issue()
    }

    /// Apply a load result if `ticket` is still the latest one issued
    pub(crate) fn finish_dataset_load(&mut self, ticket: RequestTicket, datasets: Vec<Dataset>) -> bool {
        if !self.sequencer.is_current(ticket) {
            tracing::debug!("Discarding superseded filter dataset load {}", ticket.value());
            return false;
        }
        self.datasets = datasets.into_iter().map(Arc::new).collect();
        true
    }
}

/// Cached copy of the filters persisted on the backend
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    filters: Vec<Filter>,
}

impl FilterCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn get(&self, id: &FilterId) -> Option<&Filter> {
        self.filters.iter().find(|filter| filter.id.as_ref() == Some(id))
    }

    pub fn replace_all(&mut self, filters: Vec<Filter>) {
        self.filters = filters;
    }

    /// Replace the cached copy with the same id, or append
    pub fn upsert(&mut self, filter: Filter) {
        let existing = self
            .filters
            .iter_mut()
            .find(|cached| cached.id.is_some() && cached.id == filter.id);
        match existing {
            Some(cached) => *cached = filter,
            None => self.filters.push(filter),
        }
    }

    pub fn remove(&mut self, id: &FilterId) -> Option<Filter> {
        let index = self.filters.iter().position(|filter| filter.id.as_ref() == Some(id))?;
        Some(self.filters.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures::*;

    fn editing() -> FilterState {
        let mut state = FilterState::new();
        state.set_editing_filter(Some(Filter::new("Downtown")));
        state.set_editing_conditions(Some(vec![region(0.0, 0.0), date_range(), region(5.0, 5.0)]));
        state.set_selected_condition(Some(region(5.0, 5.0)));
        state
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = editing();
        assert_eq!(state.phase(), FilterPhase::Editing);

        state.set_editing_filter(None);

        assert_eq!(state.phase(), FilterPhase::Idle);
        assert!(state.selected_condition().is_none());
        assert!(state.editing_conditions().is_none());
        assert!(state.editing_conditions_geojson().is_none());
    }

    #[test]
    fn test_switching_filters_keeps_conditions() {
        let mut state = editing();
        state.set_editing_filter(Some(Filter::new("Uptown")));
        assert_eq!(state.editing_conditions().map(<[Condition]>::len), Some(3));
    }

    #[test]
    fn test_selected_condition_included_by_default() {
        let state = editing();
        assert_eq!(state.editing_conditions_geojson().unwrap().features.len(), 2);
        assert!(state.editing_selected_condition_geojson().is_some());
    }

    #[test]
    fn test_selected_condition_excluded_when_configured() {
        let mut state = FilterState::new().with_exclude_selected_condition(true);
        state.set_editing_filter(Some(Filter::new("Downtown")));
        state.set_editing_conditions(Some(vec![region(0.0, 0.0), region(5.0, 5.0)]));
        state.set_selected_condition(Some(region(5.0, 5.0)));

        assert_eq!(state.editing_conditions_geojson().unwrap().features.len(), 1);
    }

    #[test]
    fn test_dataset_views() {
        let mut state = FilterState::new();
        state.set_datasets(vec![dataset("a", 0.0, 0.0), dataset("b", 10.0, 10.0)]);
        state.set_selected_dataset(Some(dataset("b", 10.0, 10.0)));

        assert_eq!(state.heatmap_data().len(), 2);
        assert_eq!(state.datasets_geojson().features.len(), 2);
        match state.selected_dataset_point().map(|g| g.value) {
            Some(geojson::Value::Point(position)) => {
                assert!((10.0..=12.0).contains(&position[0]));
                assert!((10.0..=12.0).contains(&position[1]));
            }
            other => panic!("expected a point, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut state = FilterState::new();
        let first = state.begin_dataset_load();
        let second = state.begin_dataset_load();

        assert!(state.finish_dataset_load(second, vec![Dataset::new("new", "New")]));
        assert!(!state.finish_dataset_load(first, vec![Dataset::new("old", "Old")]));
        assert_eq!(state.datasets()[0].name, "New");
    }

    #[test]
    fn test_catalog_upsert_and_remove() {
        let mut catalog = FilterCatalog::new();
        let mut filter = Filter::new("Downtown");
        filter.id = Some(FilterId::new("f1"));
        catalog.upsert(filter.clone());

        filter.name = "Downtown (2020)".to_string();
        catalog.upsert(filter);
        assert_eq!(catalog.filters().len(), 1);
        assert_eq!(catalog.get(&FilterId::new("f1")).unwrap().name, "Downtown (2020)");

        assert!(catalog.remove(&FilterId::new("f1")).is_some());
        assert!(catalog.remove(&FilterId::new("f1")).is_none());
    }
}
