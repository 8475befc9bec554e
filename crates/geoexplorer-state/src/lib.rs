//! geoexplorer state - Application state and derived views
//!
//! This crate holds the filter, working set and workspace state of the
//! explorer, the GeoJSON views derived from it, and the [`AppStore`] that
//! owns all of it behind a single-writer API and runs backend actions.

pub mod filter;
pub mod sequencer;
pub mod store;
pub mod views;
pub mod working_set;
pub mod workspace;

pub use filter::{FilterCatalog, FilterPhase, FilterState};
pub use sequencer::{RequestSequencer, RequestTicket};
pub use store::{AppState, AppStore, StoreOptions};
pub use working_set::{
    build_forest, flatten_forest, FlatWorkingSet, WorkingSetCatalog, WorkingSetNode,
    WorkingSetState,
};
pub use workspace::WorkspaceState;
