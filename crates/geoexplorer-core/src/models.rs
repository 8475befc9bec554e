pub mod dataset;
pub mod filter;
pub mod working_set;
pub mod workspace;

pub use dataset::{Dataset, DatasetId, Geometa};
pub use filter::{Condition, Filter, FilterId};
pub use working_set::{WorkingSet, WorkingSetId};
pub use workspace::{Layer, Workspace, WorkspaceId, WorkspaceKind};
