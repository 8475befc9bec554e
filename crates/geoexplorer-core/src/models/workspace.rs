use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::Dataset;
use crate::error::ExplorerError;

/// Opaque key of a workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh unique key
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visualization type of a workspace. Type-specific settings live in the
/// variant, so a map workspace never carries a texture flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkspaceKind {
    /// 2D map
    Map,
    /// 3D viewer
    Vtk { texture: bool },
}

impl WorkspaceKind {
    /// The 3D viewer with textures enabled
    pub fn vtk() -> Self {
        WorkspaceKind::Vtk { texture: true }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkspaceKind::Map => "map",
            WorkspaceKind::Vtk { .. } => "vtk",
        }
    }

    pub fn texture(&self) -> Option<bool> {
        match self {
            WorkspaceKind::Map => None,
            WorkspaceKind::Vtk { texture } => Some(*texture),
        }
    }
}

impl FromStr for WorkspaceKind {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "map" => Ok(WorkspaceKind::Map),
            "vtk" => Ok(WorkspaceKind::vtk()),
            _ => Err(ExplorerError::invalid_input(format!(
                "Invalid workspace type: {}. Use map or vtk",
                s
            ))),
        }
    }
}

/// A dataset placed into a workspace
#[derive(Debug, Clone)]
pub struct Layer {
    pub dataset: Arc<Dataset>,
    pub opacity: f64,
}

impl Layer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset, opacity: 1.0 }
    }

    /// Whether this layer wraps this exact dataset instance
    pub fn holds(&self, dataset: &Arc<Dataset>) -> bool {
        Arc::ptr_eq(&self.dataset, dataset)
    }
}

/// A visualization pane
#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub kind: WorkspaceKind,
    pub layers: Vec<Layer>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, kind: WorkspaceKind) -> Self {
        Self { id, kind, layers: Vec::new() }
    }
}
