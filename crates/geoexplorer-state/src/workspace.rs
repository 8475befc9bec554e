use geoexplorer_core::error::{ExplorerError, Result};
use geoexplorer_core::models::{Dataset, Layer, Workspace, WorkspaceId, WorkspaceKind};
use std::sync::Arc;

/// Key of the workspace created by [`WorkspaceState::reset_workspace`]
pub const DEFAULT_WORKSPACE_KEY: &str = "0";

/// The visualization panes, in creation order, and which one has focus.
///
/// The focused key is stored as given; when it does not name an existing
/// workspace, focus falls back to the first one.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    workspaces: Vec<Workspace>,
    focused_key: WorkspaceId,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        let key = WorkspaceId::new(DEFAULT_WORKSPACE_KEY);
        Self {
            workspaces: vec![Workspace::new(key.clone(), WorkspaceKind::Map)],
            focused_key: key,
        }
    }
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn get(&self, key: &WorkspaceId) -> Option<&Workspace> {
        self.workspaces.iter().find(|workspace| &workspace.id == key)
    }

    fn get_mut(&mut self, key: &WorkspaceId) -> Result<&mut Workspace> {
        self.workspaces
            .iter_mut()
            .find(|workspace| &workspace.id == key)
            .ok_or_else(|| ExplorerError::not_found(format!("workspace {}", key)))
    }

    /// Create an empty workspace under a fresh key
    pub fn add_workspace(&mut self, kind: WorkspaceKind) -> WorkspaceId {
        let key = WorkspaceId::generate();
        tracing::debug!("Adding {} workspace {}", kind.name(), key);
        self.workspaces.push(Workspace::new(key.clone(), kind));
        key
    }

    pub fn remove_workspace(&mut self, key: &WorkspaceId) -> Option<Workspace> {
        let position = self.workspaces.iter().position(|workspace| &workspace.id == key)?;
        Some(self.workspaces.remove(position))
    }

    /// Switch a workspace to another type; its layers are dropped
    pub fn change_workspace_type(&mut self, key: &WorkspaceId, kind: WorkspaceKind) -> Result<()> {
        let workspace = self.get_mut(key)?;
        workspace.kind = kind;
        workspace.layers.clear();
        Ok(())
    }

    /// Turn textures on or off for a 3D workspace
    pub fn set_workspace_texture(&mut self, key: &WorkspaceId, texture: bool) -> Result<()> {
        let workspace = self.get_mut(key)?;
        match &mut workspace.kind {
            WorkspaceKind::Vtk { texture: current } => {
                *current = texture;
                Ok(())
            }
            WorkspaceKind::Map => Err(ExplorerError::invalid_input(format!(
                "Workspace {} is a map and has no texture setting",
                key
            ))),
        }
    }

    pub fn set_focused_workspace_key(&mut self, key: WorkspaceId) {
        self.focused_key = key;
    }

    /// The focused workspace, or the first one when the focused key is stale
    pub fn focused_workspace(&self) -> Option<&Workspace> {
        self.get(&self.focused_key).or_else(|| self.workspaces.first())
    }

    /// Key of [`focused_workspace`](Self::focused_workspace)
    pub fn focused_workspace_key(&self) -> Option<&WorkspaceId> {
        self.focused_workspace().map(|workspace| &workspace.id)
    }

    pub fn add_dataset_to_workspace(&mut self, key: &WorkspaceId, dataset: Arc<Dataset>) -> Result<()> {
        self.get_mut(key)?.layers.push(Layer::new(dataset));
        Ok(())
    }

    /// Remove the layers holding this exact dataset instance. Returns false,
    /// leaving the layers untouched, when none does.
    pub fn remove_dataset_from_workspace(&mut self, key: &WorkspaceId, dataset: &Arc<Dataset>) -> Result<bool> {
        let layers = &mut self.get_mut(key)?.layers;
        let before = layers.len();
        layers.retain(|layer| !layer.holds(dataset));
        Ok(layers.len() != before)
    }

    pub fn remove_all_datasets_from_workspaces(&mut self) {
        for workspace in &mut self.workspaces {
            workspace.layers.clear();
        }
    }

    /// Replace every workspace with a single map workspace keyed `"0"`
    pub fn reset_workspace(&mut self) {
        *self = Self::default();
    }

    /// Set a layer's opacity. The value is stored as given.
    pub fn set_workspace_layer_opacity(&mut self, key: &WorkspaceId, layer: usize, opacity: f64) -> Result<()> {
        let workspace = self.get_mut(key)?;
        let layer = workspace
            .layers
            .get_mut(layer)
            .ok_or_else(|| ExplorerError::not_found(format!("layer {} of workspace {}", layer, key)))?;
        layer.opacity = opacity;
        Ok(())
    }
}
