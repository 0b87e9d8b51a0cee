//! Workspace Module
//!
//! Workspace names, count and the active workspace, as seen by the window
//! list.

use tracing::{debug, info, warn};

/// Special workspace value for sticky windows (all workspaces)
pub const ALL_WORKSPACES: u32 = 0xFFFFFFFF;

/// Source of workspace information for the window list
pub trait WorkspaceProvider {
    /// Number of workspaces
    fn count(&self) -> u32;

    /// Display name of a workspace
    fn name(&self, index: u32) -> String;

    /// Currently shown workspace
    fn active_index(&self) -> u32;

    /// Switch to a workspace (activating its header in the list)
    fn activate(&mut self, index: u32) {
        debug!("Workspace activation ignored: {}", index);
    }
}

/// In-process workspace table
#[derive(Debug, Clone)]
pub struct WorkspaceTable {
    /// Current workspace index (0-based)
    pub current_workspace: u32,

    /// Workspace names, one per workspace
    pub workspace_names: Vec<String>,
}

impl WorkspaceTable {
    /// Create a table with default names
    pub fn new(workspace_count: u32) -> Self {
        let workspace_names = (0..workspace_count).map(default_name).collect();

        Self {
            current_workspace: 0,
            workspace_names,
        }
    }

    /// Create a table from explicit names
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current_workspace: 0,
            workspace_names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Switch to a workspace
    pub fn switch_workspace(&mut self, workspace: u32) {
        if workspace >= self.count() {
            warn!("Invalid workspace index: {} (count: {})", workspace, self.count());
            return;
        }

        if workspace == self.current_workspace {
            debug!("Already on workspace {}", workspace);
            return;
        }

        info!("Switching from workspace {} to {}", self.current_workspace, workspace);
        self.current_workspace = workspace;
    }

    /// Set workspace count
    pub fn set_workspace_count(&mut self, count: u32) {
        if count == 0 {
            warn!("Cannot set workspace count to 0");
            return;
        }

        info!("Setting workspace count to {}", count);

        if self.current_workspace >= count {
            self.current_workspace = count - 1;
        }

        while self.workspace_names.len() < count as usize {
            let idx = self.workspace_names.len() as u32;
            self.workspace_names.push(default_name(idx));
        }
        self.workspace_names.truncate(count as usize);
    }
}

fn default_name(index: u32) -> String {
    format!("Workspace {}", index + 1)
}

impl WorkspaceProvider for WorkspaceTable {
    fn count(&self) -> u32 {
        self.workspace_names.len() as u32
    }

    fn name(&self, index: u32) -> String {
        self.workspace_names
            .get(index as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn active_index(&self) -> u32 {
        self.current_workspace
    }

    fn activate(&mut self, index: u32) {
        self.switch_workspace(index);
    }
}
