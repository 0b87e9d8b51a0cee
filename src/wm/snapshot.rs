//! Window snapshots
//!
//! An in-memory window table loaded from JSON. It stands in for the live
//! window manager in the inspection tool and in tests.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::shared::Geometry;
use crate::wm::client_flags::{Capabilities, Layer, Modifiers, WindowFlagsSnapshot, WindowState};
use crate::wm::controller::{CommandError, WindowController};
use crate::wm::entry::{ClassHint, Section, WindowRef};
use crate::wm::menu::{Arrangement, Command};
use crate::wm::workspace::WorkspaceTable;

/// Snapshot of a window manager session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub workspaces: Vec<String>,
    pub active_workspace: u32,
    pub focused: Option<WindowRef>,
    pub screens: Vec<Geometry>,
    pub windows: Vec<WindowSpec>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            workspaces: vec!["Workspace 1".into()],
            active_workspace: 0,
            focused: None,
            screens: vec![Geometry::new(0, 0, 1920, 1080)],
            windows: Vec::new(),
        }
    }
}

impl Snapshot {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {:?}", path))?;
        let snapshot = Self::from_json(&content)
            .with_context(|| format!("Failed to parse snapshot {:?}", path))?;
        info!("Loaded {} windows from {:?}", snapshot.windows.len(), path);
        Ok(snapshot)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn workspace_table(&self) -> WorkspaceTable {
        let mut table = WorkspaceTable::with_names(self.workspaces.iter().cloned());
        table.switch_workspace(self.active_workspace);
        table
    }
}

/// Actions a snapshot window accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySpec {
    pub restore: bool,
    pub minimize: bool,
    pub maximize: bool,
    pub show: bool,
    pub hide: bool,
    pub rollup: bool,
    pub raise: bool,
    pub lower: bool,
    pub close: bool,
    pub toggle_tray: bool,
}

impl Default for CapabilitySpec {
    fn default() -> Self {
        Self {
            restore: true,
            minimize: true,
            maximize: true,
            show: true,
            hide: true,
            rollup: true,
            raise: true,
            lower: true,
            close: true,
            toggle_tray: true,
        }
    }
}

impl CapabilitySpec {
    fn to_flags(self) -> Capabilities {
        let mut caps = Capabilities::empty();
        caps.set(Capabilities::RESTORE, self.restore);
        caps.set(Capabilities::MINIMIZE, self.minimize);
        caps.set(Capabilities::MAXIMIZE, self.maximize);
        caps.set(Capabilities::SHOW, self.show);
        caps.set(Capabilities::HIDE, self.hide);
        caps.set(Capabilities::ROLLUP, self.rollup);
        caps.set(Capabilities::RAISE, self.raise);
        caps.set(Capabilities::LOWER, self.lower);
        caps.set(Capabilities::CLOSE, self.close);
        caps.set(Capabilities::TOGGLE_TRAY, self.toggle_tray);
        caps
    }
}

/// One window of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSpec {
    pub id: WindowRef,
    pub title: String,
    pub workspace: u32,
    /// On all workspaces
    pub sticky: bool,
    pub owner: Option<WindowRef>,
    pub leader: Option<WindowRef>,
    pub class: Option<ClassHint>,
    pub skip_window_list: bool,
    pub minimized: bool,
    pub maximized_vert: bool,
    pub maximized_horiz: bool,
    pub fullscreen: bool,
    pub hidden: bool,
    pub rolled_up: bool,
    pub tray_icon: bool,
    pub layer: Layer,
    pub capabilities: CapabilitySpec,
}

impl WindowSpec {
    pub fn new(id: WindowRef, workspace: u32) -> Self {
        Self {
            id,
            title: format!("Window {}", id),
            workspace,
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(ClassHint::new(class.to_lowercase(), class));
        self
    }

    pub fn owned_by(mut self, owner: WindowRef) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn flags(&self) -> WindowFlagsSnapshot {
        let mut state = WindowState::empty();
        state.set(WindowState::MINIMIZED, self.minimized);
        state.set(WindowState::MAXIMIZED_VERT, self.maximized_vert);
        state.set(WindowState::MAXIMIZED_HORIZ, self.maximized_horiz);
        state.set(WindowState::FULLSCREEN, self.fullscreen);
        state.set(WindowState::HIDDEN, self.hidden);
        state.set(WindowState::ROLLED_UP, self.rolled_up);
        state.set(WindowState::TRAY_ICON, self.tray_icon);
        state.set(WindowState::ALL_WORKSPACES, self.sticky);

        WindowFlagsSnapshot {
            state,
            caps: self.capabilities.to_flags(),
            workspace: Section::Workspace(self.workspace),
            layer: self.layer,
        }
    }
}

/// Window controller backed by a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotController {
    windows: BTreeMap<WindowRef, WindowSpec>,
    focused: Option<WindowRef>,
    failing: HashSet<WindowRef>,

    /// Commands applied so far, in order
    pub applied: Vec<(Command, WindowRef)>,

    /// Arrangements applied so far, in order
    pub arranged: Vec<(Arrangement, Vec<WindowRef>)>,
}

impl SnapshotController {
    pub fn new(windows: impl IntoIterator<Item = WindowSpec>) -> Self {
        Self {
            windows: windows.into_iter().map(|spec| (spec.id, spec)).collect(),
            ..Default::default()
        }
    }

    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut controller = Self::new(snapshot.windows.iter().cloned());
        controller.focused = snapshot.focused;
        controller
    }

    /// Window ids, ascending
    pub fn window_ids(&self) -> Vec<WindowRef> {
        self.windows.keys().copied().collect()
    }

    pub fn window(&self, id: WindowRef) -> Option<&WindowSpec> {
        self.windows.get(&id)
    }

    pub fn window_mut(&mut self, id: WindowRef) -> Option<&mut WindowSpec> {
        self.windows.get_mut(&id)
    }

    pub fn insert(&mut self, spec: WindowSpec) {
        self.windows.insert(spec.id, spec);
    }

    pub fn remove(&mut self, id: WindowRef) -> Option<WindowSpec> {
        self.windows.remove(&id)
    }

    pub fn set_focused(&mut self, window: Option<WindowRef>) {
        self.focused = window;
    }

    /// Make every command against `window` fail
    pub fn fail_on(&mut self, window: WindowRef) {
        self.failing.insert(window);
    }
}

impl WindowController for SnapshotController {
    fn get_flags(&self, window: WindowRef) -> WindowFlagsSnapshot {
        self.windows
            .get(&window)
            .map(WindowSpec::flags)
            .unwrap_or_default()
    }

    fn apply(
        &mut self,
        command: Command,
        window: WindowRef,
        _modifiers: Modifiers,
    ) -> Result<(), CommandError> {
        if self.failing.contains(&window) {
            return Err(CommandError::Failed(format!(
                "window {} refused {:?}",
                window, command
            )));
        }

        let spec = self
            .windows
            .get_mut(&window)
            .ok_or(CommandError::WindowGone(window))?;

        match command {
            Command::Restore => {
                spec.minimized = false;
                spec.maximized_vert = false;
                spec.maximized_horiz = false;
                spec.fullscreen = false;
                spec.rolled_up = false;
            }
            Command::Minimize => spec.minimized = true,
            Command::Maximize => {
                spec.maximized_vert = true;
                spec.maximized_horiz = true;
            }
            Command::MaximizeVert => spec.maximized_vert = true,
            Command::MaximizeHoriz => spec.maximized_horiz = true,
            Command::Fullscreen => spec.fullscreen = !spec.fullscreen,
            Command::Show => spec.hidden = false,
            Command::Hide => spec.hidden = true,
            Command::Rollup => spec.rolled_up = !spec.rolled_up,
            Command::ToggleTray => spec.tray_icon = !spec.tray_icon,
            Command::OccupyAllOrCurrent => spec.sticky = !spec.sticky,
            Command::MoveToWorkspace(ws) => {
                spec.workspace = ws;
                spec.sticky = false;
            }
            Command::SetLayer(layer) => spec.layer = layer,
            Command::Raise | Command::Lower => {}
            Command::Close | Command::Kill => {
                self.windows.remove(&window);
            }
            Command::Arrange(_) => return Err(CommandError::Unsupported(command)),
        }

        debug!("Applied {:?} to window {}", command, window);
        self.applied.push((command, window));
        Ok(())
    }

    fn owner_chain(&self, window: WindowRef) -> Vec<WindowRef> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.windows.get(&window).and_then(|spec| spec.owner);
        while let Some(owner) = current {
            chain.push(owner);
            if owner == window || !seen.insert(owner) {
                break;
            }
            current = self.windows.get(&owner).and_then(|spec| spec.owner);
        }
        chain.reverse();
        chain
    }

    fn class_hint(&self, window: WindowRef) -> Option<ClassHint> {
        self.windows.get(&window).and_then(|spec| spec.class.clone())
    }

    fn client_leader(&self, window: WindowRef) -> Option<WindowRef> {
        self.windows.get(&window).and_then(|spec| spec.leader)
    }

    fn is_listable(&self, window: WindowRef) -> bool {
        self.windows
            .get(&window)
            .is_some_and(|spec| !spec.skip_window_list)
    }

    fn title(&self, window: WindowRef) -> String {
        self.windows
            .get(&window)
            .map(|spec| spec.title.clone())
            .unwrap_or_default()
    }

    fn focused(&self) -> Option<WindowRef> {
        self.focused
    }

    fn activate(&mut self, window: WindowRef) -> Result<(), CommandError> {
        if !self.windows.contains_key(&window) {
            return Err(CommandError::WindowGone(window));
        }
        self.focused = Some(window);
        Ok(())
    }

    fn arrange(&mut self, arrangement: Arrangement, windows: &[WindowRef]) -> Result<(), CommandError> {
        if let Some(gone) = windows.iter().find(|w| !self.windows.contains_key(*w)) {
            return Err(CommandError::WindowGone(*gone));
        }
        self.arranged.push((arrangement, windows.to_vec()));
        Ok(())
    }
}
