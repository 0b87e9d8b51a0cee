//! Window List Module
//!
//! The "all windows" list of the window manager: rows grouped by workspace,
//! transients under their owners, and bulk commands on the selected rows.

pub mod client_flags;
pub mod controller;
pub mod dispatch;
pub mod entry;
pub mod grouping;
pub mod lease;
pub mod menu;
pub mod placement;
pub mod registry;
pub mod selection;
pub mod snapshot;
pub mod transients;
pub mod workspace;

use std::cell::Ref;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::config::WindowListConfig;
pub use client_flags::{Capabilities, Layer, Modifiers, WindowFlagsSnapshot, WindowState};
pub use controller::{CommandError, NullSink, PresentationSink, WindowController};
pub use dispatch::{DispatchReport, Failure};
pub use entry::{ClassHint, RowId, Section, WindowEntry, WindowRef, WindowRow};
pub use lease::RowLease;
pub use menu::{Arrangement, Command, CommandAvailability, CommandState};
pub use placement::{PlacementPlanner, PopupPlan, PopupRequest};
pub use registry::{NewRow, Registry, RegistryEvent, SharedRegistry};
pub use workspace::{WorkspaceProvider, WorkspaceTable, ALL_WORKSPACES};

/// What activating an entry did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Focused the row's window
    Window(WindowRef),
    /// Switched to the header's workspace
    Workspace(u32),
    Nothing,
}

/// The window list as owned by the shell
pub struct WindowList<C, W, P>
where
    C: WindowController,
    W: WorkspaceProvider,
    P: PresentationSink,
{
    registry: SharedRegistry,
    controller: C,
    workspaces: W,
    sink: P,

    /// Selected rows, in selection order
    selection: Vec<RowId>,
    availability: CommandAvailability,

    planner: PlacementPlanner,
    config: WindowListConfig,
}

impl<C, W, P> WindowList<C, W, P>
where
    C: WindowController,
    W: WorkspaceProvider,
    P: PresentationSink,
{
    /// Create an empty list with a header per workspace
    pub fn new(controller: C, workspaces: W, sink: P, config: WindowListConfig) -> Self {
        let count = workspaces.count();
        info!("Window list created with {} workspaces", count);

        let mut registry = Registry::new(count);
        registry.drain_events();

        Self {
            registry: registry.shared(),
            controller,
            workspaces,
            sink,
            selection: Vec::new(),
            availability: CommandAvailability::none(count),
            planner: PlacementPlanner::new(&config),
            config,
        }
    }

    /// List a window. The returned lease removes the row when dropped.
    ///
    /// Unlistable windows get no row. A window that is already listed is
    /// refiled and gets no second lease.
    pub fn add_window(&mut self, window: WindowRef) -> Option<RowLease> {
        if !self.controller.is_listable(window) {
            debug!("Window {} is not listable", window);
            return None;
        }

        let existing = self.registry.borrow().row_for_window(window);
        if existing.is_some() {
            warn!("Window {} added twice, refiling", window);
            self.update_window(window);
            return None;
        }

        let row = self.new_row(window);
        let inserted = self.registry.borrow_mut().insert(row);
        self.flush_events();

        Some(RowLease::new(Rc::downgrade(&self.registry), inserted.id, window))
    }

    /// Unlist a window; unknown windows are ignored
    pub fn remove_window(&mut self, window: WindowRef) {
        let removed = {
            let mut registry = self.registry.borrow_mut();
            registry.row_for_window(window).and_then(|id| registry.remove(id))
        };
        if removed.is_none() {
            debug!("Window {} was not listed", window);
        }
        self.flush_events();
    }

    /// Move a window's row after its workspace, owner or class changed
    pub fn update_window(&mut self, window: WindowRef) {
        let Some(id) = self.registry.borrow().row_for_window(window) else {
            debug!("Window {} is not listed, nothing to update", window);
            return;
        };

        let row = self.new_row(window);
        self.registry.borrow_mut().refile(id, row);
        self.flush_events();

        if self.selection.contains(&id) {
            self.refresh_availability();
        }
    }

    /// Follow a change of the workspace count
    pub fn sync_workspaces(&mut self) {
        let count = self.workspaces.count();
        self.registry.borrow_mut().resync_workspace_count(count);
        self.flush_events();
        self.refresh_availability();
    }

    /// Rebuild the list from the live window set
    pub fn populate<I>(&mut self, windows: I) -> Vec<RowLease>
    where
        I: IntoIterator<Item = WindowRef>,
    {
        {
            let mut registry = self.registry.borrow_mut();
            let ids: Vec<RowId> = registry.rows().map(|row| row.id).collect();
            for id in ids {
                registry.remove(id);
            }
        }
        self.selection.clear();
        self.sync_workspaces();

        let leases: Vec<RowLease> = windows
            .into_iter()
            .filter_map(|window| self.add_window(window))
            .collect();
        info!("Window list populated with {} windows", leases.len());
        leases
    }

    /// Replace the selection. Ids that are not listed rows are dropped.
    pub fn set_selection<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = RowId>,
    {
        let mut selection = Vec::new();
        {
            let registry = self.registry.borrow();
            for id in rows {
                if registry.find(id).is_none() {
                    debug!("Ignoring selection of unknown {}", id);
                    continue;
                }
                if !selection.contains(&id) {
                    selection.push(id);
                }
            }
        }
        self.selection = selection;
        self.refresh_availability();
    }

    pub fn selection(&self) -> &[RowId] {
        &self.selection
    }

    pub fn availability(&self) -> &CommandAvailability {
        &self.availability
    }

    /// Run a command on every selected window, in list order
    pub fn perform(&mut self, command: Command, modifiers: Modifiers) -> DispatchReport {
        let windows = self.selected_windows();
        if windows.is_empty() {
            debug!("Nothing selected for {:?}", command);
            return DispatchReport::default();
        }

        let report = dispatch::dispatch(&mut self.controller, command, &windows, modifiers);
        for failure in &report.failures {
            self.sink.command_failed(command, failure.window, &failure.error);
        }

        let moves = matches!(command, Command::MoveToWorkspace(_) | Command::OccupyAllOrCurrent);
        for &window in &report.applied {
            if !self.controller.is_listable(window) {
                self.remove_window(window);
            } else if moves {
                self.update_window(window);
            }
        }

        self.refresh_availability();
        report
    }

    /// Activate the entry at `position`
    pub fn activate(&mut self, position: usize) -> Result<Activation, CommandError> {
        let entry = self.registry.borrow().entry(position).copied();
        match entry {
            Some(WindowEntry::Row(row)) => {
                self.controller.activate(row.window)?;
                Ok(Activation::Window(row.window))
            }
            Some(WindowEntry::Header(Section::Workspace(ws))) => {
                self.workspaces.activate(ws);
                Ok(Activation::Workspace(ws))
            }
            Some(WindowEntry::Header(Section::All)) => Ok(Activation::Nothing),
            None => {
                debug!("No entry at position {}", position);
                Ok(Activation::Nothing)
            }
        }
    }

    /// Text shown for the entry at `position`
    pub fn entry_label(&self, position: usize) -> Option<String> {
        let entry = self.registry.borrow().entry(position).copied()?;
        Some(match entry {
            WindowEntry::Row(row) => self.controller.title(row.window),
            WindowEntry::Header(Section::Workspace(ws)) => self.workspaces.name(ws),
            WindowEntry::Header(Section::All) => self.config.all_workspaces_label.clone(),
        })
    }

    /// Horizontal offset in pixels of the entry at `position`
    pub fn entry_indent(&self, position: usize) -> Option<u32> {
        let registry = self.registry.borrow();
        match registry.entry(position)? {
            WindowEntry::Header(_) => Some(0),
            WindowEntry::Row(row) => {
                let depth = u32::try_from(registry.depth(row.id)?).unwrap_or(u32::MAX);
                Some(depth.saturating_add(1).saturating_mul(self.config.indent_step))
            }
        }
    }

    /// Plan showing the popup with the focused window selected
    pub fn show_focused(&self, request: &PopupRequest<'_>) -> PopupPlan {
        let registry = self.registry.borrow();
        self.planner.plan(
            &registry,
            request,
            self.controller.focused(),
            self.workspaces.active_index(),
        )
    }

    /// Forward queued changes to the sink. Leases dropped by the shell
    /// queue their removals until the next call.
    pub fn flush_events(&mut self) {
        let events = self.registry.borrow_mut().drain_events();
        let mut removed = false;
        for event in events {
            match event {
                RegistryEvent::Inserted(position) => self.sink.entry_inserted(position),
                RegistryEvent::Removed(position) => {
                    removed = true;
                    self.sink.entry_removed(position);
                }
            }
        }

        if removed {
            let before = self.selection.len();
            {
                let registry = self.registry.borrow();
                self.selection.retain(|id| registry.find(*id).is_some());
            }
            if self.selection.len() != before {
                self.refresh_availability();
            }
        }
    }

    pub fn registry(&self) -> Ref<'_, Registry> {
        self.registry.borrow()
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn workspaces(&self) -> &W {
        &self.workspaces
    }

    pub fn workspaces_mut(&mut self) -> &mut W {
        &mut self.workspaces
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn config(&self) -> &WindowListConfig {
        &self.config
    }

    fn new_row(&self, window: WindowRef) -> NewRow {
        let flags = self.controller.get_flags(window);
        NewRow {
            window,
            section: flags.section(),
            owners: self.controller.owner_chain(window),
            leader: self.controller.client_leader(window),
            class: self.controller.class_hint(window),
        }
    }

    fn selected_windows(&self) -> Vec<WindowRef> {
        let registry = self.registry.borrow();
        let mut rows: Vec<(usize, WindowRef)> = self
            .selection
            .iter()
            .filter_map(|&id| Some((registry.find(id)?, registry.row(id)?.window)))
            .collect();
        rows.sort_unstable();
        rows.into_iter().map(|(_, window)| window).collect()
    }

    fn refresh_availability(&mut self) {
        let flags: Vec<WindowFlagsSnapshot> = self
            .selected_windows()
            .into_iter()
            .map(|window| self.controller.get_flags(window))
            .collect();
        let count = self.registry.borrow().workspace_count();

        self.availability = selection::aggregate(&flags, count);
        debug!("Command availability updated for {} selected windows", flags.len());
        self.sink.command_availability_changed(&self.availability);
    }
}
