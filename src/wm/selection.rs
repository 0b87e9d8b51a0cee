//! Selection Module
//!
//! Folds the selected windows' flags into the check/enable state of every
//! window list command.
//!
//! State commands are checked only when the state holds for every selected
//! window. Actions are enabled when they apply to at least one selected
//! window; the command handler skips the others when it runs.

use crate::wm::client_flags::{Capabilities, Layer, WindowFlagsSnapshot};
use crate::wm::entry::Section;
use crate::wm::menu::{Arrangement, Command, CommandAvailability, CommandState};

/// Running fold over the selected windows
#[derive(Debug, Clone, Copy)]
struct Fold {
    selected: bool,

    // every selected window
    minimized: bool,
    maximized: bool,
    maximized_vert: bool,
    maximized_horiz: bool,
    fullscreen: bool,
    hidden: bool,
    rolled_up: bool,
    tray_icon: bool,

    // at least one selected window
    restores: bool,
    minimizes: bool,
    maximizes: bool,
    shows: bool,
    hides: bool,
    rolls_up: bool,
    raises: bool,
    lowers: bool,
    toggles_tray: bool,
    closes: bool,

    workspace: Option<u32>,
    same_workspace: bool,

    /// Layer shared by every selected window
    layer: Option<Layer>,
}

impl Default for Fold {
    fn default() -> Self {
        Self {
            selected: false,
            minimized: true,
            maximized: true,
            maximized_vert: true,
            maximized_horiz: true,
            fullscreen: true,
            hidden: true,
            rolled_up: true,
            tray_icon: true,
            restores: false,
            minimizes: false,
            maximizes: false,
            shows: false,
            hides: false,
            rolls_up: false,
            raises: false,
            lowers: false,
            toggles_tray: false,
            closes: false,
            workspace: None,
            same_workspace: false,
            layer: None,
        }
    }
}

impl Fold {
    fn add(&mut self, flags: &WindowFlagsSnapshot) {
        let first = !self.selected;
        self.selected = true;

        // fullscreen > full maximize > one-axis maximize
        let fullscreen = flags.is_fullscreen();
        let maximized = flags.is_maximized_full() && !fullscreen;
        let partial = !fullscreen && !maximized;

        self.fullscreen &= fullscreen;
        self.minimized &= flags.is_minimized();
        self.maximized &= maximized;
        self.maximized_vert &= flags.is_maximized_vert() && partial;
        self.maximized_horiz &= flags.is_maximized_horiz() && partial;
        self.hidden &= flags.is_hidden();
        self.rolled_up &= flags.is_rolled_up();
        self.tray_icon &= flags.has_tray_icon();

        self.restores |= flags.can(Capabilities::RESTORE);
        self.minimizes |= flags.can(Capabilities::MINIMIZE) && !flags.is_minimized();
        self.maximizes |= flags.can(Capabilities::MAXIMIZE);
        self.shows |= flags.can(Capabilities::SHOW);
        self.hides |= flags.can(Capabilities::HIDE) && !flags.is_hidden();
        self.rolls_up |= flags.can(Capabilities::ROLLUP);
        self.raises |= flags.can(Capabilities::RAISE);
        self.lowers |= flags.can(Capabilities::LOWER);
        self.toggles_tray |= flags.can(Capabilities::TOGGLE_TRAY);
        self.closes |= flags.can(Capabilities::CLOSE);

        if first {
            self.layer = Some(flags.layer);
        } else if self.layer != Some(flags.layer) {
            self.layer = None;
        }

        match flags.workspace {
            Section::Workspace(ws) if !flags.is_all_workspaces() => {
                if first {
                    self.workspace = Some(ws);
                    self.same_workspace = true;
                } else if self.workspace != Some(ws) {
                    self.same_workspace = false;
                }
            }
            _ => {
                self.workspace = None;
                self.same_workspace = false;
            }
        }
    }

    fn finish(self, workspace_count: u32) -> CommandAvailability {
        let mut availability = CommandAvailability::none(workspace_count);
        if !self.selected {
            return availability;
        }
        availability.menu_enabled = true;

        let states = [
            (Command::Restore, false, self.restores),
            (Command::Minimize, self.minimized, self.minimizes),
            (Command::Maximize, self.maximized, self.maximizes),
            (Command::MaximizeVert, self.maximized_vert, self.maximizes),
            (Command::MaximizeHoriz, self.maximized_horiz, self.maximizes),
            (Command::Fullscreen, self.fullscreen, true),
            (Command::Show, false, self.shows),
            (Command::Hide, self.hidden, self.hides),
            (Command::Rollup, self.rolled_up, self.rolls_up),
            (Command::Raise, false, self.raises),
            (Command::Lower, false, self.lowers),
            (Command::ToggleTray, self.tray_icon, self.toggles_tray),
            (Command::OccupyAllOrCurrent, self.same_workspace, true),
            (Command::Close, false, self.closes),
            (Command::Kill, false, self.closes),
        ];
        for (command, checked, enabled) in states {
            availability.set(command, CommandState::new(checked, enabled));
        }

        let shared = self.workspace.filter(|_| self.same_workspace);
        for ws in 0..workspace_count {
            let enabled = shared.is_some_and(|current| current != ws);
            availability.set(Command::MoveToWorkspace(ws), CommandState::new(false, enabled));
        }

        for layer in Layer::ALL {
            let checked = self.layer == Some(layer);
            availability.set(Command::SetLayer(layer), CommandState::new(checked, true));
        }

        for arrangement in Arrangement::ALL {
            availability.set(Command::Arrange(arrangement), CommandState::new(false, true));
        }

        availability
    }
}

/// Compute command availability for a selection.
///
/// Pure: the result depends only on the given flags and workspace count.
pub fn aggregate<'a, I>(selection: I, workspace_count: u32) -> CommandAvailability
where
    I: IntoIterator<Item = &'a WindowFlagsSnapshot>,
{
    let mut fold = Fold::default();
    for flags in selection {
        fold.add(flags);
    }
    fold.finish(workspace_count)
}
