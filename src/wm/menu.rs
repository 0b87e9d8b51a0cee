//! Menu Module
//!
//! Commands offered by the window list popup menus and their per-selection
//! check/enable state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::wm::client_flags::Layer;

/// Window arrangement applied to a whole selection at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Arrangement {
    TileVertical,
    TileHorizontal,
    Cascade,
    Smart,
}

impl Arrangement {
    pub const ALL: [Arrangement; 4] = [
        Arrangement::TileVertical,
        Arrangement::TileHorizontal,
        Arrangement::Cascade,
        Arrangement::Smart,
    ];
}

/// Window list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Command {
    Restore,
    Minimize,
    Maximize,
    MaximizeVert,
    MaximizeHoriz,
    Fullscreen,
    Show,
    Hide,
    Rollup,
    Raise,
    Lower,
    SetLayer(Layer),
    ToggleTray,
    OccupyAllOrCurrent,
    MoveToWorkspace(u32),
    Close,
    Kill,
    Arrange(Arrangement),
}

impl Command {
    /// Per-window commands that do not depend on the workspace count
    pub const FIXED: [Command; 15] = [
        Command::Restore,
        Command::Minimize,
        Command::Maximize,
        Command::MaximizeVert,
        Command::MaximizeHoriz,
        Command::Fullscreen,
        Command::Show,
        Command::Hide,
        Command::Rollup,
        Command::Raise,
        Command::Lower,
        Command::ToggleTray,
        Command::OccupyAllOrCurrent,
        Command::Close,
        Command::Kill,
    ];

    /// Every command of the popup for `workspace_count` workspaces
    pub fn all(workspace_count: u32) -> impl Iterator<Item = Command> {
        Self::FIXED
            .into_iter()
            .chain(Layer::ALL.into_iter().map(Command::SetLayer))
            .chain((0..workspace_count).map(Command::MoveToWorkspace))
            .chain(Arrangement::ALL.into_iter().map(Command::Arrange))
    }
}

/// Menu item state of one command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandState {
    /// The property already holds for the whole selection
    pub checked: bool,
    /// The command is offered
    pub enabled: bool,
}

impl CommandState {
    pub fn new(checked: bool, enabled: bool) -> Self {
        Self { checked, enabled }
    }
}

/// Check/enable state of every command for the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAvailability {
    /// Cleared when nothing is selected: the whole popup is suppressed
    pub menu_enabled: bool,
    states: BTreeMap<Command, CommandState>,
}

impl CommandAvailability {
    /// Availability with no selection: nothing checked, nothing enabled
    pub fn none(workspace_count: u32) -> Self {
        Self {
            menu_enabled: false,
            states: Command::all(workspace_count)
                .map(|command| (command, CommandState::default()))
                .collect(),
        }
    }

    pub fn set(&mut self, command: Command, state: CommandState) {
        self.states.insert(command, state);
    }

    /// State of a command; unknown commands are disabled
    pub fn state(&self, command: Command) -> CommandState {
        self.states.get(&command).copied().unwrap_or_default()
    }

    pub fn is_enabled(&self, command: Command) -> bool {
        self.menu_enabled && self.state(command).enabled
    }

    pub fn is_checked(&self, command: Command) -> bool {
        self.state(command).checked
    }

    pub fn iter(&self) -> impl Iterator<Item = (Command, CommandState)> + '_ {
        self.states.iter().map(|(command, state)| (*command, *state))
    }
}
