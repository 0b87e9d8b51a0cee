//! Client Flags
//!
//! Bitfield flags describing a window's state and the actions it accepts,
//! and the per-window snapshot the window list folds over.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::wm::entry::Section;

bitflags! {
    /// Window state as seen by the window list
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WindowState: u32 {
        const MINIMIZED        = 1 << 0;
        const MAXIMIZED_VERT   = 1 << 1;
        const MAXIMIZED_HORIZ  = 1 << 2;
        const FULLSCREEN       = 1 << 3;
        const HIDDEN           = 1 << 4;
        const ROLLED_UP        = 1 << 5;
        const TRAY_ICON        = 1 << 6;
        const ALL_WORKSPACES   = 1 << 7;
    }
}

impl WindowState {
    pub fn maximized() -> Self {
        Self::MAXIMIZED_VERT | Self::MAXIMIZED_HORIZ
    }

    pub fn is_maximized(&self) -> bool {
        self.contains(Self::MAXIMIZED_VERT) && self.contains(Self::MAXIMIZED_HORIZ)
    }
}

bitflags! {
    /// Actions a window currently accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const RESTORE      = 1 << 0;
        const MINIMIZE     = 1 << 1;
        const MAXIMIZE     = 1 << 2;
        const SHOW         = 1 << 3;
        const HIDE         = 1 << 4;
        const ROLLUP       = 1 << 5;
        const RAISE        = 1 << 6;
        const LOWER        = 1 << 7;
        const CLOSE        = 1 << 8;
        const TOGGLE_TRAY  = 1 << 9;
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::MINIMIZE
            | Self::MAXIMIZE
            | Self::HIDE
            | Self::ROLLUP
            | Self::RAISE
            | Self::LOWER
            | Self::CLOSE
            | Self::TOGGLE_TRAY
    }
}

bitflags! {
    /// Keyboard modifiers held when a command was issued
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const SHIFT   = 1 << 0;
        const CONTROL = 1 << 2;
        const ALT     = 1 << 3;
        const SUPER   = 1 << 6;
    }
}

/// Stacking layer of a window, bottom to top
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Layer {
    Desktop,
    Below,
    #[default]
    Normal,
    OnTop,
    Dock,
    AboveDock,
    Menu,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Desktop,
        Layer::Below,
        Layer::Normal,
        Layer::OnTop,
        Layer::Dock,
        Layer::AboveDock,
        Layer::Menu,
    ];
}

/// State and capabilities of one window at the time of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFlagsSnapshot {
    pub state: WindowState,
    pub caps: Capabilities,
    pub workspace: Section,
    pub layer: Layer,
}

impl Default for WindowFlagsSnapshot {
    fn default() -> Self {
        Self {
            state: WindowState::empty(),
            caps: Capabilities::default(),
            workspace: Section::Workspace(0),
            layer: Layer::Normal,
        }
    }
}

impl WindowFlagsSnapshot {
    pub fn is_minimized(&self) -> bool {
        self.state.contains(WindowState::MINIMIZED)
    }

    pub fn is_maximized_full(&self) -> bool {
        self.state.is_maximized()
    }

    pub fn is_maximized_vert(&self) -> bool {
        self.state.contains(WindowState::MAXIMIZED_VERT)
    }

    pub fn is_maximized_horiz(&self) -> bool {
        self.state.contains(WindowState::MAXIMIZED_HORIZ)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.state.contains(WindowState::FULLSCREEN)
    }

    pub fn is_hidden(&self) -> bool {
        self.state.contains(WindowState::HIDDEN)
    }

    pub fn is_rolled_up(&self) -> bool {
        self.state.contains(WindowState::ROLLED_UP)
    }

    pub fn has_tray_icon(&self) -> bool {
        self.state.contains(WindowState::TRAY_ICON)
    }

    /// Sticky windows occupy every workspace regardless of `workspace`
    pub fn is_all_workspaces(&self) -> bool {
        self.state.contains(WindowState::ALL_WORKSPACES) || self.workspace == Section::All
    }

    /// Section the window should be listed under
    pub fn section(&self) -> Section {
        if self.is_all_workspaces() {
            Section::All
        } else {
            self.workspace
        }
    }

    pub fn can(&self, caps: Capabilities) -> bool {
        self.caps.contains(caps)
    }
}
