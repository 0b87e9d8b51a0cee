//! Collaborator interfaces
//!
//! The window list decides where rows go and which commands apply. Everything
//! that touches real windows or draws goes through these traits.

use thiserror::Error;

use crate::wm::client_flags::{Modifiers, WindowFlagsSnapshot};
use crate::wm::entry::{ClassHint, WindowRef};
use crate::wm::menu::{Arrangement, Command, CommandAvailability};

/// Failure of a command against one window
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0:?} is not supported")]
    Unsupported(Command),
    #[error("window {0} no longer exists")]
    WindowGone(WindowRef),
    #[error("{0}")]
    Failed(String),
}

/// Access to the managed windows
pub trait WindowController {
    /// Current state and capabilities of a window
    fn get_flags(&self, window: WindowRef) -> WindowFlagsSnapshot;

    /// Run a command against one window
    fn apply(
        &mut self,
        command: Command,
        window: WindowRef,
        modifiers: Modifiers,
    ) -> Result<(), CommandError>;

    /// Owners of a window, root first, not including the window
    fn owner_chain(&self, window: WindowRef) -> Vec<WindowRef>;

    fn class_hint(&self, window: WindowRef) -> Option<ClassHint>;

    /// Client leader (`WM_CLIENT_LEADER`) of a window
    fn client_leader(&self, _window: WindowRef) -> Option<WindowRef> {
        None
    }

    /// Whether the window belongs in the window list at all
    fn is_listable(&self, _window: WindowRef) -> bool {
        true
    }

    fn title(&self, _window: WindowRef) -> String {
        String::new()
    }

    /// Currently focused window
    fn focused(&self) -> Option<WindowRef> {
        None
    }

    /// Focus and raise a window (activating its row)
    fn activate(&mut self, window: WindowRef) -> Result<(), CommandError>;

    /// Rearrange a set of windows in one go
    fn arrange(
        &mut self,
        arrangement: Arrangement,
        _windows: &[WindowRef],
    ) -> Result<(), CommandError> {
        Err(CommandError::Unsupported(Command::Arrange(arrangement)))
    }
}

/// Receiver of window list changes; does all drawing
pub trait PresentationSink {
    fn entry_inserted(&mut self, position: usize);

    fn entry_removed(&mut self, position: usize);

    fn command_availability_changed(&mut self, availability: &CommandAvailability);

    /// A command failed for one window (or for the whole selection when
    /// `window` is `None`)
    fn command_failed(&mut self, _command: Command, _window: Option<WindowRef>, _error: &CommandError) {}
}

/// Sink that drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn entry_inserted(&mut self, _position: usize) {}

    fn entry_removed(&mut self, _position: usize) {}

    fn command_availability_changed(&mut self, _availability: &CommandAvailability) {}
}
