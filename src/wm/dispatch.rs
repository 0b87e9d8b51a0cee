//! Dispatch Module
//!
//! Runs a window list command against every selected window.

use tracing::{debug, warn};

use crate::wm::client_flags::Modifiers;
use crate::wm::controller::{CommandError, WindowController};
use crate::wm::entry::WindowRef;
use crate::wm::menu::Command;

/// A command that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// `None` when the command ran on the whole selection at once
    pub window: Option<WindowRef>,
    pub error: CommandError,
}

/// Outcome of a dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub applied: Vec<WindowRef>,
    pub skipped: Vec<WindowRef>,
    pub failures: Vec<Failure>,
}

impl DispatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Apply `command` to `windows` in order.
///
/// Hiding an already hidden window and minimizing an already minimized one
/// are skipped. Failures are collected, never retried.
pub fn dispatch<C>(
    controller: &mut C,
    command: Command,
    windows: &[WindowRef],
    modifiers: Modifiers,
) -> DispatchReport
where
    C: WindowController + ?Sized,
{
    let mut report = DispatchReport::default();
    if windows.is_empty() {
        return report;
    }

    if let Command::Arrange(arrangement) = command {
        debug!("Arranging {} windows ({:?})", windows.len(), arrangement);
        match controller.arrange(arrangement, windows) {
            Ok(()) => report.applied.extend_from_slice(windows),
            Err(error) => {
                warn!("Arrangement {:?} failed: {}", arrangement, error);
                report.failures.push(Failure {
                    window: None,
                    error,
                });
            }
        }
        return report;
    }

    for &window in windows {
        let flags = controller.get_flags(window);
        let redundant = match command {
            Command::Hide => flags.is_hidden(),
            Command::Minimize => flags.is_minimized(),
            _ => false,
        };
        if redundant {
            debug!("Skipping {:?} for window {}", command, window);
            report.skipped.push(window);
            continue;
        }

        match controller.apply(command, window, modifiers) {
            Ok(()) => report.applied.push(window),
            Err(error) => {
                warn!("{:?} failed for window {}: {}", command, window, error);
                report.failures.push(Failure {
                    window: Some(window),
                    error,
                });
            }
        }
    }

    report
}
