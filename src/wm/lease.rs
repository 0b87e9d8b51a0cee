//! Row leases
//!
//! A `RowLease` is what a managed window keeps to remember its row in the
//! window list. Dropping it takes the row out of the list, so the row goes
//! away on every teardown path of the window.

use std::cell::RefCell;
use std::rc::Weak;
use tracing::{debug, error};

use crate::wm::entry::{RowId, WindowRef};
use crate::wm::registry::Registry;

/// Weak claim on a registry row, released on drop
#[derive(Debug)]
pub struct RowLease {
    registry: Weak<RefCell<Registry>>,
    id: RowId,
    window: WindowRef,
}

impl RowLease {
    pub(crate) fn new(registry: Weak<RefCell<Registry>>, id: RowId, window: WindowRef) -> Self {
        Self {
            registry,
            id,
            window,
        }
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    pub fn window(&self) -> WindowRef {
        self.window
    }

    /// Remove the row now
    pub fn release(self) {}
}

impl Drop for RowLease {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        match registry.try_borrow_mut() {
            Ok(mut registry) => {
                if registry.remove(self.id).is_none() {
                    debug!("Row {} of window {} was already gone", self.id, self.window);
                }
            }
            Err(_) => {
                error!(
                    "Window {} released {} while the window list was being updated",
                    self.window, self.id
                );
                debug_assert!(false, "row released during a window list update");
            }
        }
    }
}
