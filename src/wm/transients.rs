//! Transients Module
//!
//! Owner chains of transient windows (dialogs owned by their main window,
//! and so on up to the root). The window list keeps owned windows directly
//! below their owner.

use thiserror::Error;

use crate::wm::entry::WindowRef;

/// Malformed owner chain reported by the window manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OwnerChainError {
    #[error("window {window} appears in its own owner chain")]
    Cycle { window: WindowRef },
    #[error("window {owner} appears twice in the owner chain of window {window}")]
    Duplicate { window: WindowRef, owner: WindowRef },
}

/// Validated owner chain of a window, root first, excluding the window itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerChain {
    links: Vec<WindowRef>,
}

impl OwnerChain {
    /// Chain of a window without owner
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate an owner chain (root first) for `window`
    pub fn validate(window: WindowRef, links: Vec<WindowRef>) -> Result<Self, OwnerChainError> {
        let mut seen = std::collections::HashSet::with_capacity(links.len());
        for &owner in &links {
            if owner == window {
                return Err(OwnerChainError::Cycle { window });
            }
            if !seen.insert(owner) {
                return Err(OwnerChainError::Duplicate { window, owner });
            }
        }
        Ok(Self { links })
    }

    /// The window this one is transient for
    pub fn direct_owner(&self) -> Option<WindowRef> {
        self.links.last().copied()
    }

    pub fn root(&self) -> Option<WindowRef> {
        self.links.first().copied()
    }

    /// Whether `window` is a (transitive) owner
    pub fn contains(&self, window: WindowRef) -> bool {
        self.links.contains(&window)
    }

    /// Number of owners above the window
    pub fn depth(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn links(&self) -> &[WindowRef] {
        &self.links
    }
}
