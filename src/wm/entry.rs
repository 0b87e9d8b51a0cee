//! Window List Entries
//!
//! The entries making up the window list: one row per listed window and one
//! header per workspace section, plus the synthetic "All Workspaces" header.

use serde::{Deserialize, Serialize};

use crate::wm::workspace::ALL_WORKSPACES;

/// Handle into the external window table (the client window id).
///
/// The window list never owns the window behind it.
pub type WindowRef = u32;

/// Stable id of a listed row. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub u64);

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// Section of the window list: one per workspace, then "All Workspaces".
///
/// The derived ordering matches the on-screen order of the headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    Workspace(u32),
    All,
}

impl Section {
    /// Section for a raw workspace value (`ALL_WORKSPACES` for sticky windows)
    pub fn from_workspace(workspace: u32) -> Self {
        if workspace == ALL_WORKSPACES {
            Self::All
        } else {
            Self::Workspace(workspace)
        }
    }

    /// Workspace index, `None` for the "All Workspaces" section
    pub fn index(self) -> Option<u32> {
        match self {
            Self::Workspace(index) => Some(index),
            Self::All => None,
        }
    }

    /// Fold sections of workspaces that do not exist into `All`
    pub fn clamp(self, workspace_count: u32) -> Self {
        match self {
            Self::Workspace(index) if index < workspace_count => self,
            _ => Self::All,
        }
    }
}

/// Class hint (`WM_CLASS`) of a window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassHint {
    pub res_name: String,
    pub res_class: String,
}

impl ClassHint {
    pub fn new(res_name: impl Into<String>, res_class: impl Into<String>) -> Self {
        Self {
            res_name: res_name.into(),
            res_class: res_class.into(),
        }
    }
}

/// A listed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRow {
    pub id: RowId,
    pub window: WindowRef,
    /// Cached copy of the window's workspace
    pub section: Section,
}

/// One line of the window list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEntry {
    Row(WindowRow),
    Header(Section),
}

impl WindowEntry {
    pub fn row(&self) -> Option<&WindowRow> {
        match self {
            Self::Row(row) => Some(row),
            Self::Header(_) => None,
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, Self::Header(_))
    }

    /// Section this entry belongs to (or starts, for headers)
    pub fn section(&self) -> Section {
        match self {
            Self::Row(row) => row.section,
            Self::Header(section) => *section,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order_puts_all_last() {
        let mut sections = vec![Section::All, Section::Workspace(2), Section::Workspace(0)];
        sections.sort();
        assert_eq!(
            sections,
            vec![Section::Workspace(0), Section::Workspace(2), Section::All]
        );
    }

    #[test]
    fn test_section_clamp() {
        assert_eq!(Section::Workspace(1).clamp(2), Section::Workspace(1));
        assert_eq!(Section::Workspace(2).clamp(2), Section::All);
        assert_eq!(Section::from_workspace(ALL_WORKSPACES), Section::All);
    }
}
