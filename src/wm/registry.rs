//! Registry Module
//!
//! The ordered window list: one header per workspace followed by the rows of
//! the windows on that workspace, then the "All Workspaces" header and the
//! sticky windows. Rows are placed by the group resolver on insertion and
//! never resorted afterwards.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::wm::entry::{ClassHint, RowId, Section, WindowEntry, WindowRef, WindowRow};
use crate::wm::grouping;
use crate::wm::transients::OwnerChain;

/// Registry shared between the window list and the row leases it hands out
pub type SharedRegistry = Rc<RefCell<Registry>>;

/// What the registry knows about a listed window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInfo {
    pub window: WindowRef,
    pub section: Section,
    pub owners: OwnerChain,
    pub leader: Option<WindowRef>,
    pub class: Option<ClassHint>,
}

/// Insertion request for a window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRow {
    pub window: WindowRef,
    pub section: Section,
    /// Owner chain, root first, not including the window
    pub owners: Vec<WindowRef>,
    pub leader: Option<WindowRef>,
    pub class: Option<ClassHint>,
}

impl NewRow {
    pub fn new(window: WindowRef, section: Section) -> Self {
        Self {
            window,
            section,
            owners: Vec::new(),
            leader: None,
            class: None,
        }
    }

    pub fn owned_by(mut self, owners: Vec<WindowRef>) -> Self {
        self.owners = owners;
        self
    }

    pub fn with_leader(mut self, leader: WindowRef) -> Self {
        self.leader = Some(leader);
        self
    }

    pub fn with_class(mut self, class: ClassHint) -> Self {
        self.class = Some(class);
        self
    }
}

impl From<RowInfo> for NewRow {
    fn from(info: RowInfo) -> Self {
        Self {
            window: info.window,
            section: info.section,
            owners: info.owners.links().to_vec(),
            leader: info.leader,
            class: info.class,
        }
    }
}

/// Result of an insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub id: RowId,
    pub position: usize,
}

/// Structural change, queued until the window list forwards it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    Inserted(usize),
    Removed(usize),
}

/// Ordered window list with position index
#[derive(Debug)]
pub struct Registry {
    /// Entries in display order
    entries: Vec<WindowEntry>,

    /// Row records by id
    rows: HashMap<RowId, RowInfo>,

    /// Position of every row in `entries`
    positions: HashMap<RowId, usize>,

    /// Position of every header in `entries`
    headers: HashMap<Section, usize>,

    /// Row of each listed window
    by_window: HashMap<WindowRef, RowId>,

    workspace_count: u32,
    next_id: u64,
    events: Vec<RegistryEvent>,
}

impl Registry {
    /// Create a registry with headers for `workspace_count` workspaces
    pub fn new(workspace_count: u32) -> Self {
        let mut entries: Vec<WindowEntry> = (0..workspace_count)
            .map(|ws| WindowEntry::Header(Section::Workspace(ws)))
            .collect();
        entries.push(WindowEntry::Header(Section::All));

        let mut registry = Self {
            entries,
            rows: HashMap::new(),
            positions: HashMap::new(),
            headers: HashMap::new(),
            by_window: HashMap::new(),
            workspace_count,
            next_id: 1,
            events: Vec::new(),
        };
        registry.reindex_from(0);
        registry
    }

    pub fn shared(self) -> SharedRegistry {
        Rc::new(RefCell::new(self))
    }

    /// Insert a row for a window and return where it landed.
    ///
    /// A window that is already listed is refiled under its existing id.
    /// Listed transients of the window are moved below it.
    pub fn insert(&mut self, row: NewRow) -> Inserted {
        let window = row.window;
        let (id, placed) = match self.by_window.get(&window).copied() {
            Some(id) => {
                warn!("Window {} is already listed as {}, refiling", window, id);
                (id, self.relocate(id, row))
            }
            None => {
                let id = RowId(self.next_id);
                self.next_id += 1;
                (id, self.place(id, row))
            }
        };

        self.adopt_transients(id);
        let position = self.find(id).unwrap_or(placed);
        Inserted { id, position }
    }

    /// Move an existing row to where it belongs now (workspace, owner or
    /// class changed), taking the rows it owns along. Returns the new
    /// position, `None` if the id is unknown.
    pub fn refile(&mut self, id: RowId, row: NewRow) -> Option<usize> {
        let current = self.rows.get(&id)?.window;
        if current != row.window {
            warn!(
                "Refusing to refile {} (window {}) with data for window {}",
                id, current, row.window
            );
            return None;
        }
        let placed = self.relocate(id, row);
        self.adopt_transients(id);
        Some(self.find(id).unwrap_or(placed))
    }

    /// Remove a row. Unknown ids are ignored.
    pub fn remove(&mut self, id: RowId) -> Option<usize> {
        let (position, info) = self.detach(id)?;
        debug!("Removed window {} ({}) from position {}", info.window, id, position);
        Some(position)
    }

    /// Position of a row
    pub fn find(&self, id: RowId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Add or remove workspace headers. Rows of removed workspaces move to
    /// the "All Workspaces" section, keeping their relative order.
    pub fn resync_workspace_count(&mut self, count: u32) {
        let old = self.workspace_count;
        if count == old {
            return;
        }

        info!("Window list workspaces: {} -> {}", old, count);

        if count > old {
            for ws in old..count {
                let pos = self.all_header();
                self.entries.insert(pos, WindowEntry::Header(Section::Workspace(ws)));
                self.reindex_from(pos);
                self.events.push(RegistryEvent::Inserted(pos));
            }
            self.workspace_count = count;
            return;
        }

        let Some(first_removed) = self.header_position(Section::Workspace(count)) else {
            warn!("Missing header for workspace {}", count);
            return;
        };

        for ws in (count..old).rev() {
            if let Some(pos) = self.headers.remove(&Section::Workspace(ws)) {
                self.entries.remove(pos);
                self.reindex_from(pos);
                self.events.push(RegistryEvent::Removed(pos));
            }
        }

        let all = self.all_header();
        if all != first_removed {
            self.entries.remove(all);
            self.events.push(RegistryEvent::Removed(all));
            self.entries.insert(first_removed, WindowEntry::Header(Section::All));
            self.events.push(RegistryEvent::Inserted(first_removed));
        }

        let mut migrated = 0;
        for entry in self.entries.iter_mut().skip(first_removed + 1) {
            if let WindowEntry::Row(row) = entry {
                if row.section != Section::All {
                    row.section = Section::All;
                    if let Some(info) = self.rows.get_mut(&row.id) {
                        info.section = Section::All;
                    }
                    migrated += 1;
                }
            }
        }
        self.workspace_count = count;
        self.reindex_from(first_removed);

        if migrated > 0 {
            debug!("Moved {} rows of removed workspaces to all workspaces", migrated);
            self.regroup(Section::All, None);
        }
    }

    /// Row positions of a section (header excluded), half-open
    pub fn section_bounds(&self, section: Section) -> Option<Range<usize>> {
        let start = self.header_position(section)? + 1;
        let end = match section {
            Section::Workspace(ws) => {
                let next = if ws + 1 < self.workspace_count {
                    Section::Workspace(ws + 1)
                } else {
                    Section::All
                };
                self.header_position(next).unwrap_or(self.entries.len())
            }
            Section::All => self.entries.len(),
        };
        Some(start..end)
    }

    pub fn header_position(&self, section: Section) -> Option<usize> {
        self.headers.get(&section).copied()
    }

    pub fn entries(&self) -> &[WindowEntry] {
        &self.entries
    }

    pub fn entry(&self, position: usize) -> Option<&WindowEntry> {
        self.entries.get(position)
    }

    /// Number of entries, headers included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No window is listed (headers are always present)
    pub fn has_no_rows(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn workspace_count(&self) -> u32 {
        self.workspace_count
    }

    pub fn row(&self, id: RowId) -> Option<&RowInfo> {
        self.rows.get(&id)
    }

    /// Row and record at a position, `None` for headers
    pub fn row_at(&self, position: usize) -> Option<(&WindowRow, &RowInfo)> {
        let row = self.entries.get(position)?.row()?;
        Some((row, self.rows.get(&row.id)?))
    }

    pub fn row_for_window(&self, window: WindowRef) -> Option<RowId> {
        self.by_window.get(&window).copied()
    }

    pub fn position_of_window(&self, window: WindowRef) -> Option<usize> {
        self.find(self.row_for_window(window)?)
    }

    /// Number of owners above a row
    pub fn depth(&self, id: RowId) -> Option<usize> {
        self.rows.get(&id).map(|info| info.owners.depth())
    }

    /// Rows in display order
    pub fn rows(&self) -> impl Iterator<Item = &WindowRow> + '_ {
        self.entries.iter().filter_map(WindowEntry::row)
    }

    /// Take the queued structural changes
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    fn all_header(&self) -> usize {
        self.header_position(Section::All)
            .unwrap_or(self.entries.len().saturating_sub(1))
    }

    fn place(&mut self, id: RowId, row: NewRow) -> usize {
        let section = row.section.clamp(self.workspace_count);
        if section != row.section {
            warn!(
                "Window {} is on {:?} which does not exist, listing it under all workspaces",
                row.window, row.section
            );
        }

        let owners = match OwnerChain::validate(row.window, row.owners) {
            Ok(owners) => owners,
            Err(e) => {
                warn!("{}; listing window {} without owner", e, row.window);
                OwnerChain::empty()
            }
        };

        let info = RowInfo {
            window: row.window,
            section,
            owners,
            leader: row.leader,
            class: row.class,
        };

        let position = grouping::insertion_point(self, &info);
        self.entries.insert(
            position,
            WindowEntry::Row(WindowRow {
                id,
                window: info.window,
                section,
            }),
        );
        self.by_window.insert(info.window, id);
        debug!("Listed window {} ({}) at position {} in {:?}", info.window, id, position, section);
        self.rows.insert(id, info);
        self.reindex_from(position);
        self.events.push(RegistryEvent::Inserted(position));
        position
    }

    /// Re-place a row and the rows it owns, keeping their relative order
    fn relocate(&mut self, id: RowId, row: NewRow) -> usize {
        let members: Vec<(RowId, NewRow)> = self
            .cluster_members(id)
            .into_iter()
            .filter_map(|member| Some((member, NewRow::from(self.rows.get(&member)?.clone()))))
            .collect();

        self.detach(id);
        for (member, _) in &members {
            self.detach(*member);
        }

        let placed = self.place(id, row);
        for (member, row) in members {
            self.place(member, row);
        }
        self.find(id).unwrap_or(placed)
    }

    /// Rows below `id` that it (transitively) owns
    fn cluster_members(&self, id: RowId) -> Vec<RowId> {
        let (Some(position), Some(info)) = (self.find(id), self.rows.get(&id)) else {
            return Vec::new();
        };
        let stop = self
            .section_bounds(info.section)
            .map_or(self.entries.len(), |bounds| bounds.end);
        let end = grouping::cluster_end(self, position, stop);
        self.entries[position + 1..end]
            .iter()
            .filter_map(WindowEntry::row)
            .map(|row| row.id)
            .collect()
    }

    /// Move rows owned by `owner` that were listed before it back below it
    fn adopt_transients(&mut self, owner: RowId) {
        let Some(info) = self.rows.get(&owner) else {
            return;
        };
        let (window, section) = (info.window, info.section);
        self.regroup(section, Some(window));
    }

    /// Relocate rows of `section` that are separated from their direct
    /// owner, optionally only those owned by `owner`
    fn regroup(&mut self, section: Section, owner: Option<WindowRef>) {
        let Some(bounds) = self.section_bounds(section) else {
            return;
        };
        let candidates: Vec<RowId> = self.entries[bounds]
            .iter()
            .filter_map(WindowEntry::row)
            .filter(|row| {
                let direct = self.rows.get(&row.id).and_then(|info| info.owners.direct_owner());
                direct.is_some() && (owner.is_none() || direct == owner)
            })
            .map(|row| row.id)
            .collect();

        for id in candidates {
            let Some(info) = self.rows.get(&id).cloned() else {
                continue;
            };
            let Some(direct) = info.owners.direct_owner() else {
                continue;
            };
            if self.follows_owner(id, direct) {
                continue;
            }
            debug!("Moving window {} ({}) back below its owner {}", info.window, id, direct);
            self.relocate(id, NewRow::from(info));
        }
    }

    /// Whether a row sits inside its owner's cluster, or the owner is not
    /// listed in the same section
    fn follows_owner(&self, id: RowId, owner: WindowRef) -> bool {
        let (Some(position), Some(info)) = (self.find(id), self.rows.get(&id)) else {
            return true;
        };
        let Some(bounds) = self.section_bounds(info.section) else {
            return true;
        };
        match self.position_of_window(owner) {
            Some(owner_position) if bounds.contains(&owner_position) => {
                owner_position < position
                    && position < grouping::cluster_end(self, owner_position, bounds.end)
            }
            _ => true,
        }
    }

    fn detach(&mut self, id: RowId) -> Option<(usize, RowInfo)> {
        let position = self.positions.remove(&id)?;
        let info = self.rows.remove(&id)?;
        self.by_window.remove(&info.window);
        self.entries.remove(position);
        self.reindex_from(position);
        self.events.push(RegistryEvent::Removed(position));
        Some((position, info))
    }

    fn reindex_from(&mut self, start: usize) {
        for (pos, entry) in self.entries.iter().enumerate().skip(start) {
            match entry {
                WindowEntry::Row(row) => {
                    self.positions.insert(row.id, pos);
                }
                WindowEntry::Header(section) => {
                    self.headers.insert(*section, pos);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn windows(registry: &Registry) -> Vec<WindowRef> {
        registry.rows().map(|row| row.window).collect()
    }

    fn class(name: &str) -> ClassHint {
        ClassHint::new(name, name)
    }

    /// Every index agrees with `entries` and every row sits in its section
    fn assert_consistent(registry: &Registry) {
        let headers: Vec<Section> = registry
            .entries()
            .iter()
            .filter(|e| e.is_header())
            .map(WindowEntry::section)
            .collect();
        let mut expected: Vec<Section> = (0..registry.workspace_count())
            .map(Section::Workspace)
            .collect();
        expected.push(Section::All);
        assert_eq!(headers, expected);

        for (pos, entry) in registry.entries().iter().enumerate() {
            match entry {
                WindowEntry::Row(row) => {
                    assert_eq!(registry.find(row.id), Some(pos));
                    assert_eq!(registry.row_for_window(row.window), Some(row.id));
                    let bounds = registry.section_bounds(row.section).unwrap();
                    assert!(bounds.contains(&pos), "{:?} outside {:?}", row, bounds);
                    assert_eq!(registry.row(row.id).unwrap().section, row.section);
                }
                WindowEntry::Header(section) => {
                    assert_eq!(registry.header_position(*section), Some(pos));
                }
            }
        }
        assert_eq!(registry.row_count(), registry.rows().count());
    }

    /// Every row follows its listed direct owner, separated from it only by
    /// rows that owner also (transitively) owns
    fn assert_owners_grouped(registry: &Registry) {
        for pos in 0..registry.len() {
            let Some((row, info)) = registry.row_at(pos) else {
                continue;
            };
            let Some(owner) = info.owners.direct_owner() else {
                continue;
            };
            let Some(owner_pos) = registry.position_of_window(owner) else {
                continue;
            };
            if !registry.section_bounds(row.section).unwrap().contains(&owner_pos) {
                continue;
            }
            assert!(owner_pos < pos, "window {} listed above its owner {}", row.window, owner);
            for between in owner_pos + 1..pos {
                let (other, other_info) = registry.row_at(between).unwrap();
                assert!(
                    other_info.owners.contains(owner),
                    "window {} separated from its owner {} by window {}",
                    row.window,
                    owner,
                    other.window
                );
            }
        }
    }

    /// Fixed transient tree: windows 4.. are owned by `window / 4`
    fn tree_chain(window: WindowRef) -> Vec<WindowRef> {
        let mut chain = Vec::new();
        let mut current = window;
        while current >= 4 {
            current /= 4;
            chain.push(current);
        }
        chain.reverse();
        chain
    }

    fn styled(window: WindowRef, section: Section, class: Option<u8>) -> NewRow {
        let mut row = NewRow::new(window, section);
        if let Some(c) = class {
            row = row.with_class(ClassHint::new("", format!("c{}", c)));
        }
        row
    }

    #[test]
    fn test_new_registry_has_headers_only() {
        let registry = Registry::new(2);
        assert_eq!(
            registry.entries(),
            &[
                WindowEntry::Header(Section::Workspace(0)),
                WindowEntry::Header(Section::Workspace(1)),
                WindowEntry::Header(Section::All),
            ]
        );
        assert_eq!(registry.section_bounds(Section::Workspace(0)), Some(1..1));
        assert_eq!(registry.section_bounds(Section::All), Some(3..3));
        assert_eq!(registry.section_bounds(Section::Workspace(2)), None);
        assert!(registry.has_no_rows());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_class_sort_is_stable() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("b")));
        registry.insert(NewRow::new(2, ws).with_class(class("a")));
        registry.insert(NewRow::new(3, ws).with_class(class("b")));
        assert_eq!(windows(&registry), vec![2, 1, 3]);
        assert_consistent(&registry);
    }

    #[test]
    fn test_missing_class_sorts_last() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws));
        registry.insert(NewRow::new(2, ws).with_class(class("zzz")));
        registry.insert(NewRow::new(3, ws));
        registry.insert(NewRow::new(4, ws).with_class(class("aaa")));
        assert_eq!(windows(&registry), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_owner_grouping_is_transitive() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(10, ws).with_class(class("p")));
        registry.insert(NewRow::new(20, ws).with_class(class("q")));
        registry.insert(NewRow::new(11, ws).with_class(class("zz")).owned_by(vec![10]));
        registry.insert(NewRow::new(30, ws).with_class(class("a")));
        registry.insert(NewRow::new(12, ws).with_class(class("a")).owned_by(vec![10, 11]));
        registry.insert(NewRow::new(13, ws).owned_by(vec![10]));
        assert_eq!(windows(&registry), vec![30, 10, 11, 12, 13, 20]);
        assert_eq!(registry.depth(registry.row_for_window(12).unwrap()), Some(2));
        assert_consistent(&registry);
    }

    #[test]
    fn test_class_scan_does_not_split_owned_clusters() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("term")));
        registry.insert(NewRow::new(2, ws).with_class(class("zzz")).owned_by(vec![1]));
        registry.insert(NewRow::new(3, ws).with_class(class("term")));
        assert_eq!(windows(&registry), vec![1, 2, 3]);
    }

    #[test]
    fn test_desk_scenario() {
        let mut registry = Registry::new(2);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("term")));
        registry.insert(NewRow::new(2, ws).with_class(class("term")).owned_by(vec![1]));
        registry.insert(NewRow::new(3, ws).with_class(class("edit")));

        let row = |w| WindowEntry::Row(WindowRow {
            id: registry.row_for_window(w).unwrap(),
            window: w,
            section: ws,
        });
        assert_eq!(
            registry.entries(),
            &[
                WindowEntry::Header(Section::Workspace(0)),
                row(3),
                row(1),
                row(2),
                WindowEntry::Header(Section::Workspace(1)),
                WindowEntry::Header(Section::All),
            ]
        );
    }

    #[test]
    fn test_owner_in_other_section_is_ignored() {
        let mut registry = Registry::new(2);
        registry.insert(NewRow::new(1, Section::Workspace(0)).with_class(class("a")));
        registry.insert(NewRow::new(2, Section::Workspace(1)).with_class(class("b")));
        let inserted = registry.insert(
            NewRow::new(3, Section::Workspace(1))
                .with_class(class("c"))
                .owned_by(vec![1]),
        );
        assert_eq!(inserted.position, 4);
        assert_consistent(&registry);
    }

    #[test]
    fn test_cyclic_owner_chain_degrades_to_ownerless() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("m")));
        registry.insert(NewRow::new(2, ws).with_class(class("a")).owned_by(vec![1, 2]));
        assert_eq!(windows(&registry), vec![2, 1]);
        assert_eq!(registry.depth(registry.row_for_window(2).unwrap()), Some(0));
    }

    #[test]
    fn test_unlisted_owner_falls_back_to_class() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("m")));
        registry.insert(NewRow::new(2, ws).with_class(class("a")).owned_by(vec![99]));
        assert_eq!(windows(&registry), vec![2, 1]);
    }

    #[test]
    fn test_leader_groups_after_last_member() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        registry.insert(NewRow::new(1, ws).with_class(class("a")).with_leader(50));
        registry.insert(NewRow::new(2, ws).with_class(class("m")));
        registry.insert(NewRow::new(3, ws).with_class(class("z")).with_leader(50));
        assert_eq!(windows(&registry), vec![1, 3, 2]);
    }

    #[test]
    fn test_out_of_range_workspace_goes_to_all() {
        let mut registry = Registry::new(2);
        let inserted = registry.insert(NewRow::new(7, Section::Workspace(5)));
        assert_eq!(inserted.position, 3);
        let id = registry.row_for_window(7).unwrap();
        assert_eq!(registry.row(id).unwrap().section, Section::All);
        assert_consistent(&registry);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = Registry::new(1);
        let a = registry.insert(NewRow::new(1, Section::Workspace(0)).with_class(class("a")));
        let b = registry.insert(NewRow::new(2, Section::Workspace(0)).with_class(class("b")));
        assert_eq!(registry.find(b.id), Some(2));

        assert_eq!(registry.remove(a.id), Some(1));
        assert_eq!(registry.remove(a.id), None);
        assert_eq!(registry.find(a.id), None);
        assert_eq!(registry.find(b.id), Some(1));
        assert_eq!(registry.row_for_window(1), None);
        assert_consistent(&registry);
    }

    #[test]
    fn test_duplicate_insert_refiles_same_row() {
        let mut registry = Registry::new(2);
        let first = registry.insert(NewRow::new(1, Section::Workspace(0)));
        let second = registry.insert(NewRow::new(1, Section::Workspace(1)));
        assert_eq!(first.id, second.id);
        assert_eq!(registry.row_count(), 1);
        assert_eq!(second.position, 2);
        assert_consistent(&registry);
    }

    #[test]
    fn test_refile_keeps_id() {
        let mut registry = Registry::new(2);
        let inserted = registry.insert(NewRow::new(1, Section::Workspace(0)));
        assert_eq!(registry.refile(inserted.id, NewRow::new(1, Section::All)), Some(3));
        assert_eq!(registry.find(inserted.id), Some(3));
        assert_eq!(registry.refile(inserted.id, NewRow::new(2, Section::All)), None);
        assert_eq!(registry.refile(RowId(999), NewRow::new(1, Section::All)), None);
    }

    #[test]
    fn test_grow_workspaces_adds_headers_before_all() {
        let mut registry = Registry::new(3);
        for (window, ws) in [(1, 0), (2, 1), (3, 2)] {
            registry.insert(NewRow::new(window, Section::Workspace(ws)));
        }
        registry.insert(NewRow::new(4, Section::All));
        let before = windows(&registry);
        registry.drain_events();

        registry.resync_workspace_count(5);
        assert_eq!(windows(&registry), before);
        assert_eq!(registry.header_position(Section::Workspace(3)), Some(6));
        assert_eq!(registry.header_position(Section::Workspace(4)), Some(7));
        assert_eq!(registry.header_position(Section::All), Some(8));
        assert_eq!(
            registry.drain_events(),
            vec![RegistryEvent::Inserted(6), RegistryEvent::Inserted(7)]
        );
        assert_consistent(&registry);
    }

    #[test]
    fn test_shrink_workspaces_moves_rows_to_all() {
        let mut registry = Registry::new(5);
        for (window, ws) in [(1, 0), (3, 3), (4, 4), (5, 4)] {
            registry.insert(NewRow::new(window, Section::Workspace(ws)));
        }
        registry.insert(NewRow::new(9, Section::All));

        registry.resync_workspace_count(3);
        assert_eq!(windows(&registry), vec![1, 3, 4, 5, 9]);
        for window in [3, 4, 5, 9] {
            let id = registry.row_for_window(window).unwrap();
            assert_eq!(registry.row(id).unwrap().section, Section::All);
        }
        assert_eq!(registry.section_bounds(Section::All), Some(5..9));
        assert_eq!(registry.header_position(Section::Workspace(3)), None);
        assert_consistent(&registry);

        registry.resync_workspace_count(0);
        assert_eq!(registry.header_position(Section::All), Some(0));
        assert_eq!(windows(&registry), vec![1, 3, 4, 5, 9]);
        assert_consistent(&registry);
    }

    #[test]
    fn test_refile_moves_owned_rows_along() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        let owner = registry.insert(NewRow::new(1, ws).with_class(class("m")));
        registry.insert(NewRow::new(2, ws).with_class(class("m")).owned_by(vec![1]));
        registry.insert(NewRow::new(3, ws).with_class(class("t")));
        assert_eq!(windows(&registry), vec![1, 2, 3]);

        let position = registry.refile(owner.id, NewRow::new(1, ws).with_class(class("z")));
        assert_eq!(position, Some(2));
        assert_eq!(windows(&registry), vec![3, 1, 2]);
        assert_owners_grouped(&registry);
        assert_consistent(&registry);
    }

    #[test]
    fn test_readded_owner_adopts_its_transients() {
        let mut registry = Registry::new(1);
        let ws = Section::Workspace(0);
        let owner = registry.insert(NewRow::new(1, ws).with_class(class("m")));
        registry.insert(NewRow::new(2, ws).with_class(class("m")).owned_by(vec![1]));
        registry.insert(NewRow::new(3, ws).with_class(class("t")));
        registry.remove(owner.id);
        assert_eq!(windows(&registry), vec![2, 3]);

        let readded = registry.insert(NewRow::new(1, ws).with_class(class("z")));
        assert_eq!(windows(&registry), vec![3, 1, 2]);
        assert_eq!(readded.position, 2);
        assert_owners_grouped(&registry);
        assert_consistent(&registry);
    }

    #[test]
    fn test_shrink_regroups_migrated_transients() {
        let mut registry = Registry::new(3);
        registry.insert(NewRow::new(1, Section::All).with_class(class("a")));
        registry.insert(NewRow::new(2, Section::Workspace(2)).owned_by(vec![1]));
        assert_eq!(windows(&registry), vec![2, 1]);

        registry.resync_workspace_count(1);
        assert_eq!(windows(&registry), vec![1, 2]);
        assert_owners_grouped(&registry);
        assert_consistent(&registry);
    }

    #[test]
    fn test_events_track_positions() {
        let mut registry = Registry::new(1);
        let a = registry.insert(NewRow::new(1, Section::Workspace(0)));
        registry.remove(a.id);
        assert_eq!(
            registry.drain_events(),
            vec![RegistryEvent::Inserted(1), RegistryEvent::Removed(1)]
        );
        assert!(registry.drain_events().is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Insert { window: u32, ws: u32, class: Option<u8>, owner: Option<u32> },
        Remove { window: u32 },
        Resync { count: u32 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u32..24, 0u32..6, proptest::option::of(0u8..4), proptest::option::of(0u32..24))
                .prop_map(|(window, ws, class, owner)| Op::Insert { window, ws, class, owner }),
            2 => (0u32..24).prop_map(|window| Op::Remove { window }),
            1 => (0u32..6).prop_map(|count| Op::Resync { count }),
        ]
    }

    #[derive(Debug, Clone)]
    enum TreeOp {
        Insert { window: u32, ws: u32, class: Option<u8> },
        Restyle { window: u32, class: Option<u8> },
        Remove { window: u32 },
        Resync { count: u32 },
    }

    fn tree_op() -> impl Strategy<Value = TreeOp> {
        prop_oneof![
            5 => (0u32..24, 0u32..4, proptest::option::of(0u8..4))
                .prop_map(|(window, ws, class)| TreeOp::Insert { window, ws, class }),
            2 => (0u32..24, proptest::option::of(0u8..4))
                .prop_map(|(window, class)| TreeOp::Restyle { window, class }),
            2 => (0u32..24).prop_map(|window| TreeOp::Remove { window }),
            1 => (0u32..4).prop_map(|count| TreeOp::Resync { count }),
        ]
    }

    #[derive(Debug, Clone)]
    enum ClassOp {
        Insert { window: u32, class: Option<u8> },
        Remove { window: u32 },
    }

    fn class_op() -> impl Strategy<Value = ClassOp> {
        prop_oneof![
            3 => (0u32..16, proptest::option::of(0u8..4))
                .prop_map(|(window, class)| ClassOp::Insert { window, class }),
            1 => (0u32..16).prop_map(|window| ClassOp::Remove { window }),
        ]
    }

    proptest! {
        /// Rows never leave their section and the position index stays exact
        #[test]
        fn rows_stay_in_their_sections(ops in proptest::collection::vec(op(), 1..60)) {
            let mut registry = Registry::new(3);
            for op in ops {
                match op {
                    Op::Insert { window, ws, class, owner } => {
                        let section = if ws == 5 { Section::All } else { Section::Workspace(ws) };
                        let mut row = NewRow::new(window, section);
                        if let Some(c) = class {
                            row = row.with_class(ClassHint::new("", format!("c{}", c)));
                        }
                        if let Some(owner) = owner {
                            row = row.owned_by(vec![owner]);
                        }
                        registry.insert(row);
                    }
                    Op::Remove { window } => {
                        if let Some(id) = registry.row_for_window(window) {
                            registry.remove(id);
                        }
                    }
                    Op::Resync { count } => registry.resync_workspace_count(count),
                }
                assert_consistent(&registry);
            }
        }

        /// Equal classes keep arrival order
        #[test]
        fn class_sort_is_stable(classes in proptest::collection::vec(0u8..3, 1..20)) {
            let mut registry = Registry::new(1);
            for (window, c) in classes.iter().enumerate() {
                registry.insert(
                    NewRow::new(window as u32, Section::Workspace(0))
                        .with_class(ClassHint::new("", format!("c{}", c))),
                );
            }
            let mut expected: Vec<(u8, u32)> = classes
                .iter()
                .enumerate()
                .map(|(window, c)| (*c, window as u32))
                .collect();
            expected.sort();
            let expected: Vec<u32> = expected.into_iter().map(|(_, w)| w).collect();
            prop_assert_eq!(windows(&registry), expected);
        }

        /// Transients stay below their owners whatever the interleaving of
        /// inserts, refiles, removals and workspace changes
        #[test]
        fn transients_follow_their_owners(ops in proptest::collection::vec(tree_op(), 1..80)) {
            let mut registry = Registry::new(3);
            for op in ops {
                match op {
                    TreeOp::Insert { window, ws, class } => {
                        let section = if ws == 3 { Section::All } else { Section::Workspace(ws) };
                        registry.insert(styled(window, section, class).owned_by(tree_chain(window)));
                    }
                    TreeOp::Restyle { window, class } => {
                        if let Some(id) = registry.row_for_window(window) {
                            let section = registry.row(id).unwrap().section;
                            let row = styled(window, section, class).owned_by(tree_chain(window));
                            registry.refile(id, row);
                        }
                    }
                    TreeOp::Remove { window } => {
                        if let Some(id) = registry.row_for_window(window) {
                            registry.remove(id);
                        }
                    }
                    TreeOp::Resync { count } => registry.resync_workspace_count(count),
                }
                assert_consistent(&registry);
                assert_owners_grouped(&registry);
            }
        }

        /// Ownerless rows stay sorted by class, equal classes in the order
        /// they were last placed
        #[test]
        fn class_order_survives_removals_and_refiles(ops in proptest::collection::vec(class_op(), 1..60)) {
            let mut registry = Registry::new(1);
            let mut placed: Vec<(WindowRef, Option<u8>, usize)> = Vec::new();
            for (stamp, op) in ops.into_iter().enumerate() {
                match op {
                    ClassOp::Insert { window, class } => {
                        registry.insert(styled(window, Section::Workspace(0), class));
                        placed.retain(|(w, _, _)| *w != window);
                        placed.push((window, class, stamp));
                    }
                    ClassOp::Remove { window } => {
                        if let Some(id) = registry.row_for_window(window) {
                            registry.remove(id);
                        }
                        placed.retain(|(w, _, _)| *w != window);
                    }
                }
            }
            placed.sort_by_key(|(_, class, stamp)| (class.is_none(), *class, *stamp));
            let expected: Vec<WindowRef> = placed.into_iter().map(|(w, _, _)| w).collect();
            prop_assert_eq!(windows(&registry), expected);
        }
    }
}
