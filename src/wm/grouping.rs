//! Grouping Module
//!
//! Decides where a new row goes inside its section:
//!
//! 1. directly below its owner (after the owner's other transients),
//! 2. otherwise after the last window sharing its client leader,
//! 3. otherwise by class hint, equal classes in arrival order.
//!
//! A cluster is a row together with the rows below it that it (transitively)
//! owns. Rules 2 and 3 only ever insert between clusters.

use std::cmp::Ordering;
use std::ops::Range;
use tracing::debug;

use crate::wm::entry::ClassHint;
use crate::wm::registry::{Registry, RowInfo};

/// Order a new window's class hint against a listed one.
///
/// A missing hint sorts after any hint. Classes are compared when both are
/// set, then names; anything else compares equal.
pub fn compare_class(new: Option<&ClassHint>, existing: Option<&ClassHint>) -> Ordering {
    match (new, existing) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            if !a.res_class.is_empty() && !b.res_class.is_empty() {
                a.res_class.cmp(&b.res_class)
            } else if !a.res_name.is_empty() && !b.res_name.is_empty() {
                a.res_name.cmp(&b.res_name)
            } else {
                Ordering::Equal
            }
        }
    }
}

/// Position at which a row described by `row` is inserted
pub fn insertion_point(registry: &Registry, row: &RowInfo) -> usize {
    let Some(bounds) = registry.section_bounds(row.section) else {
        return registry.len();
    };

    if let Some(owner) = row.owners.direct_owner() {
        match registry.position_of_window(owner) {
            Some(pos) if bounds.contains(&pos) => {
                return cluster_end(registry, pos, bounds.end);
            }
            Some(_) => debug!(
                "Owner {} of window {} is listed in another section",
                owner, row.window
            ),
            None => debug!("Owner {} of window {} is not listed", owner, row.window),
        }
    }

    if let Some(leader) = row.leader {
        let last = clusters(registry, bounds.clone())
            .filter(|cluster| {
                registry
                    .row_at(cluster.start)
                    .is_some_and(|(_, info)| info.leader == Some(leader))
            })
            .last();
        if let Some(cluster) = last {
            return cluster.end;
        }
    }

    let mut have = bounds.end;
    for cluster in clusters(registry, bounds) {
        let Some((_, info)) = registry.row_at(cluster.start) else {
            continue;
        };
        match compare_class(row.class.as_ref(), info.class.as_ref()) {
            Ordering::Less => return cluster.start,
            Ordering::Equal => have = cluster.end,
            Ordering::Greater => {}
        }
    }
    have
}

/// End (exclusive) of the cluster rooted at `start`, not beyond `stop`
pub(crate) fn cluster_end(registry: &Registry, start: usize, stop: usize) -> usize {
    let Some((root, _)) = registry.row_at(start) else {
        return start + 1;
    };
    let root = root.window;
    let mut end = start + 1;
    while end < stop {
        match registry.row_at(end) {
            Some((_, info)) if info.owners.contains(root) => end += 1,
            _ => break,
        }
    }
    end
}

/// Consecutive clusters covering `bounds`
fn clusters(registry: &Registry, bounds: Range<usize>) -> impl Iterator<Item = Range<usize>> + '_ {
    let stop = bounds.end;
    let mut next = bounds.start;
    std::iter::from_fn(move || {
        if next >= stop {
            return None;
        }
        let start = next;
        next = cluster_end(registry, start, stop);
        Some(start..next)
    })
}
