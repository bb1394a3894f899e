//! # Tree Projection
//!
//! `TreeStore` is the row model a tree widget renders: one row per model
//! node, in pre-order, tagged with depth. It also owns the view state a tree
//! widget needs (which rows are expanded, which row is selected).
//!
//! ## Synchronization contract
//!
//! - [`TreeStore::attach`] projects the whole model once.
//! - After every structural mutation the model's [`StructuralChange`] is fed
//!   to [`TreeStore::on_structural_change`], which patches only the rows of
//!   the affected parent. Expansion and selection of untouched rows survive.
//! - A change naming a node the store never projected is a
//!   [`ProjectionDesyncError`]; nothing is patched in that case.
//! - [`TreeStore::resync`] rebuilds everything. It is the fallback, not the
//!   normal path.
//!
//! The store keeps rows for collapsed subtrees too, so `rows()` always has
//! exactly as many entries as the model has nodes. Collapsing only affects
//! [`TreeStore::visible`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use log::{debug, warn};

use crate::core::tree::{ChangeKind, StructuralChange, TreeSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<K> {
    pub key: K,
    pub depth: usize,
    pub label: String,
    pub icon: String,
    pub expanded: bool,
}

/// The store was told about a node it has no projection for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionDesyncError {
    /// The parent (or removed node) has no row.
    UnknownNode(String),
    /// The parent has a row but no child row at `index`.
    UnknownChild { parent: String, index: usize },
    /// An inserted node already has a row.
    AlreadyProjected(String),
    /// Store and model disagree at `position`.
    Mismatch {
        position: usize,
        expected: String,
        found: String,
    },
}

impl fmt::Display for ProjectionDesyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionDesyncError::UnknownNode(key) => {
                write!(f, "projection desync: no row for {key}")
            }
            ProjectionDesyncError::UnknownChild { parent, index } => {
                write!(f, "projection desync: {parent} has no child row at {index}")
            }
            ProjectionDesyncError::AlreadyProjected(key) => {
                write!(f, "projection desync: {key} is already projected")
            }
            ProjectionDesyncError::Mismatch {
                position,
                expected,
                found,
            } => write!(
                f,
                "projection desync at row {position}: expected {expected}, found {found}"
            ),
        }
    }
}

impl std::error::Error for ProjectionDesyncError {}

fn describe<K: fmt::Debug>(key: Option<&K>) -> String {
    match key {
        Some(k) => format!("{k:?}"),
        None => "<top level>".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct TreeStore<K> {
    rows: Vec<Row<K>>,
    selected: Option<K>,
}

impl<K> TreeStore<K>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Project the whole model, everything expanded, first row selected.
    pub fn attach<S: TreeSource<Key = K>>(source: &S) -> Self {
        let rows = project_all(source, &HashMap::new());
        debug!("Attached projection with {} rows", rows.len());
        Self {
            selected: rows.first().map(|r| r.key),
            rows,
        }
    }

    pub fn rows(&self) -> &[Row<K>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn position(&self, key: K) -> Option<usize> {
        self.rows.iter().position(|r| r.key == key)
    }

    pub fn row(&self, key: K) -> Option<&Row<K>> {
        self.position(key).map(|p| &self.rows[p])
    }

    /// First position after the descendants of the row at `pos`.
    fn subtree_end(&self, pos: usize) -> usize {
        let depth = self.rows[pos].depth;
        pos + 1
            + self.rows[pos + 1..]
                .iter()
                .take_while(|r| r.depth > depth)
                .count()
    }

    /// Positions of the direct child rows of `parent`, their depth, and the
    /// position right after the parent's subtree.
    fn child_rows(&self, parent: Option<K>) -> Result<(Vec<usize>, usize, usize), ProjectionDesyncError> {
        match parent {
            None => {
                let positions = self
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| r.depth == 0)
                    .map(|(i, _)| i)
                    .collect();
                Ok((positions, 0, self.rows.len()))
            }
            Some(p) => {
                let pos = self
                    .position(p)
                    .ok_or_else(|| ProjectionDesyncError::UnknownNode(format!("{p:?}")))?;
                let depth = self.rows[pos].depth + 1;
                let end = self.subtree_end(pos);
                let positions = (pos + 1..end)
                    .filter(|&i| self.rows[i].depth == depth)
                    .collect();
                Ok((positions, depth, end))
            }
        }
    }

    /// Key of the nearest row above `pos` with smaller depth.
    fn parent_key(&self, pos: usize) -> Option<K> {
        let depth = self.rows.get(pos)?.depth;
        self.rows[..pos]
            .iter()
            .rev()
            .find(|r| r.depth < depth)
            .map(|r| r.key)
    }

    /// Whether the row for `key` has child rows.
    pub fn has_children(&self, key: K) -> bool {
        self.position(key).is_some_and(|pos| {
            self.rows
                .get(pos + 1)
                .is_some_and(|next| next.depth > self.rows[pos].depth)
        })
    }

    // ========================================================================
    // Synchronization
    // ========================================================================

    /// Patch the rows under `change.parent` to reflect a model mutation.
    ///
    /// Must be called once per mutation, in mutation order, with the model in
    /// the state right after that mutation.
    pub fn on_structural_change<S: TreeSource<Key = K>>(
        &mut self,
        source: &S,
        change: &StructuralChange<K>,
    ) -> Result<(), ProjectionDesyncError> {
        let parent = change.parent;
        match change.kind {
            ChangeKind::Inserted { index, key } => {
                if self.position(key).is_some() {
                    return Err(ProjectionDesyncError::AlreadyProjected(format!("{key:?}")));
                }
                let (children, depth, end) = self.child_rows(parent)?;
                if index > children.len() {
                    return Err(ProjectionDesyncError::UnknownChild {
                        parent: describe(parent.as_ref()),
                        index,
                    });
                }
                let model_children = match parent {
                    Some(p) => source.children(p),
                    None => source.roots(),
                };
                if model_children.get(index) != Some(&key) {
                    return Err(ProjectionDesyncError::Mismatch {
                        position: index,
                        expected: format!("{key:?}"),
                        found: describe(model_children.get(index)),
                    });
                }
                let at = children.get(index).copied().unwrap_or(end);
                let new_rows = project_subtree(source, key, depth, &HashMap::new());
                debug!(
                    "Projection: inserted {} rows for {key:?} at row {at}",
                    new_rows.len()
                );
                self.rows.splice(at..at, new_rows);
            }
            ChangeKind::Removed { index, key } => {
                let (children, _, _) = self.child_rows(parent)?;
                let pos = match children.get(index) {
                    Some(&p) if self.rows[p].key == key => p,
                    _ if self.position(key).is_none() => {
                        return Err(ProjectionDesyncError::UnknownNode(format!("{key:?}")));
                    }
                    _ => {
                        return Err(ProjectionDesyncError::UnknownChild {
                            parent: describe(parent.as_ref()),
                            index,
                        });
                    }
                };
                let end = self.subtree_end(pos);
                let removed: Vec<Row<K>> = self.rows.drain(pos..end).collect();
                debug!("Projection: removed {} rows for {key:?}", removed.len());
                if let Some(selected) = self.selected
                    && removed.iter().any(|r| r.key == selected)
                {
                    self.selected = parent.or_else(|| {
                        self.rows
                            .get(pos)
                            .or_else(|| self.rows.last())
                            .map(|r| r.key)
                    });
                }
            }
            ChangeKind::Reordered => {
                let (start, end, depth, keys) = match parent {
                    Some(p) => {
                        let pos = self
                            .position(p)
                            .ok_or_else(|| ProjectionDesyncError::UnknownNode(format!("{p:?}")))?;
                        (
                            pos + 1,
                            self.subtree_end(pos),
                            self.rows[pos].depth + 1,
                            source.children(p),
                        )
                    }
                    None => (0, self.rows.len(), 0, source.roots()),
                };
                let projected: HashSet<K> = self.rows[start..end]
                    .iter()
                    .filter(|r| r.depth == depth)
                    .map(|r| r.key)
                    .collect();
                let current: HashSet<K> = keys.iter().copied().collect();
                if projected != current || current.len() != keys.len() {
                    return Err(ProjectionDesyncError::Mismatch {
                        position: start,
                        expected: format!("{} children of {}", keys.len(), describe(parent.as_ref())),
                        found: format!("{} projected, different keys", projected.len()),
                    });
                }
                let memory = expansion_memory(&self.rows[start..end]);
                let new_rows: Vec<Row<K>> = keys
                    .into_iter()
                    .flat_map(|k| project_subtree(source, k, depth, &memory))
                    .collect();
                if new_rows.len() != end - start {
                    return Err(ProjectionDesyncError::Mismatch {
                        position: start,
                        expected: format!("{} rows", new_rows.len()),
                        found: format!("{} rows", end - start),
                    });
                }
                debug!("Projection: reordered children of {}", describe(parent.as_ref()));
                self.rows.splice(start..end, new_rows);
            }
        }
        Ok(())
    }

    /// Rebuild every row from the model, keeping expansion and selection of
    /// nodes that still exist.
    pub fn resync<S: TreeSource<Key = K>>(&mut self, source: &S) {
        warn!("Projection: full resync of {} rows", self.rows.len());
        let memory = expansion_memory(&self.rows);
        self.rows = project_all(source, &memory);
        if self.selected.is_none_or(|k| self.position(k).is_none()) {
            self.selected = self.rows.first().map(|r| r.key);
        }
    }

    /// Compare the rows against a fresh pre-order flattening of the model.
    pub fn verify<S: TreeSource<Key = K>>(&self, source: &S) -> Result<(), ProjectionDesyncError> {
        let flat = source.flatten();
        for position in 0..flat.len().max(self.rows.len()) {
            let expected = flat.get(position);
            let found = self.rows.get(position);
            let agree = match (expected, found) {
                (Some(&(depth, key)), Some(row)) => row.key == key && row.depth == depth,
                _ => false,
            };
            if !agree {
                return Err(ProjectionDesyncError::Mismatch {
                    position,
                    expected: describe(expected.map(|(_, k)| k)),
                    found: describe(found.map(|r| &r.key)),
                });
            }
        }
        Ok(())
    }

    // ========================================================================
    // View state
    // ========================================================================

    /// Row positions not hidden under a collapsed ancestor.
    pub fn visible(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.rows.len());
        let mut collapsed_at: Option<usize> = None;
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(depth) = collapsed_at {
                if row.depth > depth {
                    continue;
                }
                collapsed_at = None;
            }
            out.push(i);
            if !row.expanded {
                collapsed_at = Some(row.depth);
            }
        }
        out
    }

    pub fn selected(&self) -> Option<K> {
        self.selected
    }

    /// Select `key`. Returns false (and keeps the old selection) for keys
    /// without a row.
    pub fn select(&mut self, key: K) -> bool {
        if self.position(key).is_some() {
            self.selected = Some(key);
            true
        } else {
            false
        }
    }

    /// Index of the selection within [`visible`](Self::visible).
    pub fn selected_visible_index(&self) -> Option<usize> {
        let pos = self.position(self.selected?)?;
        self.visible().iter().position(|&v| v == pos)
    }

    fn step_selection(&mut self, forward: bool) {
        let visible = self.visible();
        let Some(&first) = visible.first() else {
            self.selected = None;
            return;
        };
        let next = match self.selected_visible_index() {
            Some(i) if forward => visible[(i + 1).min(visible.len() - 1)],
            Some(i) => visible[i.saturating_sub(1)],
            None => first,
        };
        self.selected = Some(self.rows[next].key);
    }

    pub fn select_next(&mut self) {
        self.step_selection(true);
    }

    pub fn select_previous(&mut self) {
        self.step_selection(false);
    }

    pub fn set_expanded(&mut self, key: K, expanded: bool) -> bool {
        let Some(pos) = self.position(key) else {
            return false;
        };
        self.rows[pos].expanded = expanded;
        // a selection hidden by the collapse moves up to the collapsed row
        if !expanded
            && let Some(sel) = self.selected.and_then(|k| self.position(k))
            && sel > pos
            && sel < self.subtree_end(pos)
        {
            self.selected = Some(key);
        }
        true
    }

    pub fn toggle(&mut self, key: K) -> bool {
        match self.row(key).map(|r| r.expanded) {
            Some(expanded) => self.set_expanded(key, !expanded),
            None => false,
        }
    }

    /// Expand the selection, or step into its first child if already expanded.
    pub fn expand_selected(&mut self) {
        let Some(key) = self.selected else { return };
        let Some(pos) = self.position(key) else { return };
        if !self.has_children(key) {
            return;
        }
        if self.rows[pos].expanded {
            self.selected = Some(self.rows[pos + 1].key);
        } else {
            self.rows[pos].expanded = true;
        }
    }

    /// Collapse the selection, or move to its parent if it is already
    /// collapsed or a leaf.
    pub fn collapse_selected(&mut self) {
        let Some(key) = self.selected else { return };
        let Some(pos) = self.position(key) else { return };
        if self.has_children(key) && self.rows[pos].expanded {
            self.rows[pos].expanded = false;
        } else if let Some(parent) = self.parent_key(pos) {
            self.selected = Some(parent);
        }
    }

    pub fn toggle_selected(&mut self) {
        if let Some(key) = self.selected {
            self.toggle(key);
        }
    }
}

fn expansion_memory<K: Copy + Eq + Hash>(rows: &[Row<K>]) -> HashMap<K, bool> {
    rows.iter().map(|r| (r.key, r.expanded)).collect()
}

fn project_all<S: TreeSource>(source: &S, memory: &HashMap<S::Key, bool>) -> Vec<Row<S::Key>> {
    source
        .roots()
        .into_iter()
        .flat_map(|root| project_subtree(source, root, 0, memory))
        .collect()
}

/// Pre-order rows for the subtree at `top`, which sits at `depth`.
fn project_subtree<S: TreeSource>(
    source: &S,
    top: S::Key,
    depth: usize,
    memory: &HashMap<S::Key, bool>,
) -> Vec<Row<S::Key>> {
    let mut rows = Vec::new();
    let mut stack = vec![(top, depth)];
    while let Some((key, depth)) = stack.pop() {
        rows.push(Row {
            key,
            depth,
            label: source.label(key).unwrap_or_default().to_string(),
            icon: source.icon(key).unwrap_or_default().to_string(),
            expanded: memory.get(&key).copied().unwrap_or(true),
        });
        stack.extend(source.children(key).into_iter().rev().map(|c| (c, depth + 1)));
    }
    rows
}
