//! # Synced Trees
//!
//! Pairs a model with its projection so no caller can mutate one without the
//! other. Every mutation goes through [`SyncedTree::apply`], which hands the
//! resulting change to the projection before returning.

use std::fmt;

use log::error;

use crate::core::description::HierarchyDescription;
use crate::core::hierarchy::{Hierarchy, NodeId};
use crate::core::projection::{ProjectionDesyncError, TreeStore};
use crate::core::registry::{ComponentRegistry, EntryId, FolderId, RegistryKey};
use crate::core::tree::{StructuralChange, TreeError, TreeSource};

/// A failed mutation of a synced tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The model rejected the mutation; nothing changed.
    Model(TreeError),
    /// The model changed but the projection could not follow.
    Desync(ProjectionDesyncError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Model(e) => write!(f, "{e}"),
            SyncError::Desync(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Model(e) => Some(e),
            SyncError::Desync(e) => Some(e),
        }
    }
}

impl From<TreeError> for SyncError {
    fn from(e: TreeError) -> Self {
        SyncError::Model(e)
    }
}

impl From<ProjectionDesyncError> for SyncError {
    fn from(e: ProjectionDesyncError) -> Self {
        SyncError::Desync(e)
    }
}

#[derive(Debug)]
pub struct SyncedTree<M: TreeSource> {
    model: M,
    store: TreeStore<M::Key>,
}

impl<M: TreeSource> SyncedTree<M> {
    pub fn attach(model: M) -> Self {
        let store = TreeStore::attach(&model);
        Self { model, store }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn store(&self) -> &TreeStore<M::Key> {
        &self.store
    }

    /// View state (selection, expansion) only. Rows cannot be edited here.
    pub fn store_mut(&mut self) -> &mut TreeStore<M::Key> {
        &mut self.store
    }

    /// Run one mutation and patch the projection with its change.
    pub fn apply<T>(
        &mut self,
        mutate: impl FnOnce(&mut M) -> Result<(T, StructuralChange<M::Key>), TreeError>,
    ) -> Result<T, SyncError> {
        let (value, change) = mutate(&mut self.model)?;
        if let Err(e) = self.store.on_structural_change(&self.model, &change) {
            error!("Projection rejected {change:?}: {e}");
            return Err(e.into());
        }
        #[cfg(debug_assertions)]
        if let Err(e) = self.store.verify(&self.model) {
            error!("Projection drifted after {change:?}: {e}");
            return Err(e.into());
        }
        Ok(value)
    }

    /// Rebuild the projection from scratch.
    pub fn resync(&mut self) {
        self.store.resync(&self.model);
    }
}

impl SyncedTree<Hierarchy> {
    /// `parent` must have a row: detached subtrees are not projected.
    fn displayed_parent(&self, parent: NodeId) -> Result<(), TreeError> {
        if self.model.contains(parent) && !self.model.is_attached(parent) {
            return Err(TreeError::InvalidInsert(format!(
                "{parent} is detached and not shown in the tree"
            )));
        }
        Ok(())
    }

    /// `node` must have a row to be removed or moved.
    fn displayed_node(&self, node: NodeId) -> Result<(), TreeError> {
        if self.model.contains(node) && !self.model.is_attached(node) {
            return Err(TreeError::NotFound(format!("{node} is detached")));
        }
        Ok(())
    }

    pub fn insert_child(&mut self, parent: NodeId, node: NodeId, at: isize) -> Result<(), SyncError> {
        self.displayed_parent(parent)?;
        self.apply(|h| Ok(((), h.insert_child(parent, node, at)?)))
    }

    pub fn insert_description(
        &mut self,
        parent: NodeId,
        description: &HierarchyDescription,
        at: isize,
    ) -> Result<NodeId, SyncError> {
        self.displayed_parent(parent)?;
        self.apply(|h| h.insert_description(parent, description, at))
    }

    /// Detach `node`. The subtree stays in the arena.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), SyncError> {
        self.displayed_node(node)?;
        self.apply(|h| Ok(((), h.remove_node(node)?)))
    }

    /// Detach `node` and free it with its whole subtree.
    pub fn delete_node(&mut self, node: NodeId) -> Result<usize, SyncError> {
        self.remove_node(node)?;
        Ok(self.model.discard(node)?)
    }

    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId, at: isize) -> Result<(), SyncError> {
        self.model.validate_move(node, new_parent)?;
        self.displayed_node(node)?;
        self.displayed_parent(new_parent)?;
        let selected = self.store.selected();
        self.apply(|h| Ok(((), h.remove_node(node)?)))?;
        self.apply(|h| Ok(((), h.insert_child(new_parent, node, at)?)))?;
        if selected == Some(node) {
            self.store.select(node);
        }
        Ok(())
    }

    pub fn move_within(&mut self, node: NodeId, at: isize) -> Result<(), SyncError> {
        self.displayed_node(node)?;
        self.apply(|h| Ok(((), h.move_within(node, at)?)))
    }
}

impl SyncedTree<ComponentRegistry> {
    pub fn add_folder(&mut self, name: impl Into<String>, at: isize) -> Result<FolderId, SyncError> {
        let name = name.into();
        self.apply(|r| Ok(r.add_folder(name, at)))
    }

    pub fn remove_folder(&mut self, id: FolderId) -> Result<(), SyncError> {
        self.apply(|r| Ok(((), r.remove_folder(id)?)))
    }

    pub fn add_entry(
        &mut self,
        folder: FolderId,
        name: impl Into<String>,
        icon: impl Into<String>,
        at: isize,
    ) -> Result<EntryId, SyncError> {
        let (name, icon) = (name.into(), icon.into());
        self.apply(|r| r.add_entry(folder, name, icon, at))
    }

    pub fn remove_entry(&mut self, id: EntryId) -> Result<(), SyncError> {
        self.apply(|r| Ok(((), r.remove_entry(id)?)))
    }

    /// Folder the selection belongs to, if anything is selected.
    pub fn selected_folder(&self) -> Option<FolderId> {
        match self.store.selected()? {
            RegistryKey::Folder(id) => Some(id),
            RegistryKey::Entry(id) => self.model.folder_of(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{demo_hierarchy, demo_registry};

    #[test]
    fn test_registry_edits_keep_projection_in_step() {
        let mut tree = SyncedTree::attach(demo_registry());
        let folder = tree.model().folders()[1].id;
        let id = tree.add_entry(folder, "Adder", "x", 1).unwrap();
        assert_eq!(tree.store().len(), 9);
        assert!(tree.store().verify(tree.model()).is_ok());

        tree.remove_entry(id).unwrap();
        assert_eq!(tree.store().len(), 8);
        assert!(matches!(
            tree.remove_entry(id),
            Err(SyncError::Model(TreeError::NotFound(_)))
        ));
        assert_eq!(tree.store().len(), 8);
    }

    #[test]
    fn test_selected_folder_follows_entry() {
        let mut tree = SyncedTree::attach(demo_registry());
        let folder = tree.model().folders()[1].id;
        let entry = tree.model().folders()[1].entries()[2].id;
        tree.store_mut().select(RegistryKey::Entry(entry));
        assert_eq!(tree.selected_folder(), Some(folder));
    }

    #[test]
    fn test_folder_add_and_remove() {
        let mut tree = SyncedTree::attach(demo_registry());
        let id = tree.add_folder("Memory", -1).unwrap();
        assert_eq!(tree.store().rows()[0].label, "Memory");
        tree.add_entry(id, "RAM", "x", 0).unwrap();
        tree.remove_folder(id).unwrap();
        assert_eq!(tree.store().len(), 8);
        assert!(tree.store().verify(tree.model()).is_ok());
    }

    #[test]
    fn test_move_node_keeps_selection() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let root = tree.model().root();
        let kids = tree.model().get(root).unwrap().children().to_vec();
        tree.store_mut().select(kids[1]);
        tree.move_node(kids[1], kids[2], 0).unwrap();
        assert_eq!(tree.store().selected(), Some(kids[1]));
        assert_eq!(tree.store().row(kids[1]).unwrap().depth, 2);
        assert!(tree.store().verify(tree.model()).is_ok());
    }

    #[test]
    fn test_invalid_move_changes_nothing() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let root = tree.model().root();
        let comp2 = tree.model().get(root).unwrap().children()[1];
        let nested = tree.model().get(comp2).unwrap().children()[0];
        let before = tree.store().rows().to_vec();
        assert!(matches!(
            tree.move_node(comp2, nested, 0),
            Err(SyncError::Model(TreeError::InvalidInsert(_)))
        ));
        assert_eq!(tree.store().rows(), &before[..]);
    }

    #[test]
    fn test_delete_node_frees_subtree() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let root = tree.model().root();
        let comp2 = tree.model().get(root).unwrap().children()[1];
        assert_eq!(tree.delete_node(comp2).unwrap(), 3);
        assert!(!tree.model().contains(comp2));
        assert_eq!(tree.store().len(), 4);
    }

    fn detached_comp2(tree: &mut SyncedTree<Hierarchy>) -> NodeId {
        let root = tree.model().root();
        let comp2 = tree.model().get(root).unwrap().children()[1];
        tree.remove_node(comp2).unwrap();
        comp2
    }

    #[test]
    fn test_insert_under_detached_parent_is_rejected() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let comp2 = detached_comp2(&mut tree);
        let arena_before = tree.model().len();
        let leaf = HierarchyDescription::leaf("Orphan", "x");
        assert!(matches!(
            tree.insert_description(comp2, &leaf, 0),
            Err(SyncError::Model(TreeError::InvalidInsert(_)))
        ));
        assert_eq!(tree.model().len(), arena_before);

        let spare = tree.model.create_detached("Spare", "x");
        assert!(matches!(
            tree.insert_child(comp2, spare, 0),
            Err(SyncError::Model(TreeError::InvalidInsert(_)))
        ));
        assert!(tree.model().get(spare).unwrap().parent().is_none());
        assert!(tree.store().verify(tree.model()).is_ok());
    }

    #[test]
    fn test_move_into_detached_parent_changes_nothing() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let root = tree.model().root();
        let comp1 = tree.model().get(root).unwrap().children()[0];
        let comp2 = detached_comp2(&mut tree);
        let before = tree.store().rows().to_vec();
        assert!(matches!(
            tree.move_node(comp1, comp2, 0),
            Err(SyncError::Model(TreeError::InvalidInsert(_)))
        ));
        assert_eq!(tree.store().rows(), &before[..]);
        assert!(tree.model().is_attached(comp1));
    }

    #[test]
    fn test_edits_inside_detached_subtree_are_not_found() {
        let mut tree = SyncedTree::attach(demo_hierarchy());
        let comp2 = detached_comp2(&mut tree);
        let nested = tree.model().get(comp2).unwrap().children()[0];
        assert!(matches!(
            tree.remove_node(nested),
            Err(SyncError::Model(TreeError::NotFound(_)))
        ));
        assert!(matches!(
            tree.move_within(nested, 1),
            Err(SyncError::Model(TreeError::NotFound(_)))
        ));
        assert_eq!(tree.model().get(comp2).unwrap().children()[0], nested);
        assert_eq!(tree.store().len(), 4);
    }
}
