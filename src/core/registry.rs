//! # Component Registry
//!
//! Reusable building blocks, grouped into folders for display. Folders do not
//! nest, so the registry is a two-level tree: folders at the top, entries
//! below them.
//!
//! Entries carry an explicit [`EntryId`]. Names are display text only and may
//! repeat; [`ComponentRegistry::entries_named`] returns every match so callers
//! have to face the ambiguity instead of silently picking one.

use std::fmt;

use log::debug;

use crate::core::description::FolderDescription;
use crate::core::tree::{StructuralChange, TreeError, TreeSource, clamp_index};

/// Icon shown for folder rows.
pub const FOLDER_ICON: &str = "folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u32);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folder#{}", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// Row identity for projections of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKey {
    Folder(FolderId),
    Entry(EntryId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    pub id: EntryId,
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFolder {
    pub id: FolderId,
    pub name: String,
    entries: Vec<ComponentEntry>,
}

impl ComponentFolder {
    pub fn entries(&self) -> &[ComponentEntry] {
        &self.entries
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    folders: Vec<ComponentFolder>,
    // Ids are never reused, so a removed id stays unknown.
    next_id: u32,
}

impl ComponentRegistry {
    pub fn build(folders: &[FolderDescription]) -> Self {
        let mut registry = Self::default();
        for desc in folders {
            let id = FolderId(registry.allocate_id());
            let entries = desc
                .entries
                .iter()
                .map(|e| ComponentEntry {
                    id: EntryId(registry.allocate_id()),
                    name: e.name.clone(),
                    icon: e.icon.clone(),
                })
                .collect();
            registry.folders.push(ComponentFolder {
                id,
                name: desc.name.clone(),
                entries,
            });
        }
        debug!(
            "Built registry with {} folders, {} entries",
            registry.folders.len(),
            registry.entry_count()
        );
        registry
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn folders(&self) -> &[ComponentFolder] {
        &self.folders
    }

    pub fn entry_count(&self) -> usize {
        self.folders.iter().map(|f| f.entries.len()).sum()
    }

    pub fn folder(&self, id: FolderId) -> Option<&ComponentFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    fn folder_position(&self, id: FolderId) -> Result<usize, TreeError> {
        self.folders
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| TreeError::NotFound(format!("{id} does not exist")))
    }

    /// (folder position, entry position) of an entry.
    fn locate(&self, id: EntryId) -> Option<(usize, usize)> {
        self.folders.iter().enumerate().find_map(|(fi, folder)| {
            folder
                .entries
                .iter()
                .position(|e| e.id == id)
                .map(|ei| (fi, ei))
        })
    }

    pub fn entry(&self, id: EntryId) -> Option<&ComponentEntry> {
        self.locate(id).map(|(fi, ei)| &self.folders[fi].entries[ei])
    }

    /// The folder owning `entry`.
    pub fn folder_of(&self, entry: EntryId) -> Option<FolderId> {
        self.locate(entry).map(|(fi, _)| self.folders[fi].id)
    }

    /// Position of `entry` within its folder.
    pub fn index_in_folder(&self, entry: EntryId) -> Option<usize> {
        self.locate(entry).map(|(_, ei)| ei)
    }

    /// All entries whose name is exactly `name`, in display order.
    pub fn entries_named(&self, name: &str) -> Vec<EntryId> {
        self.folders
            .iter()
            .flat_map(|f| f.entries.iter())
            .filter(|e| e.name == name)
            .map(|e| e.id)
            .collect()
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Add a folder at `at` (clamped like every other insert).
    pub fn add_folder(
        &mut self,
        name: impl Into<String>,
        at: isize,
    ) -> (FolderId, StructuralChange<RegistryKey>) {
        let id = FolderId(self.allocate_id());
        let index = clamp_index(at, self.folders.len());
        self.folders.insert(
            index,
            ComponentFolder {
                id,
                name: name.into(),
                entries: Vec::new(),
            },
        );
        debug!("Added {id} at {index}");
        (
            id,
            StructuralChange::inserted(None, index, RegistryKey::Folder(id)),
        )
    }

    /// Remove a folder together with its entries.
    pub fn remove_folder(
        &mut self,
        id: FolderId,
    ) -> Result<StructuralChange<RegistryKey>, TreeError> {
        let index = self.folder_position(id)?;
        let folder = self.folders.remove(index);
        debug!("Removed {id} with {} entries", folder.entries.len());
        Ok(StructuralChange::removed(
            None,
            index,
            RegistryKey::Folder(id),
        ))
    }

    /// Add an entry to `folder` at `at`, clamped to `[0, len]`.
    pub fn add_entry(
        &mut self,
        folder: FolderId,
        name: impl Into<String>,
        icon: impl Into<String>,
        at: isize,
    ) -> Result<(EntryId, StructuralChange<RegistryKey>), TreeError> {
        let fi = self.folder_position(folder)?;
        let id = EntryId(self.allocate_id());
        let entries = &mut self.folders[fi].entries;
        let index = clamp_index(at, entries.len());
        entries.insert(
            index,
            ComponentEntry {
                id,
                name: name.into(),
                icon: icon.into(),
            },
        );
        debug!("Added {id} to {folder} at {index}");
        Ok((
            id,
            StructuralChange::inserted(
                Some(RegistryKey::Folder(folder)),
                index,
                RegistryKey::Entry(id),
            ),
        ))
    }

    /// Remove an entry from its folder. `NotFound` for unknown or removed ids.
    pub fn remove_entry(
        &mut self,
        id: EntryId,
    ) -> Result<StructuralChange<RegistryKey>, TreeError> {
        let (fi, ei) = self
            .locate(id)
            .ok_or_else(|| TreeError::NotFound(format!("{id} does not exist")))?;
        let folder = &mut self.folders[fi];
        folder.entries.remove(ei);
        debug!("Removed {id} from {}", folder.id);
        Ok(StructuralChange::removed(
            Some(RegistryKey::Folder(folder.id)),
            ei,
            RegistryKey::Entry(id),
        ))
    }
}

impl TreeSource for ComponentRegistry {
    type Key = RegistryKey;

    fn roots(&self) -> Vec<RegistryKey> {
        self.folders
            .iter()
            .map(|f| RegistryKey::Folder(f.id))
            .collect()
    }

    fn children(&self, key: RegistryKey) -> Vec<RegistryKey> {
        match key {
            RegistryKey::Folder(id) => self
                .folder(id)
                .map(|f| f.entries.iter().map(|e| RegistryKey::Entry(e.id)).collect())
                .unwrap_or_default(),
            RegistryKey::Entry(_) => Vec::new(),
        }
    }

    fn label(&self, key: RegistryKey) -> Option<&str> {
        match key {
            RegistryKey::Folder(id) => self.folder(id).map(|f| f.name.as_str()),
            RegistryKey::Entry(id) => self.entry(id).map(|e| e.name.as_str()),
        }
    }

    fn icon(&self, key: RegistryKey) -> Option<&str> {
        match key {
            RegistryKey::Folder(id) => self.folder(id).map(|_| FOLDER_ICON),
            RegistryKey::Entry(id) => self.entry(id).map(|e| e.icon.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::description::Workspace;

    fn demo() -> ComponentRegistry {
        ComponentRegistry::build(&Workspace::demo().folders)
    }

    #[test]
    fn test_build_preserves_order() {
        let r = demo();
        assert_eq!(r.folders().len(), 2);
        let names: Vec<&str> = r.folders()[1]
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Another test comp 1", "Another test comp 2", "Another test comp 3"]
        );
        assert_eq!(r.entry_count(), 6);
    }

    #[test]
    fn test_ids_are_unique_across_folders() {
        let r = demo();
        let mut ids: Vec<EntryId> = r
            .folders()
            .iter()
            .flat_map(|f| f.entries().iter().map(|e| e.id))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn test_duplicate_names_are_reported_not_resolved() {
        let mut r = demo();
        let folder = r.folders()[1].id;
        let (dup, _) = r.add_entry(folder, "Test comp 1", "x", 0).unwrap();
        let matches = r.entries_named("Test comp 1");
        assert_eq!(matches.len(), 2);
        assert!(matches.contains(&dup));
        assert_eq!(r.folder_of(dup), Some(folder));
    }

    #[test]
    fn test_add_entry_clamps_index() {
        let mut r = demo();
        let folder = r.folders()[0].id;
        let (id, change) = r.add_entry(folder, "Late", "x", 42).unwrap();
        assert_eq!(
            change,
            StructuralChange::inserted(Some(RegistryKey::Folder(folder)), 3, RegistryKey::Entry(id))
        );
        let (id, change) = r.add_entry(folder, "Early", "x", -1).unwrap();
        assert_eq!(
            change,
            StructuralChange::inserted(Some(RegistryKey::Folder(folder)), 0, RegistryKey::Entry(id))
        );
        assert_eq!(r.index_in_folder(id), Some(0));
    }

    #[test]
    fn test_remove_entry_twice_fails() {
        let mut r = demo();
        let id = r.folders()[0].entries()[1].id;
        let folder = r.folders()[0].id;
        let change = r.remove_entry(id).unwrap();
        assert_eq!(
            change,
            StructuralChange::removed(Some(RegistryKey::Folder(folder)), 1, RegistryKey::Entry(id))
        );
        assert!(matches!(r.remove_entry(id), Err(TreeError::NotFound(_))));
        assert!(r.entry(id).is_none());
    }

    #[test]
    fn test_add_to_unknown_folder_fails() {
        let mut r = demo();
        let id = r.folders()[0].id;
        r.remove_folder(id).unwrap();
        assert!(matches!(
            r.add_entry(id, "x", "x", 0),
            Err(TreeError::NotFound(_))
        ));
        assert!(matches!(r.remove_folder(id), Err(TreeError::NotFound(_))));
    }

    #[test]
    fn test_tree_source_is_two_levels() {
        let r = demo();
        let flat = r.flatten();
        assert_eq!(flat.len(), 8);
        assert_eq!(flat.iter().filter(|(d, _)| *d == 0).count(), 2);
        assert!(flat.iter().all(|(d, _)| *d <= 1));
        assert_eq!(r.icon(flat[0].1), Some(FOLDER_ICON));
        assert_eq!(r.label(flat[1].1), Some("Test comp 1"));
    }
}
