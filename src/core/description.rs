//! # Descriptions
//!
//! Caller-supplied shapes that models are built from.
//!
//! Two forms exist for the hierarchy:
//!
//! - [`HierarchyDescription`]: nested values. Built bottom-up it cannot
//!   contain a cycle, so building from it never fails.
//! - [`NodeTable`]: a flat table where nodes reference their children by id.
//!   This is what external workspace files contain, and it is validated into
//!   a `HierarchyDescription` before anything is built from it.
//!
//! ```toml
//! [[folders]]
//! name = "Gates"
//! entries = [{ name = "AND" }, { name = "OR", icon = "x-office-document" }]
//!
//! [hierarchy]
//! root = "top"
//!
//! [[hierarchy.nodes]]
//! id = "top"
//! name = "Top comp"
//! children = ["adder"]
//!
//! [[hierarchy.nodes]]
//! id = "adder"
//! name = "Adder"
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::config::ConfigError;
use crate::core::tree::TreeError;

/// Icon used when a description leaves it out.
pub const DEFAULT_ICON: &str = "x-office-document";

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

fn malformed(msg: impl Into<String>) -> TreeError {
    TreeError::MalformedDescription(msg.into())
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Nested description of an instantiation hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyDescription {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub children: Vec<HierarchyDescription>,
}

/// One node of a pre-order flattening, tagged with its depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedNode {
    pub depth: usize,
    pub name: String,
    pub icon: String,
}

impl HierarchyDescription {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        children: Vec<HierarchyDescription>,
    ) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            children,
        }
    }

    pub fn leaf(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self::new(name, icon, Vec::new())
    }

    /// Number of nodes, this one included.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Rebuild the nesting from a depth-tagged pre-order sequence.
    ///
    /// The first node must have depth 0, no other node may, and depth can
    /// grow by at most one from one node to the next.
    pub fn from_tagged(nodes: &[TaggedNode]) -> Result<Self, TreeError> {
        let mut iter = nodes.iter().enumerate();
        let (_, first) = iter
            .next()
            .ok_or_else(|| malformed("tagged sequence is empty"))?;
        if first.depth != 0 {
            return Err(malformed(format!(
                "first node '{}' has depth {}, expected 0",
                first.name, first.depth
            )));
        }

        // stack[d] is the open node at depth d
        let mut stack = vec![Self::leaf(first.name.clone(), first.icon.clone())];
        for (position, node) in iter {
            if node.depth == 0 {
                return Err(malformed(format!(
                    "second root '{}' at position {position}",
                    node.name
                )));
            }
            if node.depth > stack.len() {
                return Err(malformed(format!(
                    "depth jumps from {} to {} at position {position}",
                    stack.len() - 1,
                    node.depth
                )));
            }
            while stack.len() > node.depth {
                fold_top(&mut stack);
            }
            stack.push(Self::leaf(node.name.clone(), node.icon.clone()));
        }
        while stack.len() > 1 {
            fold_top(&mut stack);
        }
        stack
            .pop()
            .ok_or_else(|| malformed("tagged sequence produced no root"))
    }
}

/// Close the innermost open node by moving it into its parent.
fn fold_top(stack: &mut Vec<HierarchyDescription>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(done);
    }
}

/// One row of a [`NodeTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Flat, id-referencing hierarchy description as found in workspace files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTable {
    pub root: String,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
}

impl NodeTable {
    /// Check the table forms a finite rooted tree and nest it.
    ///
    /// Rejects duplicate ids, an undefined root, references to missing
    /// children, nodes with two parents, cycles, and nodes the root cannot
    /// reach.
    pub fn validate(&self) -> Result<HierarchyDescription, TreeError> {
        let n = self.nodes.len();
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (i, record) in self.nodes.iter().enumerate() {
            if record.name.trim().is_empty() {
                return Err(malformed(format!("node '{}' has an empty name", record.id)));
            }
            if index.insert(record.id.as_str(), i).is_some() {
                return Err(malformed(format!("node id '{}' is defined twice", record.id)));
            }
        }

        let root = *index
            .get(self.root.as_str())
            .ok_or_else(|| malformed(format!("root '{}' is not defined", self.root)))?;

        let mut parent: Vec<Option<usize>> = vec![None; n];
        for (i, record) in self.nodes.iter().enumerate() {
            for child_id in &record.children {
                let child = *index.get(child_id.as_str()).ok_or_else(|| {
                    malformed(format!(
                        "node '{}' references missing child '{child_id}'",
                        record.id
                    ))
                })?;
                if child == root {
                    return Err(malformed(format!(
                        "cycle: root '{}' is listed as a child of '{}'",
                        self.root, record.id
                    )));
                }
                if let Some(existing) = parent[child] {
                    return Err(malformed(format!(
                        "node '{child_id}' is a child of both '{}' and '{}'",
                        self.nodes[existing].id, record.id
                    )));
                }
                parent[child] = Some(i);
            }
        }

        // Every non-root node has at most one parent and the root has none,
        // so a walk from the root never revisits a node.
        let mut order = Vec::with_capacity(n);
        let mut reached = vec![false; n];
        let mut stack = vec![root];
        while let Some(i) = stack.pop() {
            reached[i] = true;
            order.push(i);
            stack.extend(
                self.nodes[i]
                    .children
                    .iter()
                    .rev()
                    .filter_map(|c| index.get(c.as_str()).copied()),
            );
        }
        if let Some(stray) = reached.iter().position(|r| !r) {
            return Err(malformed(self.describe_unreachable(stray, &parent)));
        }

        // Reverse pre-order visits children before their parents.
        let mut built: Vec<Option<HierarchyDescription>> = vec![None; n];
        for &i in order.iter().rev() {
            let record = &self.nodes[i];
            let children = record
                .children
                .iter()
                .filter_map(|c| index.get(c.as_str()).and_then(|&ci| built[ci].take()))
                .collect();
            built[i] = Some(HierarchyDescription::new(
                record.name.clone(),
                record.icon.clone(),
                children,
            ));
        }
        debug!("Validated node table: {} nodes under '{}'", n, self.root);
        built[root]
            .take()
            .ok_or_else(|| malformed(format!("root '{}' could not be assembled", self.root)))
    }

    fn describe_unreachable(&self, start: usize, parent: &[Option<usize>]) -> String {
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(p) = parent[current] {
            if !seen.insert(current) {
                return format!("cycle through node '{}'", self.nodes[current].id);
            }
            current = p;
        }
        format!(
            "node '{}' is not reachable from root '{}'",
            self.nodes[start].id, self.root
        )
    }
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDescription {
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

impl EntryDescription {
    pub fn new(name: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderDescription {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<EntryDescription>,
}

impl FolderDescription {
    pub fn new(name: impl Into<String>, entries: Vec<EntryDescription>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }
}

// ============================================================================
// Workspace
// ============================================================================

/// Workspace file contents as deserialized, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceDescription {
    #[serde(default)]
    pub folders: Vec<FolderDescription>,
    pub hierarchy: NodeTable,
}

/// A validated workspace, ready to build models from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub folders: Vec<FolderDescription>,
    pub hierarchy: HierarchyDescription,
}

impl WorkspaceDescription {
    pub fn validate(self) -> Result<Workspace, TreeError> {
        for (i, folder) in self.folders.iter().enumerate() {
            if folder.name.trim().is_empty() {
                return Err(malformed(format!("folder #{i} has an empty name")));
            }
            if let Some(j) = folder.entries.iter().position(|e| e.name.trim().is_empty()) {
                return Err(malformed(format!(
                    "entry #{j} in folder '{}' has an empty name",
                    folder.name
                )));
            }
        }
        let hierarchy = self.hierarchy.validate()?;
        Ok(Workspace {
            folders: self.folders,
            hierarchy,
        })
    }
}

impl Workspace {
    /// The workspace shown when no description file is configured.
    pub fn demo() -> Self {
        let doc = DEFAULT_ICON;
        let folders = vec![
            FolderDescription::new(
                "Test folder 1",
                vec![
                    EntryDescription::new("Test comp 1", doc),
                    EntryDescription::new("Test comp 2", doc),
                    EntryDescription::new("Test comp 3", doc),
                ],
            ),
            FolderDescription::new(
                "Test folder 2",
                vec![
                    EntryDescription::new("Another test comp 1", doc),
                    EntryDescription::new("Another test comp 2", doc),
                    EntryDescription::new("Another test comp 3", doc),
                ],
            ),
        ];
        let hierarchy = HierarchyDescription::new(
            "Top comp",
            doc,
            vec![
                HierarchyDescription::new(
                    "Test Comp 1",
                    doc,
                    vec![HierarchyDescription::leaf("Test Nested Comp 1", doc)],
                ),
                HierarchyDescription::new(
                    "Test Comp 2",
                    doc,
                    vec![
                        HierarchyDescription::leaf("Test Nested Comp 1", doc),
                        HierarchyDescription::leaf("Test Nested Comp 2", doc),
                    ],
                ),
                HierarchyDescription::leaf("Test Comp 3", doc),
            ],
        );
        Self { folders, hierarchy }
    }
}

/// Load and validate a workspace description file.
///
/// `.json` files are read as JSON, everything else as TOML.
pub fn load_workspace(path: &Path) -> Result<Workspace, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let description: WorkspaceDescription = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(ConfigError::Json)?,
        _ => toml::from_str(&contents).map_err(ConfigError::Parse)?,
    };
    let workspace = description.validate().map_err(ConfigError::Description)?;
    info!(
        "Loaded workspace from {} ({} folders, {} hierarchy nodes)",
        path.display(),
        workspace.folders.len(),
        workspace.hierarchy.node_count()
    );
    Ok(workspace)
}
