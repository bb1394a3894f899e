//! # Instantiation Hierarchy
//!
//! A project's component instances form a finite rooted tree. Nodes live in
//! an arena and are addressed by [`NodeId`], a slot index paired with a
//! generation. Freeing a slot bumps its generation, so an id that outlived
//! its node is reported as `NotFound` instead of aliasing whatever reused
//! the slot.
//!
//! ```text
//! Hierarchy
//! ├── slots: Vec<Slot>        // generation + Option<HierarchyNode>
//! ├── free: Vec<u32>          // reusable slot indices
//! └── root: NodeId            // never detached, never freed
//!
//! HierarchyNode
//! ├── name, icon
//! ├── children: Vec<NodeId>   // display order
//! └── parent: Option<NodeId>  // None for the root and for detached subtrees
//! ```
//!
//! Every mutation returns the [`StructuralChange`] a projection needs to
//! patch itself.

use std::fmt;

use log::debug;

use crate::core::description::{HierarchyDescription, NodeTable, TaggedNode};
use crate::core::tree::{StructuralChange, TreeError, TreeSource, clamp_index};

/// Stable handle to a node in a [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub name: String,
    pub icon: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl HierarchyNode {
    fn new(name: String, icon: String) -> Self {
        Self {
            name,
            icon,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<HierarchyNode>,
}

/// One step of a depth-first walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub id: NodeId,
    /// Distance from the node the walk started at.
    pub depth: usize,
    pub node: &'a HierarchyNode,
}

/// Lazy pre-order walk over a subtree. See [`Hierarchy::iter_depth_first`].
pub struct DepthFirst<'a> {
    hierarchy: &'a Hierarchy,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, depth) = self.stack.pop()?;
            let Some(node) = self.hierarchy.get(id) else {
                continue;
            };
            self.stack
                .extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
            return Some(Visit { id, depth, node });
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hierarchy {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Hierarchy {
    /// Build a hierarchy from a nested description.
    pub fn build(description: &HierarchyDescription) -> Self {
        let mut hierarchy = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        hierarchy.root = hierarchy.alloc_subtree(description);
        debug!(
            "Built hierarchy '{}' with {} nodes",
            description.name,
            hierarchy.len()
        );
        hierarchy
    }

    /// Validate an id-referencing node table and build from it.
    pub fn from_table(table: &NodeTable) -> Result<Self, TreeError> {
        Ok(Self::build(&table.validate()?))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut HierarchyNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn node(&self, id: NodeId) -> Result<&HierarchyNode, TreeError> {
        self.get(id)
            .ok_or_else(|| TreeError::NotFound(format!("{id} does not exist")))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root)
    }

    /// Live nodes in the arena, detached subtrees included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `id` followed by its parent, grandparent, and so on.
    fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).map(|_| id), move |&current| {
            self.get(current).and_then(|n| n.parent)
        })
    }

    /// Names from the root down to `id`. Empty for unknown ids.
    pub fn path_of(&self, id: NodeId) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter_map(|a| self.get(a).map(|n| n.name.as_str()))
            .collect();
        names.reverse();
        names
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.get(id)?.parent?;
        self.get(parent)?.children.iter().position(|&c| c == id)
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    fn alloc(&mut self, node: HierarchyNode) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Allocate a whole description as a detached subtree, returning its top.
    fn alloc_subtree(&mut self, description: &HierarchyDescription) -> NodeId {
        let top = self.alloc(HierarchyNode::new(
            description.name.clone(),
            description.icon.clone(),
        ));
        let mut pending = vec![(top, description)];
        while let Some((id, desc)) = pending.pop() {
            for child in &desc.children {
                let child_id =
                    self.alloc(HierarchyNode::new(child.name.clone(), child.icon.clone()));
                if let Some(c) = self.get_mut(child_id) {
                    c.parent = Some(id);
                }
                if let Some(p) = self.get_mut(id) {
                    p.children.push(child_id);
                }
                pending.push((child_id, child));
            }
        }
        top
    }

    /// Create a single detached node, ready for [`insert_child`](Self::insert_child).
    pub fn create_detached(&mut self, name: impl Into<String>, icon: impl Into<String>) -> NodeId {
        self.alloc(HierarchyNode::new(name.into(), icon.into()))
    }

    /// Allocate a description as a detached subtree.
    pub fn create_subtree(&mut self, description: &HierarchyDescription) -> NodeId {
        self.alloc_subtree(description)
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Check that `node` may become a child of `parent`.
    pub fn validate_attach(&self, parent: NodeId, node: NodeId) -> Result<(), TreeError> {
        self.node(parent)?;
        let candidate = self.node(node)?;
        if node == self.root {
            return Err(TreeError::InvalidInsert(format!(
                "{node} is the root and cannot become a child"
            )));
        }
        if let Some(current) = candidate.parent {
            return Err(TreeError::InvalidInsert(format!(
                "{node} is already a child of {current}"
            )));
        }
        if self.ancestors(parent).any(|a| a == node) {
            return Err(TreeError::InvalidInsert(format!(
                "{node} would become its own ancestor under {parent}"
            )));
        }
        Ok(())
    }

    /// Attach the detached node `node` under `parent` at `at`.
    ///
    /// `at` is clamped to `[0, len(children)]`: negative prepends, past the
    /// end appends.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        node: NodeId,
        at: isize,
    ) -> Result<StructuralChange<NodeId>, TreeError> {
        self.validate_attach(parent, node)?;
        let index = {
            let p = self.get_mut(parent).ok_or_else(|| {
                TreeError::NotFound(format!("{parent} does not exist"))
            })?;
            let index = clamp_index(at, p.children.len());
            p.children.insert(index, node);
            index
        };
        if let Some(n) = self.get_mut(node) {
            n.parent = Some(parent);
        }
        debug!("Inserted {node} under {parent} at {index}");
        Ok(StructuralChange::inserted(Some(parent), index, node))
    }

    /// Allocate `description` and attach it under `parent` at `at`.
    pub fn insert_description(
        &mut self,
        parent: NodeId,
        description: &HierarchyDescription,
        at: isize,
    ) -> Result<(NodeId, StructuralChange<NodeId>), TreeError> {
        self.node(parent)?;
        let node = self.alloc_subtree(description);
        let change = self.insert_child(parent, node, at)?;
        Ok((node, change))
    }

    /// Detach `node` and its subtree from its parent.
    ///
    /// The subtree stays in the arena, detached, so it can be re-inserted or
    /// [`discard`](Self::discard)ed. Fails with `NotFound` when the node has
    /// no parent: the root, or a node that is already detached.
    pub fn remove_node(&mut self, node: NodeId) -> Result<StructuralChange<NodeId>, TreeError> {
        let parent = self
            .node(node)?
            .parent
            .ok_or_else(|| TreeError::NotFound(format!("{node} has no parent")))?;
        let p = self
            .get_mut(parent)
            .ok_or_else(|| TreeError::NotFound(format!("parent {parent} of {node} is gone")))?;
        let index = p
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or_else(|| TreeError::NotFound(format!("{node} is not listed under {parent}")))?;
        p.children.remove(index);
        if let Some(n) = self.get_mut(node) {
            n.parent = None;
        }
        debug!("Removed {node} from {parent} at {index}");
        Ok(StructuralChange::removed(Some(parent), index, node))
    }

    /// Reparent `node` under `new_parent` at `at`.
    ///
    /// Returns the removal and insertion notifications, in that order.
    pub fn move_node(
        &mut self,
        node: NodeId,
        new_parent: NodeId,
        at: isize,
    ) -> Result<[StructuralChange<NodeId>; 2], TreeError> {
        self.validate_move(node, new_parent)?;
        let removed = self.remove_node(node)?;
        let inserted = self.insert_child(new_parent, node, at)?;
        Ok([removed, inserted])
    }

    /// Move `node` to position `at` among its current siblings.
    pub fn move_within(
        &mut self,
        node: NodeId,
        at: isize,
    ) -> Result<StructuralChange<NodeId>, TreeError> {
        let parent = self
            .node(node)?
            .parent
            .ok_or_else(|| TreeError::NotFound(format!("{node} has no parent")))?;
        let p = self
            .get_mut(parent)
            .ok_or_else(|| TreeError::NotFound(format!("parent {parent} of {node} is gone")))?;
        let from = p
            .children
            .iter()
            .position(|&c| c == node)
            .ok_or_else(|| TreeError::NotFound(format!("{node} is not listed under {parent}")))?;
        p.children.remove(from);
        let to = clamp_index(at, p.children.len());
        p.children.insert(to, node);
        debug!("Moved {node} from {from} to {to} under {parent}");
        Ok(StructuralChange::reordered(Some(parent)))
    }

    /// Check a move up front so a failing move leaves the tree untouched.
    pub fn validate_move(&self, node: NodeId, new_parent: NodeId) -> Result<(), TreeError> {
        self.node(new_parent)?;
        if self.node(node)?.parent.is_none() {
            return Err(TreeError::NotFound(format!("{node} has no parent")));
        }
        if self.ancestors(new_parent).any(|a| a == node) {
            return Err(TreeError::InvalidInsert(format!(
                "{node} would become its own ancestor under {new_parent}"
            )));
        }
        Ok(())
    }

    /// Free a detached subtree. Returns the number of freed nodes.
    pub fn discard(&mut self, node: NodeId) -> Result<usize, TreeError> {
        if node == self.root {
            return Err(TreeError::InvalidInsert("the root cannot be discarded".into()));
        }
        if let Some(parent) = self.node(node)?.parent {
            return Err(TreeError::InvalidInsert(format!(
                "{node} is still attached under {parent}"
            )));
        }
        let doomed: Vec<NodeId> = self.iter_depth_first(node).map(|v| v.id).collect();
        for id in &doomed {
            let slot = &mut self.slots[id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
        debug!("Discarded {} nodes under {node}", doomed.len());
        Ok(doomed.len())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Pre-order walk starting at `start`: a node before its children,
    /// children in stored order. Each call starts fresh.
    pub fn iter_depth_first(&self, start: NodeId) -> DepthFirst<'_> {
        let stack = if self.contains(start) {
            vec![(start, 0)]
        } else {
            Vec::new()
        };
        DepthFirst {
            hierarchy: self,
            stack,
        }
    }

    /// Depth-tagged pre-order flattening of the subtree at `start`.
    pub fn flatten_tagged(&self, start: NodeId) -> Vec<TaggedNode> {
        self.iter_depth_first(start)
            .map(|v| TaggedNode {
                depth: v.depth,
                name: v.node.name.clone(),
                icon: v.node.icon.clone(),
            })
            .collect()
    }

    /// Nested description of the subtree at `start`.
    pub fn to_description(&self, start: NodeId) -> Result<HierarchyDescription, TreeError> {
        self.node(start)?;
        HierarchyDescription::from_tagged(&self.flatten_tagged(start))
    }
}

impl TreeSource for Hierarchy {
    type Key = NodeId;

    fn roots(&self) -> Vec<NodeId> {
        vec![self.root]
    }

    fn children(&self, key: NodeId) -> Vec<NodeId> {
        self.get(key).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn label(&self, key: NodeId) -> Option<&str> {
        self.get(key).map(|n| n.name.as_str())
    }

    fn icon(&self, key: NodeId) -> Option<&str> {
        self.get(key).map(|n| n.icon.as_str())
    }
}
