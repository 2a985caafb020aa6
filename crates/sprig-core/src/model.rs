//! Core tree data model.
//!
//! The tree lives in a `StableDiGraph` arena: nodes carry the payload, edges
//! go parent → child. Edge order in petgraph is not insertion order, so the
//! semantically significant sibling order is kept separately in `child_order`.
//! A parent whose last child leaves has its entry removed: "no children" and
//! "empty children" are the same state.
//!
//! Public APIs speak `NodeId` (stable, never reused). `NodeIndex` slots are
//! recycled by the arena after removal and stay internal.

use crate::error::{EditError, EditResult};
use crate::id::NodeId;
use crate::outline::NodeSpec;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Ordered child list. Most nodes in a hand-built tree have a few children.
type Children = SmallVec<[NodeIndex; 4]>;

/// A single element of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: NodeId,
    /// Display label. Never empty, never surrounded by whitespace.
    pub name: String,
}

impl TreeNode {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Trim a user-supplied name, rejecting blank input.
pub fn normalize_name(raw: &str) -> EditResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EditError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// The editable tree. Exactly one root, which is never moved or deleted.
#[derive(Debug, Clone)]
pub struct Tree {
    graph: StableDiGraph<TreeNode, ()>,
    root: NodeIndex,
    /// Index from NodeId → NodeIndex for fast lookup.
    id_index: HashMap<NodeId, NodeIndex>,
    /// Sibling order per parent. Absent key = leaf.
    child_order: HashMap<NodeIndex, Children>,
}

impl Default for Tree {
    /// A lone root named "Root".
    fn default() -> Self {
        Self::with_root("Root".to_string())
    }
}

impl Tree {
    /// Create a tree holding only a root with the given name.
    pub fn new(root_name: &str) -> EditResult<Self> {
        Ok(Self::with_root(normalize_name(root_name)?))
    }

    fn with_root(name: String) -> Self {
        let mut graph = StableDiGraph::new();
        let id = NodeId::fresh();
        let root = graph.add_node(TreeNode::new(id, name));

        let mut id_index = HashMap::new();
        id_index.insert(id, root);

        Self {
            graph,
            root,
            id_index,
            child_order: HashMap::new(),
        }
    }

    /// Build a tree from a nested outline. Every name must be non-blank.
    pub fn from_spec(spec: &NodeSpec) -> EditResult<Self> {
        let mut tree = Self::new(&spec.name)?;
        let root = tree.root();
        let mut pending: Vec<(NodeId, &NodeSpec)> = spec
            .children
            .iter()
            .rev()
            .map(|child| (root, child))
            .collect();
        // Depth-first so fresh IDs come out in pre-order.
        while let Some((parent, child)) = pending.pop() {
            let id = tree.insert_child(parent, &child.name)?;
            pending.extend(child.children.iter().rev().map(|c| (id, c)));
        }
        Ok(tree)
    }

    /// Snapshot the structure as a nested outline (names only).
    pub fn to_spec(&self) -> NodeSpec {
        self.spec_at(self.root)
    }

    fn spec_at(&self, start: NodeIndex) -> NodeSpec {
        // Pre-order slots with their parent's slot, then fold leaves upward.
        let mut order: Vec<(NodeIndex, usize)> = Vec::new();
        let mut stack = vec![(start, 0)];
        while let Some((idx, parent)) = stack.pop() {
            let slot = order.len();
            order.push((idx, parent));
            stack.extend(self.child_slice(idx).iter().rev().map(|&c| (c, slot)));
        }

        let mut specs: Vec<NodeSpec> = order
            .iter()
            .map(|&(idx, _)| NodeSpec::leaf(self.graph[idx].name.clone()))
            .collect();
        // Descending slots: every descendant is folded in before its parent
        // is, and children arrive last-first.
        for slot in (1..order.len()).rev() {
            let Some(mut spec) = specs.pop() else { break };
            spec.children.reverse();
            specs[order[slot].1].children.push(spec);
        }
        let mut root = specs.swap_remove(0);
        root.children.reverse();
        root
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn root(&self) -> NodeId {
        self.graph[self.root].id
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.id_index.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    fn require(&self, id: NodeId) -> EditResult<NodeIndex> {
        self.index_of(id).ok_or(EditError::UnknownNode(id))
    }

    fn parent_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    fn child_slice(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map_or(&[], |c| c.as_slice())
    }

    /// Parent of `id`; `None` for the root, unknown IDs, and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.index_of(id)
            .and_then(|idx| self.parent_index(idx))
            .map(|p| self.graph[p].id)
    }

    /// Children of `id` in sibling order. Empty for leaves and unknown IDs.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .map(|idx| {
                self.child_slice(idx)
                    .iter()
                    .map(|&c| self.graph[c].id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.index_of(id)
            .is_some_and(|idx| self.child_order.contains_key(&idx))
    }

    /// Position of `id` among its siblings.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let idx = self.index_of(id)?;
        let parent = self.parent_index(idx)?;
        self.child_slice(parent).iter().position(|&c| c == idx)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    /// A node is not its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let (Some(anc), Some(mut current)) = (self.index_of(ancestor), self.index_of(descendant))
        else {
            return false;
        };
        while let Some(parent) = self.parent_index(current) {
            if parent == anc {
                return true;
            }
            current = parent;
        }
        false
    }

    /// The subtree rooted at `id` in pre-order, including `id` itself.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let Some(start) = self.index_of(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            out.push(self.graph[idx].id);
            stack.extend(self.child_slice(idx).iter().rev().copied());
        }
        out
    }

    /// Every node reachable from the root, in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.subtree(self.root())
            .into_iter()
            .filter_map(move |id| self.get(id))
    }

    /// First node in pre-order whose name equals `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Depth of `id` (root = 0).
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        let mut idx = self.index_of(id)?;
        let mut depth = 0;
        while let Some(parent) = self.parent_index(idx) {
            depth += 1;
            idx = parent;
        }
        Some(depth)
    }

    // ─── Primitive mutations ─────────────────────────────────────────────

    /// Remove `id` from its parent's children, leaving it parentless.
    ///
    /// Silently does nothing (returns `false`) when the node is unknown, has
    /// no parent, or is missing from the parent's list. A detached node must
    /// be re-attached before the tree is consistent again; prefer
    /// [`Tree::reparent`].
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let Some(parent) = self.parent_index(idx) else {
            return false;
        };
        let Some(siblings) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(pos) = siblings.iter().position(|&c| c == idx) else {
            return false;
        };
        siblings.remove(pos);
        if siblings.is_empty() {
            self.child_order.remove(&parent);
        }
        if let Some(edge) = self.graph.find_edge(parent, idx) {
            self.graph.remove_edge(edge);
        }
        true
    }

    /// Append a parentless `id` as the last child of `new_parent`.
    pub fn attach(&mut self, id: NodeId, new_parent: NodeId) -> EditResult<()> {
        let idx = self.require(id)?;
        let parent = self.require(new_parent)?;
        if idx == self.root {
            return Err(EditError::RootImmutable);
        }
        if self.parent_index(idx).is_some() {
            return Err(EditError::AlreadyAttached(id));
        }
        if idx == parent || self.is_ancestor_of(id, new_parent) {
            return Err(EditError::WouldCycle {
                node: id,
                target: new_parent,
            });
        }
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        Ok(())
    }

    /// Move `id` (with its subtree) to the end of `new_parent`'s children.
    ///
    /// Atomic: on error the tree is unchanged.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> EditResult<()> {
        let idx = self.require(id)?;
        self.require(new_parent)?;
        if idx == self.root {
            return Err(EditError::RootImmutable);
        }
        if id == new_parent || self.is_ancestor_of(id, new_parent) {
            return Err(EditError::WouldCycle {
                node: id,
                target: new_parent,
            });
        }
        self.detach(id);
        self.attach(id, new_parent)?;
        log::debug!("reparent {id} -> {new_parent}");
        Ok(())
    }

    /// Move `id` to `target_index` within its current sibling list.
    ///
    /// The index is clamped to the list. Returns `true` if the order changed;
    /// moving a node to its own index is a no-op.
    pub fn reorder_among(&mut self, id: NodeId, target_index: usize) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        let Some(parent) = self.parent_index(idx) else {
            return false;
        };
        let Some(siblings) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(current) = siblings.iter().position(|&c| c == idx) else {
            return false;
        };
        let target = target_index.min(siblings.len() - 1);
        if target == current {
            return false;
        }
        let moved = siblings.remove(current);
        siblings.insert(target, moved);
        log::debug!("reorder {id}: {current} -> {target}");
        true
    }

    /// Append a new node named `name` (trimmed) as the last child of `parent`.
    pub fn insert_child(&mut self, parent: NodeId, name: &str) -> EditResult<NodeId> {
        let parent_idx = self.require(parent)?;
        let name = normalize_name(name)?;
        let id = NodeId::fresh();
        let idx = self.graph.add_node(TreeNode::new(id, name));
        self.graph.add_edge(parent_idx, idx, ());
        self.child_order.entry(parent_idx).or_default().push(idx);
        self.id_index.insert(id, idx);
        Ok(id)
    }

    /// Replace the name of `id` with `name` (trimmed).
    pub fn rename(&mut self, id: NodeId, name: &str) -> EditResult<()> {
        let idx = self.require(id)?;
        let name = normalize_name(name)?;
        self.graph[idx].name = name;
        Ok(())
    }

    /// Delete `id` and its whole subtree. The root cannot be deleted.
    ///
    /// Returns the removed IDs in pre-order. A parent left without children
    /// reverts to a leaf.
    pub fn delete_node(&mut self, id: NodeId) -> EditResult<Vec<NodeId>> {
        let idx = self.require(id)?;
        if idx == self.root {
            return Err(EditError::RootImmutable);
        }
        let removed = self.subtree(id);
        self.detach(id);
        for gone in &removed {
            if let Some(gone_idx) = self.id_index.remove(gone) {
                self.child_order.remove(&gone_idx);
                self.graph.remove_node(gone_idx);
            }
        }
        log::debug!("delete {id} ({} nodes)", removed.len());
        Ok(removed)
    }

    // ─── Consistency ─────────────────────────────────────────────────────

    /// Check the structural invariants: one root, every other node owned by
    /// exactly one parent, child lists mirror the edges, no empty child list,
    /// everything reachable from the root.
    pub fn verify(&self) -> Result<(), String> {
        if self.parent_index(self.root).is_some() {
            return Err("root has a parent".into());
        }
        for idx in self.graph.node_indices() {
            let parents = self
                .graph
                .neighbors_directed(idx, Direction::Incoming)
                .count();
            if idx != self.root && parents != 1 {
                let id = self.graph[idx].id;
                return Err(format!("{id} has {parents} parents"));
            }
            let edges = self
                .graph
                .neighbors_directed(idx, Direction::Outgoing)
                .count();
            let listed = self.child_slice(idx);
            if listed.len() != edges {
                let id = self.graph[idx].id;
                return Err(format!(
                    "{id}: {} listed children, {edges} edges",
                    listed.len()
                ));
            }
            if listed
                .iter()
                .any(|&c| self.graph.find_edge(idx, c).is_none())
            {
                let id = self.graph[idx].id;
                return Err(format!("{id}: child list disagrees with edges"));
            }
        }
        if self.child_order.values().any(|c| c.is_empty()) {
            return Err("empty child list retained".into());
        }
        let reachable = self.subtree(self.root()).len();
        if reachable != self.graph.node_count() {
            return Err(format!(
                "{} nodes, {reachable} reachable from root",
                self.graph.node_count()
            ));
        }
        Ok(())
    }
}
