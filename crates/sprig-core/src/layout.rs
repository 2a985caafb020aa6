//! Tidy-tree layout solver.
//!
//! Converts the `Tree` into a `PositionedTree` using Buchheim, Jünger and
//! Leipert's linear-time variant of Walker's algorithm:
//!
//! - siblings keep their child-list order, left to right;
//! - neighbours sharing a parent are one unit apart, others two;
//! - a parent sits centred over its outermost children;
//! - `y` is depth times `y_spacing`, the root sits at the origin.
//!
//! The output is a disposable projection. It is rebuilt from scratch after
//! every mutation and never patched incrementally, except for the drag
//! override applied by [`PositionedTree::set_position`].

use crate::config::TreeConfig;
use crate::id::NodeId;
use crate::model::Tree;
use std::collections::HashMap;

/// A node annotated with its layout position.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
    /// Index of the parent in [`PositionedTree::nodes`]; `None` for the root.
    pub parent: Option<usize>,
    /// Indices of the children, in sibling order.
    pub children: Vec<usize>,
}

/// A parent → child connector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub parent: NodeId,
    pub child: NodeId,
    pub from: (f64, f64),
    pub to: (f64, f64),
}

/// Axis-aligned bounds of node centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// The tree with coordinates. Nodes are stored in pre-order, root first.
#[derive(Debug, Clone)]
pub struct PositionedTree {
    nodes: Vec<PositionedNode>,
    index: HashMap<NodeId, usize>,
}

impl PositionedTree {
    pub fn root(&self) -> &PositionedNode {
        &self.nodes[0]
    }

    /// All nodes in pre-order.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionedNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn position_of(&self, id: NodeId) -> Option<(f64, f64)> {
        self.get(id).map(|n| (n.x, n.y))
    }

    pub fn parent_of(&self, id: NodeId) -> Option<&PositionedNode> {
        self.get(id)
            .and_then(|n| n.parent)
            .map(|p| &self.nodes[p])
    }

    /// The subtree rooted at `id` in pre-order, including the node itself.
    pub fn descendants(&self, id: NodeId) -> Vec<&PositionedNode> {
        let Some(start) = self.index_of(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(i) = stack.pop() {
            out.push(&self.nodes[i]);
            stack.extend(self.nodes[i].children.iter().rev().copied());
        }
        out
    }

    /// Parent → child connectors, in pre-order of the child.
    pub fn links(&self) -> impl Iterator<Item = Link> + '_ {
        self.nodes.iter().filter_map(|child| {
            let parent = &self.nodes[child.parent?];
            Some(Link {
                parent: parent.id,
                child: child.id,
                from: (parent.x, parent.y),
                to: (child.x, child.y),
            })
        })
    }

    /// Bounds of all node centres.
    pub fn extent(&self) -> Extent {
        let mut extent = Extent {
            min_x: f64::MAX,
            min_y: f64::MAX,
            max_x: f64::MIN,
            max_y: f64::MIN,
        };
        for n in &self.nodes {
            extent.min_x = extent.min_x.min(n.x);
            extent.min_y = extent.min_y.min(n.y);
            extent.max_x = extent.max_x.max(n.x);
            extent.max_y = extent.max_y.max(n.y);
        }
        extent
    }

    /// Override one node's coordinates (visual drag follow).
    /// Returns `false` for unknown IDs.
    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) -> bool {
        match self.index_of(id) {
            Some(i) => {
                self.nodes[i].x = x;
                self.nodes[i].y = y;
                true
            }
            None => false,
        }
    }
}

/// Lay out the whole tree.
pub fn resolve_layout(tree: &Tree, config: &TreeConfig) -> PositionedTree {
    let mut nodes: Vec<PositionedNode> = Vec::with_capacity(tree.len());
    let mut index = HashMap::with_capacity(tree.len());

    // Flatten in pre-order, wiring parent/child indices.
    let mut stack: Vec<(NodeId, Option<usize>, usize)> = vec![(tree.root(), None, 0)];
    while let Some((id, parent, depth)) = stack.pop() {
        let i = nodes.len();
        nodes.push(PositionedNode {
            id,
            name: tree.name(id).unwrap_or_default().to_string(),
            x: 0.0,
            y: depth as f64 * config.y_spacing,
            depth,
            parent,
            children: Vec::new(),
        });
        index.insert(id, i);
        if let Some(p) = parent {
            nodes[p].children.push(i);
        }
        for child in tree.children(id).into_iter().rev() {
            stack.push((child, Some(i), depth + 1));
        }
    }

    let units = TidyWalk::new(&nodes).run();
    for (node, x) in nodes.iter_mut().zip(units) {
        node.x = x * config.x_spacing;
    }

    log::trace!("layout: {} nodes", nodes.len());
    PositionedTree { nodes, index }
}

// ─── Buchheim walk ───────────────────────────────────────────────────────

/// Per-node scratch state of the walk. Field names follow the paper.
#[derive(Debug, Clone)]
struct WalkNode {
    parent: Option<usize>,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    /// Default ancestor used by `apportion` for this node's children.
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
}

struct TidyWalk {
    /// Indices `0..n` mirror the positioned nodes; index `n` is a virtual
    /// parent of the root so the root can be walked like any other node.
    w: Vec<WalkNode>,
}

impl TidyWalk {
    fn new(nodes: &[PositionedNode]) -> Self {
        let virtual_root = nodes.len();
        let mut w: Vec<WalkNode> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| WalkNode {
                parent: Some(n.parent.unwrap_or(virtual_root)),
                children: n.children.clone(),
                number: 0,
                default_ancestor: None,
                ancestor: i,
                prelim: 0.0,
                modifier: 0.0,
                change: 0.0,
                shift: 0.0,
                thread: None,
            })
            .collect();
        w.push(WalkNode {
            parent: None,
            children: vec![0],
            number: 0,
            default_ancestor: None,
            ancestor: virtual_root,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
        });
        for parent in 0..w.len() {
            for (number, child) in w[parent].children.clone().into_iter().enumerate() {
                w[child].number = number;
            }
        }
        Self { w }
    }

    /// Returns the x coordinate of every real node, in separation units.
    fn run(mut self) -> Vec<f64> {
        let n = self.w.len() - 1;
        if n == 0 {
            return Vec::new();
        }

        for v in self.post_order() {
            self.first_walk(v);
        }
        self.w[n].modifier = -self.w[0].prelim;

        let mut xs = vec![0.0; n];
        // Real nodes are already in pre-order.
        for v in 0..n {
            let parent_mod = self.parent_of(v).map_or(0.0, |p| self.w[p].modifier);
            xs[v] = self.w[v].prelim + parent_mod;
            self.w[v].modifier += parent_mod;
        }
        xs
    }

    fn post_order(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.w.len() - 1);
        let mut stack = vec![(0usize, false)];
        while let Some((v, expanded)) = stack.pop() {
            if expanded {
                out.push(v);
            } else {
                stack.push((v, true));
                stack.extend(self.w[v].children.iter().rev().map(|&c| (c, false)));
            }
        }
        out
    }

    fn parent_of(&self, v: usize) -> Option<usize> {
        self.w[v].parent
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.w[a].parent == self.w[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.w[v].children.first().copied().or(self.w[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.w[v].children.last().copied().or(self.w[v].thread)
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let number = self.w[v].number;
        if number == 0 {
            return None;
        }
        self.parent_of(v).map(|p| self.w[p].children[number - 1])
    }

    fn first_walk(&mut self, v: usize) {
        let Some(parent) = self.parent_of(v) else {
            return;
        };
        let left = self.left_sibling(v);

        if let (Some(&first), Some(&last)) =
            (self.w[v].children.first(), self.w[v].children.last())
        {
            self.execute_shifts(v);
            let midpoint = (self.w[first].prelim + self.w[last].prelim) / 2.0;
            match left {
                Some(l) => {
                    self.w[v].prelim = self.w[l].prelim + self.separation(v, l);
                    self.w[v].modifier = self.w[v].prelim - midpoint;
                }
                None => self.w[v].prelim = midpoint,
            }
        } else if let Some(l) = left {
            self.w[v].prelim = self.w[l].prelim + self.separation(v, l);
        }

        let first_sibling = self.w[parent].children[0];
        let ancestor = self.w[parent].default_ancestor.unwrap_or(first_sibling);
        let ancestor = self.apportion(v, left, ancestor);
        self.w[parent].default_ancestor = Some(ancestor);
    }

    /// Push the subtree of `v` right until it clears the subtrees to its
    /// left, threading contours as it goes.
    fn apportion(&mut self, v: usize, left: Option<usize>, mut ancestor: usize) -> usize {
        let Some(left) = left else {
            return ancestor;
        };
        let Some(parent) = self.parent_of(v) else {
            return ancestor;
        };

        // i = inside, o = outside; p = right subtree (v), m = left subforest.
        let mut vip = Some(v);
        let mut vop = v;
        let mut vim = Some(left);
        let mut vom = self.w[parent].children[0];
        let mut sip = self.w[v].modifier;
        let mut sop = self.w[v].modifier;
        let mut sim = self.w[left].modifier;
        let mut som = self.w[vom].modifier;

        loop {
            vim = vim.and_then(|n| self.next_right(n));
            vip = vip.and_then(|n| self.next_left(n));
            let (Some(im), Some(ip)) = (vim, vip) else {
                break;
            };
            let (Some(om), Some(op)) = (self.next_left(vom), self.next_right(vop)) else {
                break;
            };
            vom = om;
            vop = op;
            self.w[vop].ancestor = v;

            let shift =
                self.w[im].prelim + sim - self.w[ip].prelim - sip + self.separation(im, ip);
            if shift > 0.0 {
                let a = self.next_ancestor(im, v, ancestor);
                self.move_subtree(a, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.w[im].modifier;
            sip += self.w[ip].modifier;
            som += self.w[vom].modifier;
            sop += self.w[vop].modifier;
        }

        if let Some(im) = vim
            && self.next_right(vop).is_none()
        {
            self.w[vop].thread = Some(im);
            self.w[vop].modifier += sim - sop;
        }
        if let Some(ip) = vip
            && self.next_left(vom).is_none()
        {
            self.w[vom].thread = Some(ip);
            self.w[vom].modifier += sip - som;
            ancestor = v;
        }
        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let a = self.w[vim].ancestor;
        if self.parent_of(a) == self.parent_of(v) {
            a
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = (self.w[wp].number - self.w[wm].number) as f64;
        let change = shift / subtrees;
        self.w[wp].change -= change;
        self.w[wp].shift += shift;
        self.w[wm].change += change;
        self.w[wp].prelim += shift;
        self.w[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        for c in self.w[v].children.clone().into_iter().rev() {
            self.w[c].prelim += shift;
            self.w[c].modifier += shift;
            change += self.w[c].change;
            shift += self.w[c].shift + change;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{NodeSpec, demo_outline};

    fn layout(spec: &NodeSpec) -> (Tree, PositionedTree) {
        let tree = Tree::from_spec(spec).unwrap();
        let positioned = resolve_layout(&tree, &TreeConfig::default());
        (tree, positioned)
    }

    fn x_of(tree: &Tree, p: &PositionedTree, name: &str) -> f64 {
        p.position_of(tree.find_by_name(name).unwrap()).unwrap().0
    }

    #[test]
    fn single_root_sits_at_origin() {
        let (_, p) = layout(&NodeSpec::leaf("A"));
        assert_eq!(p.len(), 1);
        assert_eq!((p.root().x, p.root().y), (0.0, 0.0));
    }

    #[test]
    fn siblings_one_unit_apart_and_parent_centred() {
        let (tree, p) = layout(&NodeSpec::new(
            "A",
            vec![NodeSpec::leaf("B"), NodeSpec::leaf("C"), NodeSpec::leaf("D")],
        ));
        assert_eq!(x_of(&tree, &p, "B"), -144.0);
        assert_eq!(x_of(&tree, &p, "C"), 0.0);
        assert_eq!(x_of(&tree, &p, "D"), 144.0);
        assert_eq!(x_of(&tree, &p, "A"), 0.0);
        let b = p.get(tree.find_by_name("B").unwrap()).unwrap();
        assert_eq!(b.y, 90.0);
        assert_eq!(b.depth, 1);
    }

    #[test]
    fn cousins_are_two_units_apart() {
        let (tree, p) = layout(&NodeSpec::new(
            "A",
            vec![
                NodeSpec::new("B", vec![NodeSpec::leaf("B1")]),
                NodeSpec::new("C", vec![NodeSpec::leaf("C1")]),
            ],
        ));
        let gap = x_of(&tree, &p, "C1") - x_of(&tree, &p, "B1");
        assert_eq!(gap, 2.0 * 144.0);
        // B and C are siblings but must spread to keep their children apart.
        assert_eq!(x_of(&tree, &p, "C") - x_of(&tree, &p, "B"), 2.0 * 144.0);
    }

    #[test]
    fn no_two_nodes_overlap_on_a_level() {
        let (_, p) = layout(&demo_outline());
        let mut by_depth: HashMap<usize, Vec<f64>> = HashMap::new();
        for n in p.nodes() {
            by_depth.entry(n.depth).or_default().push(n.x);
        }
        for xs in by_depth.values_mut() {
            xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for pair in xs.windows(2) {
                assert!(
                    pair[1] - pair[0] >= 144.0 - 1e-9,
                    "nodes too close: {pair:?}"
                );
            }
        }
    }

    #[test]
    fn sibling_order_is_left_to_right() {
        let (tree, p) = layout(&demo_outline());
        for node in tree.iter() {
            let xs: Vec<f64> = tree
                .children(node.id)
                .into_iter()
                .map(|c| p.position_of(c).unwrap().0)
                .collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "{}: {xs:?}", node.name);
        }
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = Tree::from_spec(&demo_outline()).unwrap();
        let a = resolve_layout(&tree, &TreeConfig::default());
        let b = resolve_layout(&tree, &TreeConfig::default());
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn descendants_and_links() {
        let (tree, p) = layout(&NodeSpec::new(
            "A",
            vec![NodeSpec::new("B", vec![NodeSpec::leaf("B1")]), NodeSpec::leaf("C")],
        ));
        let b = tree.find_by_name("B").unwrap();
        let names: Vec<&str> = p.descendants(b).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["B", "B1"]);
        assert_eq!(p.links().count(), 3);
        assert_eq!(p.parent_of(b).unwrap().name, "A");
    }

    #[test]
    fn set_position_overrides_one_node() {
        let (tree, mut p) = layout(&NodeSpec::new("A", vec![NodeSpec::leaf("B")]));
        let b = tree.find_by_name("B").unwrap();
        assert!(p.set_position(b, 300.0, 400.0));
        assert_eq!(p.position_of(b), Some((300.0, 400.0)));
        let link = p.links().next().unwrap();
        assert_eq!(link.to, (300.0, 400.0));
    }

    #[test]
    fn extent_spans_all_centres() {
        let (_, p) = layout(&NodeSpec::new(
            "A",
            vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
        ));
        let e = p.extent();
        assert_eq!((e.min_x, e.max_x), (-72.0, 72.0));
        assert_eq!((e.min_y, e.max_y), (0.0, 90.0));
        assert_eq!(e.center(), (0.0, 45.0));
    }
}
