//! Drag gesture classifier.
//!
//! A gesture starts on a node (`pointer_down`), stays a click candidate until
//! the pointer has travelled more than the motion threshold, and is resolved
//! on release into one of:
//!
//! - `Click`: the threshold was never exceeded;
//! - `Reparent`: the release point lies within the proximity threshold of an
//!   eligible node, which becomes the new parent;
//! - `Reorder`: otherwise, the node slides among its siblings by release x;
//! - `NoOp`: nothing applies (root drop, unchanged sibling index).
//!
//! Classification never mutates. The session applies the outcome.

use kurbo::Point;
use serde::Serialize;
use sprig_core::{NodeId, PositionedTree, Tree, TreeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down on a node, still within the motion threshold.
    Pressed,
    /// Threshold exceeded; stays a drag until release.
    Dragging,
}

/// The resolved meaning of a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragOutcome {
    Click {
        node: NodeId,
    },
    Reparent {
        node: NodeId,
        old_parent: Option<NodeId>,
        new_parent: NodeId,
    },
    Reorder {
        node: NodeId,
        parent: NodeId,
        from: usize,
        to: usize,
    },
    NoOp {
        node: NodeId,
    },
}

impl DragOutcome {
    pub fn node(&self) -> NodeId {
        match *self {
            DragOutcome::Click { node }
            | DragOutcome::Reparent { node, .. }
            | DragOutcome::Reorder { node, .. }
            | DragOutcome::NoOp { node } => node,
        }
    }

    /// Whether applying this outcome changes the tree.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DragOutcome::Reparent { .. } | DragOutcome::Reorder { .. }
        )
    }
}

/// Pointer state for one gesture at a time.
#[derive(Debug, Clone, Default)]
pub struct DragGesture {
    phase: DragPhase,
    node: Option<NodeId>,
    start: Point,
    last: Point,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    /// The node under the pointer for the current gesture.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// The node being dragged, once past the motion threshold.
    pub fn dragging(&self) -> Option<NodeId> {
        match self.phase {
            DragPhase::Dragging => self.node,
            _ => None,
        }
    }

    pub fn last_position(&self) -> Point {
        self.last
    }

    /// Begin a gesture on `node`. A gesture already in flight is dropped.
    pub fn pointer_down(&mut self, node: NodeId, at: Point) {
        if self.phase != DragPhase::Idle {
            log::debug!("pointer_down during {:?}; restarting gesture", self.phase);
        }
        self.phase = DragPhase::Pressed;
        self.node = Some(node);
        self.start = at;
        self.last = at;
    }

    /// Track the pointer. Returns the dragged node and its follow position
    /// while dragging, `None` otherwise.
    pub fn pointer_move(&mut self, at: Point, config: &TreeConfig) -> Option<(NodeId, Point)> {
        let node = self.node?;
        self.last = at;
        if self.phase == DragPhase::Pressed && at.distance(self.start) > config.motion_threshold {
            log::trace!("drag start {node}");
            self.phase = DragPhase::Dragging;
        }
        match self.phase {
            DragPhase::Dragging => Some((node, at)),
            _ => None,
        }
    }

    /// Finish the gesture and classify it. `None` when no gesture was active.
    pub fn pointer_up(
        &mut self,
        at: Point,
        tree: &Tree,
        positioned: &PositionedTree,
        config: &TreeConfig,
    ) -> Option<DragOutcome> {
        let phase = std::mem::take(&mut self.phase);
        let node = self.node.take()?;
        self.last = at;
        let outcome = match phase {
            DragPhase::Idle => return None,
            DragPhase::Pressed => DragOutcome::Click { node },
            DragPhase::Dragging => classify(tree, positioned, node, at, config),
        };
        log::debug!("gesture resolved: {outcome:?}");
        Some(outcome)
    }

    /// Abort without a click or a mutation.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

/// Decide what dropping `node` at `release` means.
pub fn classify(
    tree: &Tree,
    positioned: &PositionedTree,
    node: NodeId,
    release: Point,
    config: &TreeConfig,
) -> DragOutcome {
    let parent = tree.parent(node);

    if parent.is_some()
        && let Some(new_parent) = nearest_parent(tree, positioned, node, release, config)
    {
        return DragOutcome::Reparent {
            node,
            old_parent: parent,
            new_parent,
        };
    }

    let Some(parent) = parent else {
        return DragOutcome::NoOp { node };
    };
    match sibling_slot(tree, positioned, node, parent, release.x) {
        Some((from, to)) if from != to => DragOutcome::Reorder {
            node,
            parent,
            from,
            to,
        },
        _ => DragOutcome::NoOp { node },
    }
}

/// The closest eligible node strictly within the proximity threshold.
///
/// The dragged node, its current parent, and its descendants are never
/// eligible. Ties keep the first node in pre-order.
pub fn nearest_parent(
    tree: &Tree,
    positioned: &PositionedTree,
    node: NodeId,
    release: Point,
    config: &TreeConfig,
) -> Option<NodeId> {
    let parent = tree.parent(node);
    let mut best: Option<(NodeId, f64)> = None;
    for candidate in positioned.nodes() {
        if candidate.id == node
            || Some(candidate.id) == parent
            || tree.is_ancestor_of(node, candidate.id)
        {
            continue;
        }
        let distance = release.distance(Point::new(candidate.x, candidate.y));
        if distance < config.proximity_threshold && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// `(current, target)` sibling indices for dropping `node` at `release_x`.
///
/// Siblings are ordered by their laid-out x with the dragged node placed at
/// the release x; the target is the first slot at or right of `release_x`.
fn sibling_slot(
    tree: &Tree,
    positioned: &PositionedTree,
    node: NodeId,
    parent: NodeId,
    release_x: f64,
) -> Option<(usize, usize)> {
    let siblings = tree.children(parent);
    let current = siblings.iter().position(|&s| s == node)?;

    let mut xs: Vec<f64> = siblings
        .iter()
        .map(|&s| {
            if s == node {
                release_x
            } else {
                positioned.get(s).map_or(0.0, |p| p.x)
            }
        })
        .collect();
    xs.sort_by(f64::total_cmp);

    let target = xs
        .iter()
        .position(|&x| release_x <= x)
        .unwrap_or(siblings.len())
        .min(siblings.len() - 1);
    Some((current, target))
}
