//! Hit testing: point → node lookup.
//!
//! Node boxes are `node_width × node_height`, centred on the node position.
//! The walk runs in reverse paint order (last painted = topmost). The raised
//! node, when given, is painted last and therefore tested first.

use kurbo::{Point, Rect, Size};
use sprig_core::{NodeId, PositionedNode, PositionedTree, TreeConfig};

/// The box a node occupies in layout space.
pub fn node_rect(node: &PositionedNode, config: &TreeConfig) -> Rect {
    Rect::from_center_size(
        Point::new(node.x, node.y),
        Size::new(config.node_width, config.node_height),
    )
}

/// Find the topmost node whose box contains `point` (layout space).
/// Returns `None` on background.
pub fn hit_test(
    positioned: &PositionedTree,
    config: &TreeConfig,
    point: Point,
    raised: Option<NodeId>,
) -> Option<NodeId> {
    if let Some(node) = raised.and_then(|id| positioned.get(id))
        && node_rect(node, config).contains(point)
    {
        return Some(node.id);
    }

    positioned
        .nodes()
        .iter()
        .rev()
        .filter(|n| Some(n.id) != raised)
        .find(|n| node_rect(n, config).contains(point))
        .map(|n| n.id)
}
