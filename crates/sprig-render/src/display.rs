//! Positioned tree → surface-agnostic draw list.
//!
//! The host walks the list in order: connectors first, then node boxes in
//! pre-order, with the raised (dragged) node last so it paints on top.

use crate::hit::node_rect;
use crate::link::path_for;
use serde::Serialize;
use sprig_core::{NodeId, PositionedTree, TreeConfig};

/// Colours for one canvas appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub bg: &'static str,
    pub node_fill: &'static str,
    pub node_stroke: &'static str,
    pub selected_stroke: &'static str,
    pub link_stroke: &'static str,
    pub text: &'static str,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            bg: "#FFFFFF",
            node_fill: "#FFFFFF",
            node_stroke: "#4CAF50",
            selected_stroke: "#FFD700",
            link_stroke: "#CCCCCC",
            text: "#333333",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            node_fill: "#2C2C2E",
            node_stroke: "#4CAF50",
            selected_stroke: "#FFD700",
            link_stroke: "#636366",
            text: "#F2F2F7",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

pub const CORNER_RADIUS: f64 = 5.0;
pub const NODE_STROKE_WIDTH: f64 = 1.5;
pub const LINK_STROKE_WIDTH: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayItem {
    Link {
        parent: NodeId,
        child: NodeId,
        /// SVG path data.
        path: String,
        stroke: &'static str,
        stroke_width: f64,
    },
    Node {
        id: NodeId,
        label: String,
        /// Top-left corner of the box.
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        corner_radius: f64,
        fill: &'static str,
        stroke: &'static str,
        stroke_width: f64,
        text: &'static str,
        selected: bool,
    },
}

impl DisplayItem {
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            DisplayItem::Node { id, .. } => Some(*id),
            DisplayItem::Link { .. } => None,
        }
    }
}

/// Build the draw list for the current frame.
pub fn build_display_list(
    positioned: &PositionedTree,
    config: &TreeConfig,
    selected: Option<NodeId>,
    raised: Option<NodeId>,
    theme: &Theme,
) -> Vec<DisplayItem> {
    let mut items: Vec<DisplayItem> = positioned
        .links()
        .map(|link| DisplayItem::Link {
            parent: link.parent,
            child: link.child,
            path: path_for(&link, config.link_radius).to_svg(),
            stroke: theme.link_stroke,
            stroke_width: LINK_STROKE_WIDTH,
        })
        .collect();

    let mut top = None;
    for node in positioned.nodes() {
        let rect = node_rect(node, config);
        let is_selected = Some(node.id) == selected;
        let item = DisplayItem::Node {
            id: node.id,
            label: node.name.clone(),
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            corner_radius: CORNER_RADIUS,
            fill: theme.node_fill,
            stroke: if is_selected {
                theme.selected_stroke
            } else {
                theme.node_stroke
            },
            stroke_width: NODE_STROKE_WIDTH,
            text: theme.text,
            selected: is_selected,
        };
        if Some(node.id) == raised {
            top = Some(item);
        } else {
            items.push(item);
        }
    }
    items.extend(top);

    log::trace!(
        "display list: {} items ({} nodes)",
        items.len(),
        positioned.len()
    );
    items
}
