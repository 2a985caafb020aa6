//! Parent → child connector geometry.
//!
//! Connectors run straight down from the parent to mid-height, turn with a
//! quarter curve, run across, turn again and drop to the child. Vertically
//! aligned endpoints get a plain segment.

use kurbo::{BezPath, Point};
use sprig_core::Link;

/// Build the connector path between two node centres.
pub fn link_path(from: Point, to: Point, radius: f64) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(from);

    if (from.x - to.x).abs() < 1.0 {
        path.line_to(to);
        return path;
    }

    let mid_y = (from.y + to.y) / 2.0;
    // Horizontal direction of travel.
    let dir = if from.x < to.x { 1.0 } else { -1.0 };

    path.line_to((from.x, mid_y - radius));
    path.quad_to((from.x, mid_y), (from.x + dir * radius, mid_y));
    path.line_to((to.x - dir * radius, mid_y));
    path.quad_to((to.x, mid_y), (to.x, mid_y + radius));
    path.line_to(to);
    path
}

/// Connector path for a resolved [`Link`].
pub fn path_for(link: &Link, radius: f64) -> BezPath {
    link_path(link.from.into(), link.to.into(), radius)
}
