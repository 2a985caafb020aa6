//! Editor configuration: node geometry, spacing, and gesture thresholds.

use serde::{Deserialize, Serialize};

/// Tunables shared by layout, hit testing, and the drag classifier.
///
/// Every field has a default, so a partial JSON object such as
/// `{"proximity_threshold": 80}` deserializes into a full config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Width of a node box, centred on the node position.
    pub node_width: f64,
    /// Height of a node box, centred on the node position.
    pub node_height: f64,
    /// One horizontal separation unit between sibling centres.
    pub x_spacing: f64,
    /// Vertical distance between depth levels.
    pub y_spacing: f64,
    /// A drop closer than this to another node re-parents onto it.
    pub proximity_threshold: f64,
    /// Pointer displacement that turns a press into a drag.
    pub motion_threshold: f64,
    /// Elbow radius of parent → child connectors.
    pub link_radius: f64,
    /// Padding added on each side by "zoom to fit".
    pub fit_padding: f64,
    /// Zoom level of the initial centred view.
    pub initial_scale: f64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        let node_width = 120.0;
        let node_height = 60.0;
        Self {
            node_width,
            node_height,
            x_spacing: node_width * 1.2,
            y_spacing: node_height * 1.5,
            proximity_threshold: 50.0,
            motion_threshold: 5.0,
            link_radius: 15.0,
            fit_padding: 50.0,
            initial_scale: 0.8,
        }
    }
}

impl TreeConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
