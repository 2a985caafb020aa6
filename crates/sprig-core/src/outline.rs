//! Nested `{ name, children }` outlines.
//!
//! Outlines seed a session's initial tree and give tests and the WASM
//! bridge a plain structural snapshot to compare against. They carry names
//! only; node IDs are assigned when an outline is loaded.

use crate::error::EditResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    /// Omitted for leaves when serialized; a missing key reads as a leaf.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, children: Vec<NodeSpec>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn from_json(json: &str) -> EditResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> String {
        // Strings and vectors only, serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Number of nodes in this outline, including itself.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(spec) = stack.pop() {
            total += 1;
            stack.extend(&spec.children);
        }
        total
    }
}

/// The sample tree the editor opens with: a root and three families.
pub fn demo_outline() -> NodeSpec {
    use NodeSpec as N;
    N::new(
        "Root",
        vec![
            N::new(
                "Node 1",
                vec![
                    N::new("Child 1.1", vec![N::leaf("Node 1.1.1"), N::leaf("Node 1.1.2")]),
                    N::new("Child 1.2", vec![N::leaf("Node 1.2.1")]),
                    N::leaf("Child 1.3"),
                ],
            ),
            N::new("Node 2", vec![N::leaf("Child 2.1"), N::leaf("Child 2.2")]),
            N::new(
                "Node 3",
                vec![
                    N::leaf("Child 3.1"),
                    N::leaf("Child 3.2"),
                    N::leaf("Child 3.3"),
                ],
            ),
        ],
    )
}
