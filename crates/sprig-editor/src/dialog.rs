//! Name dialog for creating and renaming nodes.
//!
//! The dialog carries what it was opened for, so confirming it cannot be
//! dispatched to the wrong operation.

use serde::Serialize;
use sprig_core::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogIntent {
    /// Append a new child under `parent`.
    Create { parent: NodeId },
    /// Rename `node`.
    Edit { node: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dialog {
    pub intent: DialogIntent,
    pub title: &'static str,
    /// Pre-filled input: empty for create, the current name for edit.
    pub initial_text: String,
}

impl Dialog {
    pub fn create(parent: NodeId) -> Self {
        Self {
            intent: DialogIntent::Create { parent },
            title: "New node",
            initial_text: String::new(),
        }
    }

    pub fn edit(node: NodeId, current_name: &str) -> Self {
        Self {
            intent: DialogIntent::Edit { node },
            title: "Edit node",
            initial_text: current_name.to_string(),
        }
    }

    /// Confirmation is disabled for blank input.
    pub fn can_confirm(&self, input: &str) -> bool {
        !input.trim().is_empty()
    }

    /// The node the dialog was opened on.
    pub fn target(&self) -> NodeId {
        match self.intent {
            DialogIntent::Create { parent } => parent,
            DialogIntent::Edit { node } => node,
        }
    }
}
