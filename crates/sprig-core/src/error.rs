//! Error taxonomy for tree edits.
//!
//! The editor is interactive and purely in-memory, so the set is small:
//! precondition violations the UI normally prevents by disabling a command,
//! plus structural rejections (root moves, cycles).

use crate::id::NodeId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("node name must not be empty")]
    EmptyName,

    #[error("no node is selected")]
    NoSelection,

    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("the root node cannot be moved or deleted")]
    RootImmutable,

    #[error("{0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("cannot attach {node} under {target}: {target} is inside its subtree")]
    WouldCycle { node: NodeId, target: NodeId },

    #[error("invalid outline: {0}")]
    InvalidOutline(String),
}

impl From<serde_json::Error> for EditError {
    fn from(err: serde_json::Error) -> Self {
        EditError::InvalidOutline(err.to_string())
    }
}

pub type EditResult<T> = Result<T, EditError>;
