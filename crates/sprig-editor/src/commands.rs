//! Command availability.
//!
//! Buttons are enabled from the selection alone: create and edit need a
//! selected node, delete additionally needs that node to have a parent.

use serde::Serialize;
use sprig_core::{NodeId, Tree};

/// Discrete edit commands a host can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    CreateChild,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CommandState {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl CommandState {
    pub fn for_selection(tree: &Tree, selected: Option<NodeId>) -> Self {
        let Some(id) = selected.filter(|&id| tree.contains(id)) else {
            return Self::default();
        };
        Self {
            can_create: true,
            can_edit: true,
            can_delete: tree.parent(id).is_some(),
        }
    }

    pub fn allows(&self, command: Command) -> bool {
        match command {
            Command::CreateChild => self.can_create,
            Command::Edit => self.can_edit,
            Command::Delete => self.can_delete,
        }
    }
}
