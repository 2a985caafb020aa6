//! Edit session: the tree, its layout, the selection, and the gesture in
//! flight.
//!
//! The session owns the authoritative `Tree`. Every structural change goes
//! through [`EditSession::apply_mutation`], after which the positioned tree
//! is rebuilt from scratch. During a drag only the positioned copy of the
//! dragged node moves; the tree itself is untouched until release.

use crate::commands::{Command, CommandState};
use crate::dialog::{Dialog, DialogIntent};
use crate::drag::{DragGesture, DragOutcome, DragPhase};
use crate::input::InputEvent;
use kurbo::Point;
use sprig_core::{
    EditError, EditResult, NodeId, NodeSpec, PositionedTree, Tree, TreeConfig, resolve_layout,
};
use sprig_render::{DisplayItem, Theme, build_display_list, hit_test};

/// A structural change to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeMutation {
    Reparent { node: NodeId, new_parent: NodeId },
    Reorder { node: NodeId, index: usize },
    InsertChild { parent: NodeId, name: String },
    Rename { node: NodeId, name: String },
    Delete { node: NodeId },
}

pub struct EditSession {
    tree: Tree,

    /// Layout projection of `tree` (recomputed after mutations).
    positioned: PositionedTree,

    config: TreeConfig,

    /// The single selected node, if any.
    selected: Option<NodeId>,

    gesture: DragGesture,

    /// Open name dialog, if any.
    dialog: Option<Dialog>,
}

impl EditSession {
    pub fn new(tree: Tree, config: TreeConfig) -> Self {
        let positioned = resolve_layout(&tree, &config);
        Self {
            tree,
            positioned,
            config,
            selected: None,
            gesture: DragGesture::new(),
            dialog: None,
        }
    }

    pub fn from_spec(spec: &NodeSpec, config: TreeConfig) -> EditResult<Self> {
        Ok(Self::new(Tree::from_spec(spec)?, config))
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn positioned(&self) -> &PositionedTree {
        &self.positioned
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn drag_phase(&self) -> DragPhase {
        self.gesture.phase()
    }

    /// The node currently following the pointer.
    pub fn dragging(&self) -> Option<NodeId> {
        self.gesture.dragging()
    }

    pub fn command_state(&self) -> CommandState {
        CommandState::for_selection(&self.tree, self.selected)
    }

    /// Topmost node at `point` (layout space).
    pub fn hit(&self, point: Point) -> Option<NodeId> {
        hit_test(&self.positioned, &self.config, point, self.dragging())
    }

    pub fn display_list(&self, theme: &Theme) -> Vec<DisplayItem> {
        build_display_list(
            &self.positioned,
            &self.config,
            self.selected,
            self.dragging(),
            theme,
        )
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Re-resolve layout, discarding any drag override.
    pub fn resolve(&mut self) {
        self.positioned = resolve_layout(&self.tree, &self.config);
    }

    pub fn set_config(&mut self, config: TreeConfig) {
        self.config = config;
        self.resolve();
    }

    /// Swap in a whole new tree. Selection, gesture, and dialog are reset.
    pub fn replace_tree(&mut self, tree: Tree) {
        self.tree = tree;
        self.selected = None;
        self.gesture.cancel();
        self.dialog = None;
        self.resolve();
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one structural change and re-layout. On error the tree is
    /// unchanged. Returns the nodes the change created or removed.
    pub fn apply_mutation(&mut self, mutation: TreeMutation) -> EditResult<Vec<NodeId>> {
        let affected = match mutation {
            TreeMutation::Reparent { node, new_parent } => {
                self.tree.reparent(node, new_parent)?;
                Vec::new()
            }
            TreeMutation::Reorder { node, index } => {
                if !self.tree.contains(node) {
                    return Err(EditError::UnknownNode(node));
                }
                self.tree.reorder_among(node, index);
                Vec::new()
            }
            TreeMutation::InsertChild { parent, name } => {
                vec![self.tree.insert_child(parent, &name)?]
            }
            TreeMutation::Rename { node, name } => {
                self.tree.rename(node, &name)?;
                Vec::new()
            }
            TreeMutation::Delete { node } => {
                let removed = self.tree.delete_node(node)?;
                if self.selected.is_some_and(|s| removed.contains(&s)) {
                    self.selected = None;
                }
                if self
                    .dialog
                    .as_ref()
                    .is_some_and(|d| removed.contains(&d.target()))
                {
                    self.dialog = None;
                }
                removed
            }
        };
        self.resolve();
        Ok(affected)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn select(&mut self, id: NodeId) -> EditResult<()> {
        if !self.tree.contains(id) {
            return Err(EditError::UnknownNode(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn require_selection(&self, command: Command) -> EditResult<NodeId> {
        let selected = self.selected.ok_or(EditError::NoSelection)?;
        if !self.command_state().allows(command) {
            return Err(match command {
                Command::Delete => EditError::RootImmutable,
                _ => EditError::NoSelection,
            });
        }
        Ok(selected)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Append a child named `name` under the selected node. The selection
    /// stays on the parent.
    pub fn create_child(&mut self, name: &str) -> EditResult<NodeId> {
        let parent = self.require_selection(Command::CreateChild)?;
        let created = self.apply_mutation(TreeMutation::InsertChild {
            parent,
            name: name.to_string(),
        })?;
        created.first().copied().ok_or(EditError::UnknownNode(parent))
    }

    pub fn rename(&mut self, node: NodeId, name: &str) -> EditResult<()> {
        self.apply_mutation(TreeMutation::Rename {
            node,
            name: name.to_string(),
        })
        .map(drop)
    }

    pub fn rename_selected(&mut self, name: &str) -> EditResult<()> {
        let node = self.require_selection(Command::Edit)?;
        self.rename(node, name)
    }

    /// Delete `node` and its subtree. Clears the selection if it was inside.
    pub fn delete(&mut self, node: NodeId) -> EditResult<Vec<NodeId>> {
        self.apply_mutation(TreeMutation::Delete { node })
    }

    pub fn delete_selected(&mut self) -> EditResult<Vec<NodeId>> {
        let node = self.require_selection(Command::Delete)?;
        self.delete(node)
    }

    // ─── Dialog ──────────────────────────────────────────────────────────

    pub fn open_create(&mut self) -> EditResult<&Dialog> {
        let parent = self.require_selection(Command::CreateChild)?;
        Ok(&*self.dialog.insert(Dialog::create(parent)))
    }

    pub fn open_edit(&mut self) -> EditResult<&Dialog> {
        let node = self.require_selection(Command::Edit)?;
        let name = self.tree.name(node).unwrap_or_default().to_string();
        Ok(&*self.dialog.insert(Dialog::edit(node, &name)))
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog = None;
    }

    /// Confirm the open dialog. The dialog stays open when the input is
    /// rejected.
    pub fn confirm_dialog(&mut self, input: &str) -> EditResult<()> {
        let dialog = self.dialog.clone().ok_or(EditError::NoSelection)?;
        self.confirm(&dialog, input)?;
        self.dialog = None;
        Ok(())
    }

    /// Dispatch `input` on the dialog's intent.
    pub fn confirm(&mut self, dialog: &Dialog, input: &str) -> EditResult<()> {
        if !dialog.can_confirm(input) {
            return Err(EditError::EmptyName);
        }
        match dialog.intent {
            DialogIntent::Create { parent } => self
                .apply_mutation(TreeMutation::InsertChild {
                    parent,
                    name: input.to_string(),
                })
                .map(drop),
            DialogIntent::Edit { node } => self.rename(node, input),
        }
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Feed one input event (layout space). Returns the gesture outcome on
    /// release.
    pub fn handle(&mut self, event: &InputEvent) -> Option<DragOutcome> {
        match *event {
            InputEvent::PointerDown { x, y } => {
                self.pointer_down(Point::new(x, y));
                None
            }
            InputEvent::PointerMove { x, y } => {
                self.pointer_move(Point::new(x, y));
                None
            }
            InputEvent::PointerUp { x, y } => self.pointer_up(Point::new(x, y)),
            InputEvent::Cancel => {
                self.cancel_gesture();
                None
            }
        }
    }

    /// Press on a node starts a gesture; press on background clears the
    /// selection. A drag still in flight (lost release, second touch) is
    /// cancelled first so the new press sees the laid-out positions.
    pub fn pointer_down(&mut self, at: Point) -> Option<NodeId> {
        self.cancel_gesture();
        let hit = self.hit(at);
        match hit {
            Some(node) => self.gesture.pointer_down(node, at),
            None => self.clear_selection(),
        }
        hit
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let Some((node, follow)) = self.gesture.pointer_move(at, &self.config) {
            self.positioned.set_position(node, follow.x, follow.y);
            log::trace!("drag {node} to ({}, {})", follow.x, follow.y);
        }
    }

    pub fn pointer_up(&mut self, at: Point) -> Option<DragOutcome> {
        let was_dragging = self.gesture.dragging().is_some();
        let outcome = self
            .gesture
            .pointer_up(at, &self.tree, &self.positioned, &self.config)?;
        self.apply_outcome(&outcome);
        if was_dragging && !outcome.is_structural() {
            // Drop the follow override.
            self.resolve();
        }
        Some(outcome)
    }

    pub fn cancel_gesture(&mut self) {
        let was_dragging = self.gesture.dragging().is_some();
        self.gesture.cancel();
        if was_dragging {
            self.resolve();
        }
    }

    fn apply_outcome(&mut self, outcome: &DragOutcome) {
        let result = match *outcome {
            DragOutcome::Click { node } => self.select(node),
            DragOutcome::Reparent {
                node, new_parent, ..
            } => self
                .apply_mutation(TreeMutation::Reparent { node, new_parent })
                .map(drop),
            DragOutcome::Reorder { node, to, .. } => self
                .apply_mutation(TreeMutation::Reorder { node, index: to })
                .map(drop),
            DragOutcome::NoOp { .. } => Ok(()),
        };
        if let Err(err) = result {
            log::debug!("drop rejected: {err}");
            self.resolve();
        }
    }
}
