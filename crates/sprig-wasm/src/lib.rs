//! WASM bridge for Sprig: exposes the tree editing session to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. The host owns the canvas:
//! it forwards pointer events in screen pixels, then paints the JSON display
//! list through the view transform returned alongside it.

use kurbo::{Point, Size};
use sprig_core::{NodeId, NodeSpec, Tree, TreeConfig, demo_outline};
use sprig_editor::EditSession;
use sprig_render::{Theme, ViewTransform};
use std::fmt::Display;
use wasm_bindgen::prelude::*;

/// The main WASM-facing canvas controller.
///
/// Holds the edit session and the view. All interaction from the page goes
/// through this struct.
#[wasm_bindgen]
pub struct TreeCanvas {
    session: EditSession,
    view: ViewTransform,
    width: f64,
    height: f64,
    /// Dark mode flag: `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl TreeCanvas {
    /// Create a controller showing the sample tree, centred in a viewport
    /// of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Self {
        console_error_panic_hook_setup();

        let config = TreeConfig::default();
        let session = match EditSession::from_spec(&demo_outline(), config) {
            Ok(session) => session,
            Err(err) => {
                log::warn!("sample outline rejected: {err}");
                EditSession::new(Tree::default(), config)
            }
        };
        let mut canvas = Self {
            session,
            view: ViewTransform::default(),
            width,
            height,
            dark_mode: false,
        };
        canvas.reset_view();
        canvas
    }

    // ─── Document ────────────────────────────────────────────────────────

    /// Replace the tree with a `{ name, children }` outline.
    /// Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
    pub fn load_json(&mut self, json: &str) -> String {
        let tree = NodeSpec::from_json(json).and_then(|spec| Tree::from_spec(&spec));
        match tree {
            Ok(tree) => {
                self.session.replace_tree(tree);
                self.reset_view();
                ok_json()
            }
            Err(err) => err_json(err),
        }
    }

    /// The current tree as a `{ name, children }` outline.
    pub fn get_tree_json(&self) -> String {
        self.session.tree().to_spec().to_json()
    }

    /// Merge a partial config (missing keys keep their defaults) and
    /// re-layout.
    pub fn set_config_json(&mut self, json: &str) -> String {
        match TreeConfig::from_json(json) {
            Ok(config) => {
                self.session.set_config(config);
                ok_json()
            }
            Err(err) => err_json(err),
        }
    }

    pub fn get_config_json(&self) -> String {
        to_json(self.session.config())
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    /// Fit the whole tree in the viewport, never zooming past 1:1.
    pub fn zoom_to_fit(&mut self) {
        self.view = ViewTransform::fit(
            &self.session.positioned().extent(),
            self.viewport(),
            self.session.config(),
        );
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.view.pan_by(dx, dy);
    }

    /// Zoom by `factor` around the screen point `(x, y)`.
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.view.zoom_at(Point::new(x, y), factor);
    }

    pub fn get_view_json(&self) -> String {
        to_json(&self.view)
    }

    // ─── Pointer input (screen pixels) ───────────────────────────────────

    /// Returns true if a re-render is needed.
    pub fn handle_pointer_down(&mut self, x: f64, y: f64) -> bool {
        let before = self.session.selected();
        let was_dragging = self.session.dragging().is_some();
        let at = self.to_layout(x, y);
        let hit = self.session.pointer_down(at);
        hit.is_some() || was_dragging || before != self.session.selected()
    }

    /// Returns true if a re-render is needed.
    pub fn handle_pointer_move(&mut self, x: f64, y: f64) -> bool {
        let at = self.to_layout(x, y);
        self.session.pointer_move(at);
        self.session.dragging().is_some()
    }

    /// Finish the gesture. Returns the outcome as JSON, or `null` when no
    /// gesture was in flight.
    pub fn handle_pointer_up(&mut self, x: f64, y: f64) -> String {
        let at = self.to_layout(x, y);
        match self.session.pointer_up(at) {
            Some(outcome) => to_json(&outcome),
            None => "null".to_string(),
        }
    }

    pub fn cancel_gesture(&mut self) {
        self.session.cancel_gesture();
    }

    // ─── Selection & commands ────────────────────────────────────────────

    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Select a node by its ID. Returns false for unknown IDs.
    pub fn select_by_id(&mut self, node_id: &str) -> bool {
        match self.lookup(node_id) {
            Some(id) => self.session.select(id).is_ok(),
            None => false,
        }
    }

    /// The selected node ID, or an empty string.
    pub fn get_selected_id(&self) -> String {
        self.session
            .selected()
            .map(|id| id.as_str().to_string())
            .unwrap_or_default()
    }

    pub fn command_state_json(&self) -> String {
        to_json(&self.session.command_state())
    }

    /// Returns true if anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        match self.session.delete_selected() {
            Ok(removed) => !removed.is_empty(),
            Err(err) => {
                log::debug!("delete_selected: {err}");
                false
            }
        }
    }

    // ─── Name dialog ─────────────────────────────────────────────────────

    /// Open the create dialog. Returns the dialog as JSON, or an error.
    pub fn open_create_dialog(&mut self) -> String {
        match self.session.open_create() {
            Ok(dialog) => to_json(dialog),
            Err(err) => err_json(err),
        }
    }

    /// Open the rename dialog, pre-filled with the current name.
    pub fn open_edit_dialog(&mut self) -> String {
        match self.session.open_edit() {
            Ok(dialog) => to_json(dialog),
            Err(err) => err_json(err),
        }
    }

    /// Whether the confirm button should be enabled for `input`.
    pub fn can_confirm_dialog(&self, input: &str) -> bool {
        self.session
            .dialog()
            .is_some_and(|dialog| dialog.can_confirm(input))
    }

    pub fn confirm_dialog(&mut self, input: &str) -> String {
        match self.session.confirm_dialog(input) {
            Ok(()) => ok_json(),
            Err(err) => err_json(err),
        }
    }

    pub fn cancel_dialog(&mut self) {
        self.session.cancel_dialog();
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Everything needed to paint one frame:
    /// `{ "view": {...}, "theme": {...}, "items": [...] }`.
    pub fn display_list_json(&self) -> String {
        let theme = if self.dark_mode {
            Theme::dark()
        } else {
            Theme::light()
        };
        let frame = serde_json::json!({
            "view": self.view,
            "theme": theme,
            "items": self.session.display_list(&theme),
        });
        frame.to_string()
    }
}

impl TreeCanvas {
    fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn to_layout(&self, x: f64, y: f64) -> Point {
        self.view.to_layout(Point::new(x, y))
    }

    /// Initial view: tree centred at the configured scale.
    fn reset_view(&mut self) {
        self.view = ViewTransform::centered(
            &self.session.positioned().extent(),
            self.viewport(),
            self.session.config().initial_scale,
        );
    }

    /// Resolve an ID string without interning unknown names.
    fn lookup(&self, node_id: &str) -> Option<NodeId> {
        self.session
            .tree()
            .iter()
            .map(|n| n.id)
            .find(|id| id.as_str() == node_id)
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Sprig WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

fn ok_json() -> String {
    r#"{"ok":true}"#.to_string()
}

fn err_json(err: impl Display) -> String {
    serde_json::json!({ "ok": false, "error": err.to_string() }).to_string()
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(err_json)
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

/// Validate an outline. Returns JSON: `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_outline(json: &str) -> String {
    match NodeSpec::from_json(json).and_then(|spec| Tree::from_spec(&spec)) {
        Ok(_) => ok_json(),
        Err(err) => err_json(err),
    }
}

/// The default layout config as JSON.
#[wasm_bindgen]
pub fn default_config_json() -> String {
    to_json(&TreeConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn canvas() -> TreeCanvas {
        TreeCanvas::new(800.0, 600.0)
    }

    fn parse(json: &str) -> Value {
        serde_json::from_str(json).unwrap()
    }

    /// Screen position of the node called `name`.
    fn screen_of(c: &TreeCanvas, name: &str) -> (f64, f64) {
        let id = c.session.tree().find_by_name(name).unwrap();
        let (x, y) = c.session.positioned().position_of(id).unwrap();
        let p = c.view.to_screen(Point::new(x, y));
        (p.x, p.y)
    }

    fn node_count(frame: &Value) -> usize {
        frame["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|i| i["kind"] == "node")
            .count()
    }

    #[test]
    fn zoom_to_fit_in_collapsed_viewport_keeps_pointer_usable() {
        let mut c = canvas();
        c.resize(0.0, 0.0);
        c.zoom_to_fit();
        assert!(parse(&c.get_view_json())["scale"].as_f64().unwrap() > 0.0);
        let p = c.to_layout(1.0, 1.0);
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn starts_with_sample_tree_centred() {
        let c = canvas();
        let frame = parse(&c.display_list_json());
        assert_eq!(node_count(&frame), 15);
        assert_eq!(frame["view"]["scale"], 0.8);
        assert_eq!(parse(&c.command_state_json())["can_create"], false);
    }

    #[test]
    fn click_in_screen_space_selects() {
        let mut c = canvas();
        let (x, y) = screen_of(&c, "Node 2");
        assert!(c.handle_pointer_down(x, y));
        let outcome = parse(&c.handle_pointer_up(x, y));
        assert_eq!(outcome["kind"], "click");
        assert_eq!(c.get_selected_id(), outcome["node"].as_str().unwrap());
        assert_eq!(parse(&c.command_state_json())["can_delete"], true);
    }

    #[test]
    fn drag_in_screen_space_reparents() {
        let mut c = canvas();
        c.load_json(r#"{"name":"A","children":[{"name":"B"},{"name":"C"}]}"#);
        let (cx, cy) = screen_of(&c, "C");
        let (bx, by) = screen_of(&c, "B");
        c.handle_pointer_down(cx, cy);
        assert!(c.handle_pointer_move(bx + 4.0, by + 4.0));
        let outcome = parse(&c.handle_pointer_up(bx + 4.0, by + 4.0));
        assert_eq!(outcome["kind"], "reparent");
        assert_eq!(
            parse(&c.get_tree_json()),
            parse(r#"{"name":"A","children":[{"name":"B","children":[{"name":"C"}]}]}"#)
        );
    }

    #[test]
    fn pointer_up_without_gesture_is_null() {
        let mut c = canvas();
        assert_eq!(c.handle_pointer_up(0.0, 0.0), "null");
    }

    #[test]
    fn bad_outline_reports_error_and_keeps_tree() {
        let mut c = canvas();
        let before = c.get_tree_json();
        let result = parse(&c.load_json(r#"{"name":"A","children":[{"name":"  "}]}"#));
        assert_eq!(result["ok"], false);
        assert_eq!(c.get_tree_json(), before);
        assert_eq!(parse(&c.load_json("not json"))["ok"], false);
    }

    #[test]
    fn dialog_roundtrip() {
        let mut c = canvas();
        assert_eq!(parse(&c.open_create_dialog())["ok"], false);

        let root = c.session.tree().root();
        assert!(c.select_by_id(root.as_str()));
        let dialog = parse(&c.open_create_dialog());
        assert_eq!(dialog["intent"]["kind"], "create");
        assert!(!c.can_confirm_dialog("   "));
        assert!(c.can_confirm_dialog("Node 4"));
        assert_eq!(parse(&c.confirm_dialog("Node 4"))["ok"], true);
        assert_eq!(parse(&c.get_tree_json())["children"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn select_unknown_id_fails() {
        let mut c = canvas();
        assert!(!c.select_by_id("no-such-node"));
        assert_eq!(c.get_selected_id(), "");
    }

    #[test]
    fn delete_selected_respects_root() {
        let mut c = canvas();
        let root = c.session.tree().root();
        c.select_by_id(root.as_str());
        assert!(!c.delete_selected());

        let (x, y) = screen_of(&c, "Node 3");
        c.handle_pointer_down(x, y);
        c.handle_pointer_up(x, y);
        assert!(c.delete_selected());
        assert_eq!(node_count(&parse(&c.display_list_json())), 11);
    }

    #[test]
    fn zoom_to_fit_caps_at_one() {
        let mut c = TreeCanvas::new(10_000.0, 10_000.0);
        c.zoom_to_fit();
        assert_eq!(parse(&c.get_view_json())["scale"], 1.0);
    }

    #[test]
    fn partial_config_relayouts() {
        let mut c = canvas();
        assert_eq!(parse(&c.set_config_json(r#"{"y_spacing":120}"#))["ok"], true);
        let (_, y) = c
            .session
            .positioned()
            .position_of(c.session.tree().find_by_name("Node 1").unwrap())
            .unwrap();
        assert_eq!(y, 120.0);
        assert_eq!(parse(&c.set_config_json(r#""wide""#))["ok"], false);
    }

    #[test]
    fn standalone_validation() {
        assert_eq!(parse(&validate_outline(r#"{"name":"A"}"#))["ok"], true);
        assert_eq!(parse(&validate_outline(r#"{"children":[]}"#))["ok"], false);
        assert_eq!(parse(&default_config_json())["x_spacing"], 144.0);
    }
}
