//! Integration tests: pointer gestures → tree mutations (sprig-editor).
//!
//! Drives `EditSession` with raw input events, the way a host would, and
//! checks the resulting tree structure.

use pretty_assertions::assert_eq;
use sprig_core::{NodeId, NodeSpec, TreeConfig, demo_outline};
use sprig_editor::{DragOutcome, DragPhase, EditSession, InputEvent};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session(spec: NodeSpec) -> EditSession {
    init();
    EditSession::from_spec(&spec, TreeConfig::default()).unwrap()
}

fn id(s: &EditSession, name: &str) -> NodeId {
    s.tree()
        .find_by_name(name)
        .unwrap_or_else(|| panic!("{name} not found"))
}

/// Press on `name`, move through `path`, release at the last point.
fn drag(s: &mut EditSession, name: &str, path: &[(f64, f64)]) -> Option<DragOutcome> {
    let (x, y) = s.positioned().position_of(id(s, name)).unwrap();
    s.handle(&InputEvent::from_pointer_down(x, y));
    for &(px, py) in path {
        s.handle(&InputEvent::from_pointer_move(px, py));
    }
    let &(ux, uy) = path.last().unwrap_or(&(x, y));
    s.handle(&InputEvent::from_pointer_up(ux, uy))
}

// ─── Re-parent ──────────────────────────────────────────────────────────

#[test]
fn drag_onto_sibling_reparents() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let (bx, by) = s.positioned().position_of(id(&s, "B")).unwrap();

    let outcome = drag(&mut s, "C", &[(20.0, 95.0), (bx + 10.0, by + 10.0)]);
    assert!(matches!(outcome, Some(DragOutcome::Reparent { .. })));
    assert_eq!(
        s.tree().to_spec(),
        NodeSpec::new("A", vec![NodeSpec::new("B", vec![NodeSpec::leaf("C")])])
    );
    s.tree().verify().unwrap();

    // New layout: C sits directly under B.
    let (bx, by) = s.positioned().position_of(id(&s, "B")).unwrap();
    assert_eq!(s.positioned().position_of(id(&s, "C")), Some((bx, by + 90.0)));
    assert_eq!(s.drag_phase(), DragPhase::Idle);
}

#[test]
fn reparent_moves_whole_subtree_across_families() {
    let mut s = session(demo_outline());
    let target = id(&s, "Child 3.1");
    let (tx, ty) = s.positioned().position_of(target).unwrap();

    drag(&mut s, "Child 1.1", &[(tx, ty - 30.0), (tx + 5.0, ty + 5.0)]);

    let moved = id(&s, "Child 1.1");
    assert_eq!(s.tree().parent(moved), Some(target));
    assert_eq!(s.tree().children(moved).len(), 2);
    assert_eq!(s.tree().len(), 15);
    s.tree().verify().unwrap();
}

#[test]
fn dropping_a_node_onto_its_own_descendant_never_cycles() {
    let mut s = session(demo_outline());
    let leaf = id(&s, "Node 1.1.1");
    let (lx, ly) = s.positioned().position_of(leaf).unwrap();

    let outcome = drag(&mut s, "Node 1", &[(lx, ly)]).unwrap();
    assert!(!matches!(outcome, DragOutcome::Reparent { .. }), "{outcome:?}");
    assert_eq!(s.tree().parent(id(&s, "Node 1")), Some(s.tree().root()));
    s.tree().verify().unwrap();
}

#[test]
fn root_drag_is_a_noop() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let before = s.tree().to_spec();
    let (bx, by) = s.positioned().position_of(id(&s, "B")).unwrap();

    let outcome = drag(&mut s, "A", &[(bx, by)]);
    assert_eq!(
        outcome,
        Some(DragOutcome::NoOp {
            node: s.tree().root()
        })
    );
    assert_eq!(s.tree().to_spec(), before);
    // Follow override is gone.
    assert_eq!(s.positioned().position_of(s.tree().root()), Some((0.0, 0.0)));
}

// ─── Reorder ────────────────────────────────────────────────────────────

#[test]
fn drag_between_siblings_reorders() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C"), NodeSpec::leaf("D")],
    ));

    drag(&mut s, "D", &[(60.0, 100.0), (-72.0, 90.0)]);

    let names: Vec<_> = s
        .tree()
        .children(s.tree().root())
        .into_iter()
        .map(|c| s.tree().name(c).unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["B", "D", "C"]);
    s.tree().verify().unwrap();
}

#[test]
fn drag_to_far_left_moves_to_front() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C"), NodeSpec::leaf("D")],
    ));
    drag(&mut s, "C", &[(-400.0, 300.0)]);
    assert_eq!(
        s.tree().to_spec(),
        NodeSpec::new(
            "A",
            vec![NodeSpec::leaf("C"), NodeSpec::leaf("B"), NodeSpec::leaf("D")]
        )
    );
}

#[test]
fn small_wiggle_keeps_order() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C"), NodeSpec::leaf("D")],
    ));
    let before = s.tree().to_spec();
    let outcome = drag(&mut s, "C", &[(30.0, 150.0), (10.0, 160.0)]).unwrap();
    assert_eq!(outcome, DragOutcome::NoOp { node: id(&s, "C") });
    assert_eq!(s.tree().to_spec(), before);
}

// ─── Click vs drag ──────────────────────────────────────────────────────

#[test]
fn click_within_threshold_selects_without_mutation() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let before = s.tree().to_spec();
    let b = id(&s, "B");
    let (bx, by) = s.positioned().position_of(b).unwrap();

    let outcome = drag(&mut s, "B", &[(bx + 3.0, by + 4.0)]);
    assert_eq!(outcome, Some(DragOutcome::Click { node: b }));
    assert_eq!(s.selected(), Some(b));
    assert_eq!(s.tree().to_spec(), before);
}

#[test]
fn motion_past_threshold_is_not_a_click() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let b = id(&s, "B");
    let (bx, by) = s.positioned().position_of(b).unwrap();

    let outcome = drag(&mut s, "B", &[(bx + 6.0, by)]).unwrap();
    assert_ne!(outcome, DragOutcome::Click { node: b });
    assert_eq!(s.selected(), None);
}

#[test]
fn clicking_another_node_moves_selection() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    drag(&mut s, "B", &[]);
    drag(&mut s, "C", &[]);
    assert_eq!(s.selected(), Some(id(&s, "C")));

    // Clicking the selected node again keeps it selected.
    drag(&mut s, "C", &[]);
    assert_eq!(s.selected(), Some(id(&s, "C")));
}

#[test]
fn cancel_event_aborts_the_drag() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let before = s.tree().to_spec();
    let b = id(&s, "B");
    let home = s.positioned().position_of(b).unwrap();

    s.handle(&InputEvent::from_pointer_down(home.0, home.1));
    s.handle(&InputEvent::from_pointer_move(72.0, 100.0));
    s.handle(&InputEvent::Cancel);
    assert_eq!(s.handle(&InputEvent::from_pointer_up(72.0, 100.0)), None);

    assert_eq!(s.tree().to_spec(), before);
    assert_eq!(s.positioned().position_of(b), Some(home));
}

#[test]
fn background_press_mid_drag_restores_layout() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let b = id(&s, "B");
    let home = s.positioned().position_of(b).unwrap();

    s.handle(&InputEvent::from_pointer_down(home.0, home.1));
    s.handle(&InputEvent::from_pointer_move(home.0 + 40.0, home.1 + 300.0));
    assert_eq!(s.dragging(), Some(b));

    // Release never arrives; the next press lands on empty canvas.
    s.handle(&InputEvent::from_pointer_down(5000.0, 5000.0));
    assert_eq!(s.drag_phase(), DragPhase::Idle);
    assert_eq!(s.positioned().position_of(b), Some(home));
}

#[test]
fn node_press_mid_drag_restores_layout() {
    let mut s = session(NodeSpec::new(
        "A",
        vec![NodeSpec::leaf("B"), NodeSpec::leaf("C")],
    ));
    let before = s.tree().to_spec();
    let (b, c) = (id(&s, "B"), id(&s, "C"));
    let home = s.positioned().position_of(b).unwrap();
    let (cx, cy) = s.positioned().position_of(c).unwrap();

    s.handle(&InputEvent::from_pointer_down(home.0, home.1));
    s.handle(&InputEvent::from_pointer_move(home.0 + 40.0, home.1 + 300.0));

    s.handle(&InputEvent::from_pointer_down(cx, cy));
    let outcome = s.handle(&InputEvent::from_pointer_up(cx, cy));
    assert_eq!(outcome, Some(DragOutcome::Click { node: c }));
    assert_eq!(s.selected(), Some(c));
    assert_eq!(s.positioned().position_of(b), Some(home));
    assert_eq!(s.tree().to_spec(), before);
}
