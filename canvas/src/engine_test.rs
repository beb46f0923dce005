#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::doc::{ImageStatus, ItemKind};
use crate::input::{HitPart, NativeDrag};
use crate::viewport::Percent;

// =============================================================
// Helpers
// =============================================================

fn engine() -> EngineCore {
    EngineCore::new(Viewport::new(800.0, 600.0), InteractionKind::Helper, false)
}

fn native_engine() -> EngineCore {
    EngineCore::new(Viewport::new(800.0, 600.0), InteractionKind::Native, false)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn file(name: &str) -> SourceFile {
    SourceFile::new(name, vec![0u8; 8])
}

fn payload() -> ImagePayload {
    ImagePayload {
        data_url: "data:image/png;base64,AAAA".into(),
        mime: "image/png".into(),
        natural_width: 16,
        natural_height: 9,
    }
}

fn has_render_needed(actions: &[Action]) -> bool {
    actions.iter().any(|a| matches!(a, Action::RenderNeeded))
}

fn decode_tasks(actions: &[Action]) -> Vec<DecodeTask> {
    actions
        .iter()
        .filter_map(|a| match a {
            Action::DecodeRequested(task) => Some(task.clone()),
            Action::RenderNeeded => None,
        })
        .collect()
}

fn add_text(core: &mut EngineCore, text: &str) -> ItemId {
    core.apply(Command::AddText { text: text.into() });
    core.snapshot().items().last().unwrap().id
}

// =============================================================
// Construction
// =============================================================

#[test]
fn default_engine_is_empty_with_helper() {
    let core = EngineCore::default();
    assert!(core.snapshot().is_empty());
    assert_eq!(core.interaction().kind(), InteractionKind::Helper);
    assert!(core.store.viewport().is_degenerate());
    assert_eq!(core.selection(), None);
}

#[test]
fn set_interaction_swaps_strategy() {
    let mut core = engine();
    core.set_interaction(Box::new(NativeDrag::new()));
    assert_eq!(core.interaction().kind(), InteractionKind::Native);
}

// =============================================================
// Commands
// =============================================================

#[test]
fn add_images_requests_one_decode_per_file() {
    let mut core = engine();
    let actions = core.apply(Command::AddImages { files: vec![file("a.png"), file("b.png")] });
    let tasks = decode_tasks(&actions);
    assert_eq!(tasks.len(), 2);
    assert_ne!(tasks[0].id, tasks[1].id);
    assert_eq!(tasks[0].file.name, "a.png");
    assert!(has_render_needed(&actions));
    assert_eq!(core.snapshot().len(), 2);
}

#[test]
fn add_images_empty_does_nothing() {
    let mut core = engine();
    assert!(core.apply(Command::AddImages { files: Vec::new() }).is_empty());
}

#[test]
fn add_text_renders() {
    let mut core = engine();
    let actions = core.apply(Command::AddText { text: String::new() });
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.snapshot().items()[0].kind(), ItemKind::Text);
}

#[test]
fn move_converts_to_percent() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    let actions = core.apply(Command::Move { id, to: pt(400.0, 300.0) });
    assert_eq!(actions, vec![Action::RenderNeeded]);
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::new(50.0, 50.0));
}

#[test]
fn viewport_change_applies_before_later_move() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    core.apply(Command::SetViewport(Viewport::new(400.0, 300.0)));
    core.apply(Command::Move { id, to: pt(400.0, 300.0) });
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::new(100.0, 100.0));
}

#[test]
fn move_with_zero_viewport_is_rejected() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    core.apply(Command::SetViewport(Viewport::new(0.0, 0.0)));
    let actions = core.apply(Command::Move { id, to: pt(10.0, 10.0) });
    assert!(actions.is_empty());
    let pos = core.snapshot().get(&id).unwrap().position;
    assert_eq!(pos, Percent::default());
}

#[test]
fn unknown_id_commands_are_silent() {
    let mut core = engine();
    add_text(&mut core, "t");
    let before = core.snapshot();
    let ghost = Uuid::now_v7();
    for command in [
        Command::Move { id: ghost, to: pt(1.0, 1.0) },
        Command::Resize { id: ghost, width: 10.0, height: 10.0 },
        Command::Rotate { id: ghost },
        Command::Select { id: Some(ghost) },
        Command::SetHovered { id: ghost, hovered: true },
        Command::SetDragging { id: ghost, dragging: true },
        Command::Remove { id: ghost },
        Command::ImageDecoded { id: ghost, payload: payload() },
        Command::ImageDecodeFailed { id: ghost, reason: "x".into() },
    ] {
        assert!(core.apply(command).is_empty());
    }
    assert_eq!(core.snapshot().items(), before.items());
    assert_eq!(core.snapshot().revision(), before.revision());
}

#[test]
fn decode_patch_after_remove_does_not_resurrect() {
    let mut core = engine();
    let actions = core.apply(Command::AddImages { files: vec![file("a.png")] });
    let task = decode_tasks(&actions).remove(0);
    let keep = add_text(&mut core, "keep");
    core.apply(Command::Remove { id: task.id });

    assert!(core.apply(Command::ImageDecoded { id: task.id, payload: payload() }).is_empty());
    let snap = core.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.items()[0].id, keep);
}

#[test]
fn decode_failure_marks_item() {
    let mut core = engine();
    let task = decode_tasks(&core.apply(Command::AddImages { files: vec![file("a.png")] })).remove(0);
    let actions = core.apply(Command::ImageDecodeFailed { id: task.id, reason: "not an image".into() });
    assert_eq!(actions, vec![Action::RenderNeeded]);
    let item = core.snapshot().get(&task.id).cloned().unwrap();
    assert_eq!(item.image().unwrap().status, ImageStatus::Failed { reason: "not an image".into() });
}

#[test]
fn rotate_resize_select_render() {
    let mut core = engine();
    let task = decode_tasks(&core.apply(Command::AddImages { files: vec![file("a.png")] })).remove(0);
    assert_eq!(core.apply(Command::Rotate { id: task.id }), vec![Action::RenderNeeded]);
    assert_eq!(
        core.apply(Command::Resize { id: task.id, width: 120.0, height: 80.0 }),
        vec![Action::RenderNeeded]
    );
    assert_eq!(core.apply(Command::Select { id: Some(task.id) }), vec![Action::RenderNeeded]);
    assert_eq!(core.selection(), Some(task.id));
    assert!(core.apply(Command::Select { id: Some(task.id) }).is_empty());
}

#[test]
fn apply_all_dedupes_render_needed() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    let actions = core.apply_all(vec![
        Command::Rotate { id },
        Command::Rotate { id },
        Command::Move { id, to: pt(8.0, 6.0) },
    ]);
    assert_eq!(actions, vec![Action::RenderNeeded]);
}

#[test]
fn report_follows_store() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    core.apply(Command::Move { id, to: pt(200.0, 150.0) });
    let report = core.report();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].position, Percent::new(25.0, 25.0));
    assert_eq!(report, core.snapshot().report());
}

// =============================================================
// Pointer input: helper drag
// =============================================================

#[test]
fn helper_drag_moves_continuously() {
    let mut core = engine();
    let id = add_text(&mut core, "t");

    let down = core.on_pointer_down(Some(Hit::body(id)), pt(10.0, 10.0), Button::Primary);
    assert!(has_render_needed(&down));
    assert!(core.snapshot().get(&id).unwrap().flags.dragging);

    core.on_pointer_move(pt(210.0, 160.0));
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::new(25.0, 25.0));

    core.on_pointer_move(pt(410.0, 310.0));
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::new(50.0, 50.0));

    core.on_pointer_up(pt(410.0, 310.0));
    assert!(!core.snapshot().get(&id).unwrap().flags.dragging);
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::new(50.0, 50.0));
}

#[test]
fn helper_drag_of_removed_item_is_noop() {
    let mut core = engine();
    let id = add_text(&mut core, "t");
    core.on_pointer_down(Some(Hit::body(id)), pt(0.0, 0.0), Button::Primary);
    core.apply(Command::Remove { id });
    assert!(core.on_pointer_move(pt(50.0, 50.0)).is_empty());
    assert!(core.on_pointer_up(pt(50.0, 50.0)).is_empty());
    assert!(core.snapshot().is_empty());
}

// =============================================================
// Pointer input: native drag
// =============================================================

#[test]
fn native_drag_commits_on_drop() {
    let mut core = native_engine();
    let id = add_text(&mut core, "t");

    core.on_pointer_down(Some(Hit::body(id)), pt(5.0, 5.0), Button::Primary);
    assert_eq!(core.selection(), Some(id));

    core.on_pointer_move(pt(100.0, 100.0));
    assert!(core.snapshot().get(&id).unwrap().flags.dragging);
    assert_eq!(core.snapshot().get(&id).unwrap().position, Percent::default());

    core.on_pointer_up(pt(405.0, 305.0));
    let item = core.snapshot().get(&id).cloned().unwrap();
    assert_eq!(item.position, Percent::new(50.0, 50.0));
    assert!(!item.flags.dragging);
    assert!(item.flags.selected);
}

#[test]
fn native_hover_and_background_click() {
    let mut core = native_engine();
    let a = add_text(&mut core, "a");
    let b = add_text(&mut core, "b");

    core.on_pointer_enter(a);
    assert!(core.snapshot().get(&a).unwrap().flags.hovered);
    core.on_pointer_leave(a);
    assert!(!core.snapshot().get(&a).unwrap().flags.hovered);

    core.on_pointer_down(Some(Hit::body(b)), pt(0.0, 0.0), Button::Primary);
    core.on_pointer_up(pt(0.0, 0.0));
    assert_eq!(core.selection(), Some(b));

    core.on_pointer_down(None, pt(700.0, 500.0), Button::Primary);
    assert_eq!(core.selection(), None);
}

#[test]
fn native_rotate_handle_four_times_returns_to_start() {
    let mut core = native_engine();
    let task = decode_tasks(&core.apply(Command::AddImages { files: vec![file("a.png")] })).remove(0);
    let hit = Hit { item_id: task.id, part: HitPart::RotateHandle };
    for _ in 0..4 {
        core.on_pointer_down(Some(hit), pt(0.0, 0.0), Button::Primary);
        core.on_pointer_up(pt(0.0, 0.0));
    }
    assert_eq!(core.snapshot().get(&task.id).unwrap().rotation.degrees(), 0);
}

#[test]
fn native_resize_handle_resizes_image() {
    let mut core = native_engine();
    let task = decode_tasks(&core.apply(Command::AddImages { files: vec![file("a.png")] })).remove(0);
    core.apply(Command::Resize { id: task.id, width: 100.0, height: 100.0 });

    let hit = Hit { item_id: task.id, part: HitPart::ResizeHandle };
    core.on_pointer_down(Some(hit), pt(100.0, 100.0), Button::Primary);
    core.on_pointer_move(pt(150.0, 130.0));
    core.on_pointer_up(pt(150.0, 130.0));

    let size = core.snapshot().get(&task.id).unwrap().size;
    assert_eq!((size.width, size.height), (150.0, 130.0));
}

// =============================================================
// Pointer input: overlapping presses
// =============================================================

#[test]
fn second_press_never_leaves_first_item_dragging() {
    for mut core in [engine(), native_engine()] {
        let a = add_text(&mut core, "a");
        let b = add_text(&mut core, "b");

        core.on_pointer_down(Some(Hit::body(a)), pt(0.0, 0.0), Button::Primary);
        core.on_pointer_move(pt(20.0, 20.0));
        core.on_pointer_down(Some(Hit::body(b)), pt(0.0, 0.0), Button::Primary);
        core.on_pointer_move(pt(40.0, 40.0));
        core.on_pointer_up(pt(40.0, 40.0));

        let snap = core.snapshot();
        assert!(!snap.get(&a).unwrap().flags.dragging, "{:?}", core.interaction().kind());
        assert!(!snap.get(&b).unwrap().flags.dragging, "{:?}", core.interaction().kind());
        assert_eq!(core.interaction().gesture(), &crate::input::Gesture::Idle);
    }
}

#[test]
fn native_press_on_unknown_item_does_not_keep_resizing() {
    let mut core = native_engine();
    let task = decode_tasks(&core.apply(Command::AddImages { files: vec![file("a.png")] })).remove(0);
    core.apply(Command::Resize { id: task.id, width: 100.0, height: 100.0 });

    let handle = Hit { item_id: task.id, part: HitPart::ResizeHandle };
    core.on_pointer_down(Some(handle), pt(100.0, 100.0), Button::Primary);
    core.on_pointer_down(Some(Hit::body(Uuid::now_v7())), pt(0.0, 0.0), Button::Primary);
    core.on_pointer_move(pt(200.0, 100.0));

    let size = core.snapshot().get(&task.id).unwrap().size;
    assert_eq!((size.width, size.height), (100.0, 100.0));
}
