use super::*;
use crate::geometry::interaction::Interaction;
use crate::model::field::{FieldBox, TextAlign};
use crate::test_support::measure::FixedAdvance;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// title: px x 80..320, y 60..120 on 800x600, centre (200, 90)
fn adapter() -> PreviewAdapter {
    let t = Template::with_columns(["title", "subtitle"]);
    PreviewAdapter::new(t, Surface::new(800, 600))
}

#[test]
fn body_hits_prefer_the_latest_column() {
    let mut a = adapter();
    let over = FieldBox::new(10.0, 10.0, 30.0, 10.0);
    let mut t = a.template().clone();
    t.set_box("subtitle", over).unwrap();
    a = PreviewAdapter::new(t, Surface::new(800, 600));

    let hit = a.hit_test(Point::new(200.0, 90.0)).unwrap();
    assert_eq!(hit.field, "subtitle");
    assert_eq!(hit.target, HitTarget::Body);
    assert!(a.hit_test(Point::new(700.0, 500.0)).is_none());
}

#[test]
fn handles_and_knob_only_on_selected_fields() {
    let mut a = adapter();
    let corner = Point::new(320.0, 120.0);
    let knob = Point::new(200.0, 36.0);
    assert_eq!(a.hit_test(corner).unwrap().target, HitTarget::Body);
    assert!(a.hit_test(knob).is_none());

    a.select(Some("title"));
    assert_eq!(
        a.hit_test(corner).unwrap().target,
        HitTarget::Handle(Handle::Se)
    );
    assert_eq!(
        a.hit_test(Point::new(325.0, 124.0)).unwrap().target,
        HitTarget::Handle(Handle::Se)
    );
    assert_eq!(a.hit_test(knob).unwrap().target, HitTarget::RotateKnob);
}

#[test]
fn hit_testing_follows_rotation() {
    let mut t = Template::with_columns(["title"]);
    t.set_box(
        "title",
        FieldBox::new(10.0, 10.0, 30.0, 10.0).with_rotation(90.0),
    )
    .unwrap();
    let mut a = PreviewAdapter::new(t, Surface::new(800, 600));
    a.select(Some("title"));

    // rotated a quarter turn the box spans x 170..230, y -30..210 and the knob sits to the right
    let knob = rotate_knob_point(&transform::to_pixels(
        a.template().field_box("title").unwrap(),
        a.surface(),
    ));
    assert!(close(knob.x, 254.0) && close(knob.y, 90.0), "{knob:?}");
    assert_eq!(
        a.hit_test(Point::new(254.0, 90.0)).unwrap().target,
        HitTarget::RotateKnob
    );
    assert_eq!(
        a.hit_test(Point::new(200.0, 180.0)).unwrap().target,
        HitTarget::Body
    );
    assert!(a.hit_test(Point::new(300.0, 90.0)).is_none());
}

#[test]
fn drag_updates_live_box_and_commits_on_release() {
    let mut a = adapter();
    let hit = a.pointer_down(Point::new(200.0, 90.0)).unwrap();
    assert_eq!(hit.target, HitTarget::Body);
    assert_eq!(a.selection(), ["title".to_string()]);
    assert!(matches!(a.interaction().state(), Interaction::Dragging(_)));

    let update = a.pointer_move(Point::new(240.0, 90.0)).unwrap().unwrap();
    assert!(close(update.field_box.x, 15.0));
    assert!(close(a.template().field_box("title").unwrap().x, 15.0));
    let live = a.boxes();
    assert!(live[0].active && live[0].selected);
    assert!(!live[1].active && !live[1].selected);

    // moves recompute from the pointer-down snapshot
    a.pointer_move(Point::new(280.0, 90.0)).unwrap();
    a.pointer_move(Point::new(240.0, 150.0)).unwrap();
    let b = a.template().field_box("title").unwrap();
    assert!(close(b.x, 15.0) && close(b.y, 20.0));

    let done = a.pointer_up(Point::new(240.0, 150.0)).unwrap().unwrap();
    assert_eq!(done.field, "title");
    assert!(!a.interaction().is_active());
    assert!(a.boxes().iter().all(|n| !n.active));
}

#[test]
fn cancel_restores_the_pointer_down_box() {
    let mut a = adapter();
    let before = *a.template().field_box("title").unwrap();
    a.pointer_down(Point::new(200.0, 90.0)).unwrap();
    a.pointer_move(Point::new(400.0, 300.0)).unwrap();
    assert_ne!(*a.template().field_box("title").unwrap(), before);

    let restored = a.cancel().unwrap().unwrap();
    assert_eq!(restored.field_box, before);
    assert_eq!(*a.template().field_box("title").unwrap(), before);
    assert!(a.cancel().unwrap().is_none());
}

#[test]
fn resize_from_a_handle_keeps_the_opposite_corner() {
    let mut a = adapter();
    a.select(Some("title"));
    let hit = a.pointer_down(Point::new(320.0, 120.0)).unwrap();
    assert_eq!(hit.target, HitTarget::Handle(Handle::Se));
    a.pointer_up(Point::new(360.0, 150.0)).unwrap();
    let b = a.template().field_box("title").unwrap();
    assert!(close(b.x, 10.0) && close(b.y, 10.0));
    assert!(close(b.width, 35.0) && close(b.height, 15.0));
}

#[test]
fn missing_the_fields_clears_the_selection() {
    let mut a = adapter();
    a.select(Some("title"));
    assert!(a.pointer_down(Point::new(700.0, 550.0)).is_none());
    assert!(a.selection().is_empty());
    assert!(a.pointer_move(Point::new(710.0, 550.0)).unwrap().is_none());
}

#[test]
fn selection_edits_apply_to_every_selected_field() {
    let mut a = adapter();
    a.toggle_select("title");
    a.toggle_select("subtitle");
    a.toggle_select("nope");
    assert_eq!(a.selection().len(), 2);

    let n = a.apply_style(&StyleEdit::TextAlign(TextAlign::Center)).unwrap();
    assert_eq!(n, 2);
    for name in ["title", "subtitle"] {
        assert_eq!(
            a.template().field_style(name).unwrap().text_align,
            TextAlign::Center
        );
    }

    a.toggle_select("title");
    assert_eq!(a.selection(), ["subtitle".to_string()]);
    assert!(a.apply_style(&StyleEdit::FontSize(-1.0)).is_err());
}

#[test]
fn removed_columns_leave_the_selection_and_gesture() {
    let mut a = adapter();
    a.pointer_down(Point::new(200.0, 90.0)).unwrap();
    a.sync_columns(["subtitle"]);
    assert!(a.selection().is_empty());
    assert!(!a.interaction().is_active());
    assert_eq!(a.boxes().len(), 1);
}

#[test]
fn nodes_match_the_render_plan() {
    let mut a = adapter();
    a.select(Some("subtitle"));
    let record: Record = [
        ("title", "A rather long headline that has to wrap"),
        ("subtitle", "short"),
    ]
    .into_iter()
    .collect();

    let mut m = FixedAdvance::new();
    let nodes = a.nodes(&record, &mut m).unwrap();
    let plan = compile_record(a.template(), &record, a.surface(), &mut m).unwrap();
    let planned: Vec<&FieldPlan> = plan.fields.iter().collect();
    let shown: Vec<&FieldPlan> = nodes.iter().map(|n| &n.plan).collect();
    assert_eq!(shown, planned);
    assert!(nodes[0].plan.lines.len() > 1);
    assert!(!nodes[0].selected && nodes[1].selected);
}

#[test]
fn preview_and_output_break_lines_identically() {
    let a = PreviewAdapter::new(Template::with_columns(["title"]), Surface::new(400, 300));
    let record: Record = [("title", "A rather long headline that has to wrap")]
        .into_iter()
        .collect();
    let mut m = FixedAdvance::new();
    let preview = a.nodes(&record, &mut m).unwrap();
    let output = compile_record(a.template(), &record, Surface::new(1600, 1200), &mut m).unwrap();

    let lines = |f: &FieldPlan| f.lines.iter().map(|l| l.text()).collect::<Vec<_>>();
    assert_eq!(lines(&preview[0].plan), lines(&output.fields[0]));
    assert!(close(
        preview[0].plan.line_height * 4.0,
        output.fields[0].line_height
    ));
}

#[test]
fn snapshots_do_not_follow_later_edits() {
    let mut a = adapter();
    let snap = a.snapshot();
    a.pointer_down(Point::new(200.0, 90.0)).unwrap();
    a.pointer_up(Point::new(280.0, 90.0)).unwrap();
    assert!(close(snap.field_box("title").unwrap().x, 10.0));
    assert!(close(a.template().field_box("title").unwrap().x, 20.0));
}
