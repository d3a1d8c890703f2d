use super::*;
use crate::foundation::color::Color;
use crate::model::field::FieldBox;
use crate::render::plan::compile_record;
use crate::test_support::surface::{DrawCall, RecordingSurface, StubShaper};
use crate::text::rich::{RichText, Span};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

fn single(text: &str) -> (Template, Record) {
    let t = Template::with_columns(["a"]);
    let r: Record = [("a", text)].into_iter().collect();
    (t, r)
}

fn run(t: &Template, r: &Record) -> Vec<DrawCall> {
    let mut shaper = StubShaper::new();
    let surface = Surface::new(800, 600);
    let plan = compile_record(t, r, surface, &mut shaper).unwrap();
    let mut target = RecordingSurface::new(surface);
    execute_plan(&plan, &BackgroundImage::solid(Color::WHITE), &mut shaper, &mut target).unwrap();
    target.calls
}

fn kinds(calls: &[DrawCall]) -> Vec<&'static str> {
    calls
        .iter()
        .map(|c| match c {
            DrawCall::Background => "background",
            DrawCall::Transform(_) => "transform",
            DrawCall::Shadow(true) => "shadow-on",
            DrawCall::Shadow(false) => "shadow-off",
            DrawCall::Stroke { .. } => "stroke",
            DrawCall::Fill { .. } => "fill",
            DrawCall::Rect { .. } => "rect",
        })
        .collect()
}

#[test]
fn effects_are_drawn_shadow_stroke_fill_decoration() {
    let (mut t, r) = single("Hi there");
    {
        let s = t.style_mut("a").unwrap();
        s.stroke.enabled = true;
        s.shadow.enabled = true;
        s.text_decoration = TextDecoration::Underline;
    }
    let calls = run(&t, &r);
    assert_eq!(
        kinds(&calls),
        vec![
            "background",
            "transform",
            "shadow-on",
            "stroke",
            "fill",
            "rect",
            "shadow-off",
            "transform"
        ]
    );
    assert_eq!(calls.last(), Some(&DrawCall::Transform(Affine::IDENTITY)));
}

#[test]
fn plain_fields_skip_shadow_toggles() {
    let (t, r) = single("Hi");
    assert_eq!(
        kinds(&run(&t, &r)),
        vec!["background", "transform", "fill", "transform"]
    );
}

#[test]
fn blank_records_only_draw_the_background() {
    let (t, r) = single("  ");
    assert_eq!(kinds(&run(&t, &r)), vec!["background", "transform"]);
}

#[test]
fn baseline_is_centred_in_the_line_box() {
    let (t, r) = single("Hi");
    let calls = run(&t, &r);
    let Some(DrawCall::Fill { origin, glyphs, .. }) =
        calls.iter().find(|c| matches!(c, DrawCall::Fill { .. }))
    else {
        panic!("no fill in {calls:?}");
    };
    // 32px font, 38.4px line box, ascent 25.6 and descent 6.4: half-leading 3.2
    assert!(close(origin.x, 8.0));
    assert!(close(origin.y, 8.0 + 3.2 + 25.6), "{origin:?}");
    assert_eq!(*glyphs, 2);
}

#[test]
fn rich_segments_fill_with_their_own_colors() {
    let mut t = Template::with_columns(["a"]);
    t.set_box("a", FieldBox::new(0.0, 0.0, 50.0, 20.0)).unwrap();
    let mut r = Record::new();
    let red = Color::rgb(255, 0, 0);
    r.insert(
        "a",
        RichText::new(vec![
            Span::plain("ab "),
            Span {
                text: "cd".into(),
                color: Some(red),
                underline: true,
                ..Span::default()
            },
        ]),
    );
    let calls = run(&t, &r);
    let fills: Vec<(Point, Color)> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Fill { origin, color, .. } => Some((*origin, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(fills.len(), 2);
    assert_eq!(fills[0].1, Color::BLACK);
    assert_eq!(fills[1].1, red);
    // "ab " is three 16px chars
    assert!(close(fills[1].0.x - fills[0].0.x, 48.0));

    let rects: Vec<Color> = calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Rect { color, .. } => Some(*color),
            _ => None,
        })
        .collect();
    assert_eq!(rects, vec![red]);
}

#[test]
fn failed_draws_still_clear_the_shadow() {
    let (mut t, r) = single("Hi");
    t.style_mut("a").unwrap().shadow.enabled = true;
    let mut shaper = StubShaper::new();
    let surface = Surface::new(800, 600);
    let plan = compile_record(&t, &r, surface, &mut shaper).unwrap();
    let mut target = RecordingSurface::new(surface);
    target.fail_fills = true;
    let field = &plan.fields[0];
    assert!(render_line(&mut target, &mut shaper, field, &field.lines[0]).is_err());
    assert_eq!(target.calls.last(), Some(&DrawCall::Shadow(false)));
}

#[test]
fn decoration_bars_sit_below_or_through_the_baseline() {
    let under = decoration_rect(TextDecoration::Underline, 5.0, 40.0, 100.0, 30.0);
    assert!(close(under.x0, 5.0) && close(under.x1, 45.0));
    assert!(close(under.y0, 102.0) && close(under.y1, 104.0));

    let through = decoration_rect(TextDecoration::LineThrough, 0.0, 10.0, 100.0, 30.0);
    assert!(close(through.y0, 90.0) && close(through.y1, 92.0));

    let tiny = decoration_rect(TextDecoration::Underline, 0.0, 10.0, 0.0, 6.0);
    assert!(close(tiny.height(), 1.0));
}
