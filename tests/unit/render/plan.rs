use super::*;
use crate::foundation::core::Point;
use crate::model::field::{TextAlign, VerticalAlign};
use crate::test_support::measure::FixedAdvance;
use crate::text::rich::{RichText, Span};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn template() -> Template {
    let mut t = Template::with_columns(["title", "subtitle", "hidden", "blank"]);
    t.set_box("title", FieldBox::new(10.0, 10.0, 30.0, 20.0))
        .unwrap();
    let mut hidden = *t.field_box("hidden").unwrap();
    hidden.visible = false;
    t.set_box("hidden", hidden).unwrap();
    t
}

fn record() -> Record {
    [
        ("title", "Grand Opening Celebration this Saturday"),
        ("subtitle", "Downtown"),
        ("hidden", "never drawn"),
        ("blank", "   "),
        ("unknown", "not a column"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn only_drawable_fields_are_planned_in_column_order() {
    let mut m = FixedAdvance::new();
    let plan = compile_record(&template(), &record(), Surface::new(800, 600), &mut m).unwrap();
    let names: Vec<&str> = plan.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["title", "subtitle"]);
}

#[test]
fn missing_style_is_skipped_not_an_error() {
    let mut t = template();
    t.field_styles.remove("subtitle");
    let mut m = FixedAdvance::new();
    let plan = compile_record(&t, &record(), Surface::new(800, 600), &mut m).unwrap();
    assert_eq!(plan.fields.len(), 1);
}

#[test]
fn scaled_surfaces_produce_similar_layouts() {
    let t = template();
    let r = record();
    let mut m = FixedAdvance::new();
    let small = compile_record(&t, &r, Surface::new(800, 600), &mut m).unwrap();
    let large = compile_record(&t, &r, Surface::new(1600, 1200), &mut m).unwrap();

    for (a, b) in small.fields.iter().zip(&large.fields) {
        assert!(close(a.rect.width * 2.0, b.rect.width));
        assert!(close(a.rect.center.x * 2.0, b.rect.center.x));
        assert!(close(a.line_height * 2.0, b.line_height));
        assert_eq!(a.font.size_px * 2.0, b.font.size_px);
        let ta: Vec<String> = a.lines.iter().map(PlannedLine::text).collect();
        let tb: Vec<String> = b.lines.iter().map(PlannedLine::text).collect();
        assert_eq!(ta, tb);
        for (la, lb) in a.lines.iter().zip(&b.lines) {
            assert!(close(la.x * 2.0, lb.x));
            assert!(close(la.top * 2.0, lb.top));
        }
    }
    assert!(small.fields[0].lines.len() > 1);
}

#[test]
fn lines_are_wrapped_to_the_padded_content_width() {
    let mut m = FixedAdvance::new();
    let plan = compile_record(&template(), &record(), Surface::new(800, 600), &mut m).unwrap();
    let title = &plan.fields[0];
    // 30% of 800 = 240px box, 224px of content, 16px per char
    assert!(close(title.content.width(), 224.0));
    for line in &title.lines {
        assert!(line.width <= 224.0 || !line.text().contains(' '));
        assert!(close(line.x, 8.0));
    }
    assert!(close(title.lines[0].top, 8.0));
    assert!(close(title.lines[1].top - title.lines[0].top, 32.0 * 1.2));
}

#[test]
fn alignment_and_effects_are_scaled() {
    let mut t = template();
    {
        let s = t.style_mut("subtitle").unwrap();
        s.text_align = TextAlign::Right;
        s.vertical_align = VerticalAlign::Bottom;
        s.stroke.enabled = true;
        s.stroke.width = 3.0;
        s.shadow.enabled = true;
        s.shadow.offset_x = 2.0;
        s.shadow.offset_y = 4.0;
    }
    let mut m = FixedAdvance::new();
    let plan = compile_record(&t, &record(), Surface::new(1600, 900), &mut m).unwrap();
    let f = &plan.fields[1];
    let line = &f.lines[0];
    assert!(close(line.x + line.width, f.content.x1));
    assert!(close(line.top + f.line_height, f.content.y1));

    let stroke = f.stroke.unwrap();
    assert!(close(stroke.width, 6.0));
    let shadow = f.shadow.unwrap();
    assert!(close(shadow.offset.x, 4.0));
    assert!(close(shadow.offset.y, 6.0));
    assert!(close(shadow.blur, 8.0));
    assert!(plan.fields[0].stroke.is_none() && plan.fields[0].shadow.is_none());
}

#[test]
fn rich_values_keep_their_inline_styles() {
    let t = Template::with_columns(["name"]);
    let mut r = Record::new();
    let red = Color::rgb(255, 0, 0);
    r.insert(
        "name",
        RichText::new(vec![
            Span::bold("Dr."),
            Span {
                text: " Ada".into(),
                color: Some(red),
                underline: true,
                ..Span::default()
            },
        ]),
    );
    let mut m = FixedAdvance::new();
    let plan = compile_record(&t, &r, Surface::new(800, 600), &mut m).unwrap();
    let line = &plan.fields[0].lines[0];
    assert_eq!(line.text(), "Dr. Ada");
    assert_eq!(line.segments.len(), 2);
    assert_eq!(line.segments[0].font.weight, 700);
    assert_eq!(line.segments[0].color, Color::BLACK);
    assert_eq!(line.segments[1].color, red);
    assert!(line.segments[1].underline);
    assert!(close(line.segments[1].x_offset, line.segments[0].width));
    assert!(close(line.width, line.segments[0].width + line.segments[1].width));
}

#[test]
fn field_transform_rotates_about_the_centre() {
    let mut t = Template::with_columns(["a"]);
    t.set_box("a", FieldBox::new(40.0, 40.0, 20.0, 20.0).with_rotation(90.0))
        .unwrap();
    let r: Record = [("a", "x")].into_iter().collect();
    let mut m = FixedAdvance::new();
    let plan = compile_record(&t, &r, Surface::new(100, 100), &mut m).unwrap();
    let tr = plan.fields[0].transform();
    let nw = tr * Point::new(0.0, 0.0);
    // the unrotated top-left corner ends up top-right after a quarter turn
    assert!(close(nw.x, 60.0) && close(nw.y, 40.0), "{nw:?}");
    let c = tr * Point::new(10.0, 10.0);
    assert!(close(c.x, 50.0) && close(c.y, 50.0));
}

#[test]
fn measurement_errors_abort_compilation() {
    let mut m = FixedAdvance::only_families(&["Other"]);
    let err = compile_record(&template(), &record(), Surface::new(800, 600), &mut m).unwrap_err();
    assert!(err.is_precondition());
}
