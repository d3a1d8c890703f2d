use super::*;
use crate::test_support::measure::{FixedAdvance, font};
use crate::text::wrap::wrap_text;

#[test]
fn unstyled_rich_text_wraps_like_plain_text() {
    let f = font(10.0);
    let mut m = FixedAdvance::new();
    let text = "alpha beta gamma delta epsilon";
    let rich = RichText::new(vec![Span::plain(text)]);
    for max in [40.0f32, 80.0, 120.0] {
        let plain = wrap_text(text, max, &f, &mut m).unwrap();
        let lines: Vec<String> = wrap_rich(&rich, max, &f, &mut m)
            .unwrap()
            .iter()
            .map(RichLine::text)
            .collect();
        assert_eq!(plain, lines);
    }
}

#[test]
fn words_can_cross_span_boundaries() {
    let f = font(10.0);
    let mut m = FixedAdvance::new();
    let rich = RichText::new(vec![Span::bold("Hel"), Span::plain("lo world")]);
    let lines = wrap_rich(&rich, 1000.0, &f, &mut m).unwrap();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert_eq!(line.text(), "Hello world");
    assert_eq!(line.segments.len(), 2);
    assert!(line.segments[0].style.bold);
    assert_eq!(line.segments[1].text, "lo world");
}

#[test]
fn bold_segments_measure_wider_and_break_earlier() {
    let f = font(10.0);
    let mut m = FixedAdvance::new();
    // plain "aaaa bbbb" is 45px; with bold "bbbb" (25px) the line is 50px
    let plain = RichText::new(vec![Span::plain("aaaa bbbb")]);
    assert_eq!(wrap_rich(&plain, 45.0, &f, &mut m).unwrap().len(), 1);

    let mixed = RichText::new(vec![Span::plain("aaaa "), Span::bold("bbbb")]);
    let lines = wrap_rich(&mixed, 45.0, &f, &mut m).unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].text(), "bbbb");
    assert_eq!(lines[1].width, 25.0);
}

#[test]
fn hard_breaks_and_blank_input() {
    let f = font(10.0);
    let mut m = FixedAdvance::new();
    let rich = RichText::new(vec![Span::plain("a\n\nb\n")]);
    let lines: Vec<String> = wrap_rich(&rich, 1000.0, &f, &mut m)
        .unwrap()
        .iter()
        .map(RichLine::text)
        .collect();
    assert_eq!(lines, vec!["a", "", "b"]);

    let blank = RichText::new(vec![Span::plain("  "), Span::bold("\n")]);
    assert!(wrap_rich(&blank, 10.0, &f, &mut m).unwrap().is_empty());
}
