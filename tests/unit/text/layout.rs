use super::*;
use crate::test_support::measure::FixedAdvance;
use crate::text::measure::FontSpec;
use crate::text::wrap::wrap_text;

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn scale_factor_follows_surface_ratio() {
    let s = compute_scale_factor(Surface::new(800, 600), Surface::new(1600, 900));
    approx(s.x, 2.0);
    approx(s.y, 1.5);
    approx(s.text(), 2.0);

    let degenerate = compute_scale_factor(Surface::new(0, 0), Surface::new(10, 10));
    approx(degenerate.x, 10.0);
}

#[test]
fn scaled_render_matches_editor_layout() {
    // 32px at 800x600 rendered at 1600x1200: 64px font, 76.8px lines, same breaks
    let style = FieldStyle::default();
    let scale = compute_scale_factor(Surface::new(800, 600), Surface::new(1600, 1200));
    approx(line_height(&style, scale), 76.8);

    let editor = FontSpec::from_style(&style, 1.0);
    let output = FontSpec::from_style(&style, scale.text());
    assert_eq!(output.size_px, 64.0);

    let text = "Grand Opening Celebration this Saturday";
    let mut m = FixedAdvance::new();
    let editor_width = 240.0 - 2.0 * BOX_PADDING_PX;
    let output_width = 480.0 - 2.0 * box_padding(scale);
    let a = wrap_text(text, editor_width as f32, &editor, &mut m).unwrap();
    let b = wrap_text(text, output_width as f32, &output, &mut m).unwrap();
    assert_eq!(a, b);
    assert!(a.len() > 1);
}

#[test]
fn content_rect_subtracts_padding_and_never_inverts() {
    let r = content_rect(100.0, 50.0, ScaleFactor::IDENTITY);
    assert_eq!(r, Rect::new(8.0, 8.0, 92.0, 42.0));

    let thin = content_rect(10.0, 4.0, ScaleFactor::IDENTITY);
    approx(thin.width(), 0.0);
    approx(thin.height(), 0.0);
    approx(thin.x0, 5.0);
}

#[test]
fn horizontal_alignment_uses_content_width() {
    let content = Rect::new(8.0, 8.0, 108.0, 58.0);
    let widths = [40.0, 100.0];
    let left = layout_block(&widths, content, TextAlign::Left, VerticalAlign::Top, 10.0);
    approx(left.lines[0].x, 8.0);

    let center = layout_block(&widths, content, TextAlign::Center, VerticalAlign::Top, 10.0);
    approx(center.lines[0].x, 38.0);
    approx(center.lines[1].x, 8.0);

    let right = layout_block(&widths, content, TextAlign::Right, VerticalAlign::Top, 10.0);
    approx(right.lines[0].x, 68.0);
}

#[test]
fn vertical_alignment_places_the_block() {
    let content = Rect::new(0.0, 0.0, 100.0, 100.0);
    let widths = [10.0, 10.0, 10.0];

    let top = layout_block(&widths, content, TextAlign::Left, VerticalAlign::Top, 20.0);
    approx(top.total_height, 60.0);
    approx(top.lines[0].top, 0.0);
    approx(top.lines[2].top, 40.0);

    let middle = layout_block(&widths, content, TextAlign::Left, VerticalAlign::Middle, 20.0);
    approx(middle.lines[0].top, 20.0);

    let bottom = layout_block(&widths, content, TextAlign::Left, VerticalAlign::Bottom, 20.0);
    approx(bottom.lines[0].top, 40.0);
    approx(bottom.lines[2].top + 20.0, 100.0);
}

#[test]
fn overflowing_block_is_not_clipped() {
    let content = Rect::new(0.0, 0.0, 50.0, 30.0);
    let block = layout_block(
        &[80.0, 10.0, 10.0],
        content,
        TextAlign::Center,
        VerticalAlign::Middle,
        20.0,
    );
    assert_eq!(block.lines.len(), 3);
    approx(block.lines[0].x, -15.0);
    approx(block.lines[0].top, -15.0);
}

#[test]
fn baseline_centres_font_extent() {
    approx(baseline_offset(20.0, 12.0, 4.0), 14.0);
    approx(baseline_offset(16.0, 12.0, 4.0), 12.0);
}
