use crate::foundation::core::{Affine, Point, Rect, Surface};
use crate::foundation::error::FieldcastResult;
use crate::model::field::TextDecoration;
use crate::model::record::Record;
use crate::model::template::Template;
use crate::render::cpu::CpuSurface;
use crate::render::frame::{BackgroundImage, FrameRGBA, RenderOpts};
use crate::render::plan::{FieldPlan, PlannedLine, PlannedSegment, RecordPlan, compile_record};
use crate::render::surface::DrawSurface;
use crate::text::fonts::{ShapedLine, TextShaper};
use crate::text::layout::baseline_offset;

/// Render one record over `background` at `surface` size with default options.
pub fn render_record<T: TextShaper + ?Sized>(
    background: &BackgroundImage,
    surface: Surface,
    template: &Template,
    record: &Record,
    fonts: &mut T,
) -> FieldcastResult<FrameRGBA> {
    render_record_with(
        background,
        surface,
        template,
        record,
        fonts,
        &RenderOpts::default(),
    )
}

/// Render one record with explicit [`RenderOpts`].
///
/// The frame is produced from scratch: nothing from a previous call is reused.
#[tracing::instrument(skip_all, fields(width = surface.width, height = surface.height))]
pub fn render_record_with<T: TextShaper + ?Sized>(
    background: &BackgroundImage,
    surface: Surface,
    template: &Template,
    record: &Record,
    fonts: &mut T,
    opts: &RenderOpts,
) -> FieldcastResult<FrameRGBA> {
    let plan = compile_record(template, record, surface, fonts)?;
    let mut target = CpuSurface::new(surface, opts)?;
    execute_plan(&plan, background, fonts, &mut target)?;
    target.into_frame()
}

/// Draw a compiled plan: background first, then fields in plan order.
pub fn execute_plan<S, T>(
    plan: &RecordPlan,
    background: &BackgroundImage,
    shaper: &mut T,
    target: &mut S,
) -> FieldcastResult<()>
where
    S: DrawSurface + ?Sized,
    T: TextShaper + ?Sized,
{
    target.draw_background(background)?;
    for field in &plan.fields {
        target.set_transform(field.transform());
        for line in &field.lines {
            render_line(target, shaper, field, line)?;
        }
    }
    target.set_transform(Affine::IDENTITY);
    tracing::debug!(fields = plan.fields.len(), "plan executed");
    Ok(())
}

/// Draw one line: shadow on, outline, fill, decorations, shadow off.
///
/// The shadow is switched off again even when a draw fails.
pub fn render_line<S, T>(
    target: &mut S,
    shaper: &mut T,
    field: &FieldPlan,
    line: &PlannedLine,
) -> FieldcastResult<()>
where
    S: DrawSurface + ?Sized,
    T: TextShaper + ?Sized,
{
    let mut shaped = Vec::with_capacity(line.segments.len());
    for seg in &line.segments {
        if seg.text.is_empty() {
            continue;
        }
        shaped.push((seg, shaper.shape_line(&seg.text, &seg.font)?));
    }
    if shaped.is_empty() {
        return Ok(());
    }

    let ascent = shaped.iter().fold(0.0f32, |m, (_, s)| m.max(s.ascent));
    let descent = shaped.iter().fold(0.0f32, |m, (_, s)| m.max(s.descent));
    let baseline = line.top
        + baseline_offset(field.line_height, f64::from(ascent), f64::from(descent));

    let Some(shadow) = field.shadow else {
        return draw_line_body(target, field, line, &shaped, baseline);
    };
    target.set_shadow(Some(shadow))?;
    let drawn = draw_line_body(target, field, line, &shaped, baseline);
    let cleared = target.set_shadow(None);
    drawn.and(cleared)
}

fn draw_line_body<S: DrawSurface + ?Sized>(
    target: &mut S,
    field: &FieldPlan,
    line: &PlannedLine,
    shaped: &[(&PlannedSegment, ShapedLine)],
    baseline: f64,
) -> FieldcastResult<()> {
    if let Some(stroke) = field.stroke {
        for (seg, glyphs) in shaped {
            let origin = Point::new(line.x + seg.x_offset, baseline);
            target.stroke_line(glyphs, origin, stroke.color, stroke.width)?;
        }
    }
    for (seg, glyphs) in shaped {
        let origin = Point::new(line.x + seg.x_offset, baseline);
        target.fill_line(glyphs, origin, seg.color)?;
    }
    for (seg, _) in shaped {
        let x = line.x + seg.x_offset;
        let size = f64::from(seg.font.size_px);
        if seg.underline || field.decoration == TextDecoration::Underline {
            let r = decoration_rect(TextDecoration::Underline, x, seg.width, baseline, size);
            target.fill_rect(r, seg.color)?;
        }
        if field.decoration == TextDecoration::LineThrough {
            let r = decoration_rect(TextDecoration::LineThrough, x, seg.width, baseline, size);
            target.fill_rect(r, seg.color)?;
        }
    }
    Ok(())
}

/// Rectangle of an underline or strike-through bar for a run starting at `x`.
pub fn decoration_rect(
    decoration: TextDecoration,
    x: f64,
    width: f64,
    baseline: f64,
    font_size: f64,
) -> Rect {
    let thickness = (font_size / 15.0).max(1.0);
    let center = match decoration {
        TextDecoration::LineThrough => baseline - font_size * 0.3,
        _ => baseline + font_size * 0.1,
    };
    Rect::new(
        x,
        center - thickness / 2.0,
        x + width,
        center + thickness / 2.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/orchestrator.rs"]
mod tests;
