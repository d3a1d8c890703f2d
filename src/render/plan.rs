//! Backend-agnostic layout of one record: where every field goes and which lines it draws.
//!
//! Both the rasterizer and the interactive preview consume a [`RecordPlan`], so they cannot
//! disagree on line breaks, alignment or effective size.

use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Rect, Surface, Vec2};
use crate::foundation::error::FieldcastResult;
use crate::geometry::transform::{self, PixelRect};
use crate::model::field::{FieldBox, FieldStyle, TextDecoration};
use crate::model::record::{FieldValue, Record};
use crate::model::template::Template;
use crate::text::layout::{
    ScaleFactor, compute_scale_factor, content_rect, layout_block, line_height,
};
use crate::text::measure::{FontSpec, TextMeasure};
use crate::text::rich::wrap_rich;
use crate::text::wrap::wrap_text;

/// Outline paint in output pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePaint {
    /// Outline color.
    pub color: Color,
    /// Outline width in pixels.
    pub width: f64,
}

/// Drop shadow paint in output pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowPaint {
    /// Shadow color.
    pub color: Color,
    /// Blur amount (canvas `shadowBlur` semantics).
    pub blur: f64,
    /// Screen-space offset, unaffected by field rotation.
    pub offset: Vec2,
}

/// Run of same-style text on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedSegment {
    /// Text to draw.
    pub text: String,
    /// Face and size.
    pub font: FontSpec,
    /// Fill color.
    pub color: Color,
    /// Underlined by inline formatting.
    pub underline: bool,
    /// Offset from the line's x.
    pub x_offset: f64,
    /// Measured advance.
    pub width: f64,
}

/// Positioned line in box-local coordinates (origin at the unrotated box's top-left).
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedLine {
    /// Left edge.
    pub x: f64,
    /// Top of the line box.
    pub top: f64,
    /// Total advance.
    pub width: f64,
    /// Segments in reading order.
    pub segments: Vec<PlannedSegment>,
}

impl PlannedLine {
    /// Line text without formatting.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Everything needed to draw one field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldPlan {
    /// Column name.
    pub name: String,
    /// Box in output pixels.
    pub rect: PixelRect,
    /// Base font (scaled).
    pub font: FontSpec,
    /// Base fill color.
    pub color: Color,
    /// Field-wide decoration.
    pub decoration: TextDecoration,
    /// Line box height in pixels.
    pub line_height: f64,
    /// Text area, box-local.
    pub content: Rect,
    /// Wrapped and aligned lines.
    pub lines: Vec<PlannedLine>,
    /// Outline, when enabled.
    pub stroke: Option<StrokePaint>,
    /// Shadow, when enabled.
    pub shadow: Option<ShadowPaint>,
}

impl FieldPlan {
    /// Box-local to surface transform: rotation about the box centre.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.rect.center.to_vec2())
            * Affine::rotate(self.rect.rotation_deg.to_radians())
            * Affine::translate(Vec2::new(-self.rect.width / 2.0, -self.rect.height / 2.0))
    }
}

/// Layout of one record on one surface.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordPlan {
    /// Output surface.
    pub surface: Surface,
    /// Reference-to-output scale.
    pub scale: ScaleFactor,
    /// Fields in column order.
    pub fields: Vec<FieldPlan>,
}

/// Lay out every drawable field of `record`.
///
/// Fields are visited in column order. A field is skipped when its value is missing or blank,
/// its box is hidden, or its box or style is missing from the template.
pub fn compile_record<M: TextMeasure + ?Sized>(
    template: &Template,
    record: &Record,
    surface: Surface,
    measure: &mut M,
) -> FieldcastResult<RecordPlan> {
    let scale = compute_scale_factor(template.reference_surface, surface);
    let mut fields = Vec::new();

    for name in &template.columns {
        let Some(value) = record.get(name) else {
            continue;
        };
        if value.is_blank() {
            continue;
        }
        let (Some(field_box), Some(style)) = (template.field_box(name), template.field_style(name))
        else {
            tracing::debug!(field = %name, "skipping field without box or style");
            continue;
        };
        if !field_box.visible {
            continue;
        }
        fields.push(compile_field(
            name, field_box, style, value, surface, scale, measure,
        )?);
    }

    Ok(RecordPlan {
        surface,
        scale,
        fields,
    })
}

/// Lay out a single field.
pub fn compile_field<M: TextMeasure + ?Sized>(
    name: &str,
    field_box: &FieldBox,
    style: &FieldStyle,
    value: &FieldValue,
    surface: Surface,
    scale: ScaleFactor,
    measure: &mut M,
) -> FieldcastResult<FieldPlan> {
    let rect = transform::to_pixels(field_box, surface);
    let font = FontSpec::from_style(style, scale.text());
    let lh = line_height(style, scale);
    let content = content_rect(rect.width, rect.height, scale);
    let max_width = content.width() as f32;

    let rows: Vec<Vec<PlannedSegment>> = match value {
        FieldValue::Text(text) => {
            let mut rows = Vec::new();
            for line in wrap_text(text, max_width, &font, measure)? {
                let width = if line.is_empty() {
                    0.0
                } else {
                    f64::from(measure.measure(&line, &font)?)
                };
                rows.push(vec![PlannedSegment {
                    text: line,
                    font: font.clone(),
                    color: style.color,
                    underline: false,
                    x_offset: 0.0,
                    width,
                }]);
            }
            rows
        }
        FieldValue::Rich(rich) => wrap_rich(rich, max_width, &font, measure)?
            .into_iter()
            .map(|line| {
                let mut x = 0.0;
                line.segments
                    .into_iter()
                    .map(|seg| {
                        let width = f64::from(seg.width);
                        let planned = PlannedSegment {
                            font: font.emphasized(seg.style.bold, seg.style.italic),
                            color: seg.style.color.unwrap_or(style.color),
                            underline: seg.style.underline,
                            x_offset: x,
                            width,
                            text: seg.text,
                        };
                        x += width;
                        planned
                    })
                    .collect()
            })
            .collect(),
    };

    let widths: Vec<f64> = rows
        .iter()
        .map(|segs| segs.iter().map(|s| s.width).sum())
        .collect();
    let block = layout_block(
        &widths,
        content,
        style.text_align,
        style.vertical_align,
        lh,
    );
    let lines = block
        .lines
        .into_iter()
        .zip(rows)
        .map(|(pos, segments)| PlannedLine {
            x: pos.x,
            top: pos.top,
            width: pos.width,
            segments,
        })
        .collect();

    let stroke = (style.stroke.enabled && style.stroke.width > 0.0).then(|| StrokePaint {
        color: style.stroke.color,
        width: style.stroke.width * scale.text(),
    });
    let shadow = style.shadow.enabled.then(|| ShadowPaint {
        color: style.shadow.color,
        blur: style.shadow.blur * scale.text(),
        offset: Vec2::new(
            style.shadow.offset_x * scale.x,
            style.shadow.offset_y * scale.y,
        ),
    });

    Ok(FieldPlan {
        name: name.to_string(),
        rect,
        font,
        color: style.color,
        decoration: style.text_decoration,
        line_height: lh,
        content,
        lines,
        stroke,
        shadow,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
