use crate::foundation::core::{Rect, Surface};
use crate::model::field::{FieldStyle, TextAlign, VerticalAlign};

/// Inner padding between the box edge and its text, in pixels at the reference resolution.
pub const BOX_PADDING_PX: f64 = 8.0;

/// Ratio between the output surface and the reference (editor) surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleFactor {
    /// Horizontal ratio.
    pub x: f64,
    /// Vertical ratio.
    pub y: f64,
}

impl ScaleFactor {
    /// No scaling.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Uniform scale applied to font size, line height, padding, stroke width and blur.
    ///
    /// The horizontal ratio keeps line breaks identical between editor and output when the
    /// aspect ratio matches, since wrap width scales by the same factor.
    pub fn text(self) -> f64 {
        self.x
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Scale from `reference` to `output`; degenerate sizes count as 1px.
pub fn compute_scale_factor(reference: Surface, output: Surface) -> ScaleFactor {
    ScaleFactor {
        x: output.safe_width() / reference.safe_width(),
        y: output.safe_height() / reference.safe_height(),
    }
}

/// Effective line height in output pixels.
pub fn line_height(style: &FieldStyle, scale: ScaleFactor) -> f64 {
    style.font_size * scale.text() * style.line_height
}

/// Padding in output pixels.
pub fn box_padding(scale: ScaleFactor) -> f64 {
    BOX_PADDING_PX * scale.text()
}

/// Text area inside a `width` x `height` box, in box-local coordinates.
///
/// Padding never inverts the rectangle; a box thinner than twice the padding collapses to a
/// zero-size content area at its middle.
pub fn content_rect(width: f64, height: f64, scale: ScaleFactor) -> Rect {
    let pad = box_padding(scale);
    let pad_x = pad.min(width / 2.0).max(0.0);
    let pad_y = pad.min(height / 2.0).max(0.0);
    Rect::new(pad_x, pad_y, width - pad_x, height - pad_y)
}

/// One line placed inside its box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedLine {
    /// Left edge of the line's ink advance, box-local.
    pub x: f64,
    /// Top of the line box, box-local.
    pub top: f64,
    /// Measured advance.
    pub width: f64,
}

/// Aligned block of lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextBlock {
    /// Lines in order, each `line_height` below the previous.
    pub lines: Vec<PositionedLine>,
    /// Height of every line box.
    pub line_height: f64,
    /// `lines.len() * line_height`.
    pub total_height: f64,
}

/// Align measured lines inside `content`.
///
/// Each line's x depends on `align` against the content width; the block as a whole is placed by
/// `valign` against the content height. Overflowing text is positioned the same way and is not
/// clipped.
pub fn layout_block(
    line_widths: &[f64],
    content: Rect,
    align: TextAlign,
    valign: VerticalAlign,
    line_height: f64,
) -> TextBlock {
    let total_height = line_widths.len() as f64 * line_height;
    let block_top = content.y0
        + match valign {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => (content.height() - total_height) / 2.0,
            VerticalAlign::Bottom => content.height() - total_height,
        };

    let lines = line_widths
        .iter()
        .enumerate()
        .map(|(i, &width)| PositionedLine {
            x: content.x0
                + match align {
                    TextAlign::Left => 0.0,
                    TextAlign::Center => (content.width() - width) / 2.0,
                    TextAlign::Right => content.width() - width,
                },
            top: block_top + i as f64 * line_height,
            width,
        })
        .collect();

    TextBlock {
        lines,
        line_height,
        total_height,
    }
}

/// Baseline offset from a line box top, centring the font's ascent+descent in the line box.
pub fn baseline_offset(line_height: f64, ascent: f64, descent: f64) -> f64 {
    (line_height - (ascent + descent)) / 2.0 + ascent
}

#[cfg(test)]
#[path = "../../tests/unit/text/layout.rs"]
mod tests;
