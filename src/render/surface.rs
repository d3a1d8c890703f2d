use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Point, Rect, Surface};
use crate::foundation::error::FieldcastResult;
use crate::render::frame::BackgroundImage;
use crate::render::plan::ShadowPaint;
use crate::text::fonts::ShapedLine;

/// Drawing capability handed to one render call.
///
/// A surface is created per record and never retained across records; all state set on it
/// (transform, shadow) lives only for that call.
pub trait DrawSurface {
    /// Pixel size of the target.
    fn surface(&self) -> Surface;

    /// Draw `background` stretched over the whole surface.
    fn draw_background(&mut self, background: &BackgroundImage) -> FieldcastResult<()>;

    /// Transform applied to every following draw (box-local to surface pixels).
    fn set_transform(&mut self, transform: Affine);

    /// Enable (or with `None`, finish) a drop shadow under the following draws.
    fn set_shadow(&mut self, shadow: Option<ShadowPaint>) -> FieldcastResult<()>;

    /// Fill glyphs with their baseline origin at `origin`.
    fn fill_line(&mut self, line: &ShapedLine, origin: Point, color: Color) -> FieldcastResult<()>;

    /// Outline glyphs with a stroke of `width` pixels.
    fn stroke_line(
        &mut self,
        line: &ShapedLine,
        origin: Point,
        color: Color,
        width: f64,
    ) -> FieldcastResult<()>;

    /// Fill a rectangle (decorations).
    fn fill_rect(&mut self, rect: Rect, color: Color) -> FieldcastResult<()>;
}
