use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::core::{Affine, Point, Rect, Surface};
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::render::blur::{blur_region_rgba8_premul, shadow_blur_params};
use crate::render::composite::{PixelRegion, crop_rgba8, over_region_in_place};
use crate::render::frame::{BackgroundImage, FrameRGBA, RenderOpts};
use crate::render::plan::ShadowPaint;
use crate::render::surface::DrawSurface;
use crate::text::fonts::ShapedLine;

/// `vello_cpu` implementation of [`DrawSurface`].
///
/// Draws are collected in a layer context and composited onto a premultiplied base buffer when
/// the layer is flushed. While a shadow is active, every draw is mirrored into a second context
/// in the opaque shadow color; on flush that layer is blurred and composited first, with the
/// shadow alpha as opacity, so the text lands on top of its own shadow.
///
/// Both contexts track the device-space bounds of what they hold; a flush only crops, blurs and
/// composites that area (grown by the blur radius), not the whole surface.
pub struct CpuSurface {
    surface: Surface,
    base: Vec<u8>,
    layer: vello_cpu::RenderContext,
    layer_bounds: Option<Rect>,
    shadow_ctx: vello_cpu::RenderContext,
    shadow: Option<ShadowPaint>,
    shadow_bounds: Option<Rect>,
    scratch: vello_cpu::Pixmap,
    transform: Affine,
}

impl CpuSurface {
    /// Surface cleared to `opts.clear_rgba`.
    pub fn new(surface: Surface, opts: &RenderOpts) -> FieldcastResult<Self> {
        surface.validate_raster()?;
        let (w, h) = raster_size(surface)?;
        let n = surface.width as usize * surface.height as usize;
        Ok(Self {
            surface,
            base: opts.clear_premul().repeat(n),
            layer: vello_cpu::RenderContext::new(w, h),
            layer_bounds: None,
            shadow_ctx: vello_cpu::RenderContext::new(w, h),
            shadow: None,
            shadow_bounds: None,
            scratch: vello_cpu::Pixmap::new(w, h),
            transform: Affine::IDENTITY,
        })
    }

    /// Flush pending draws and hand out the finished frame.
    pub fn into_frame(mut self) -> FieldcastResult<FrameRGBA> {
        self.flush()?;
        Ok(FrameRGBA {
            width: self.surface.width,
            height: self.surface.height,
            data: self.base,
            premultiplied: true,
        })
    }

    fn flush(&mut self) -> FieldcastResult<()> {
        let (w, h) = (self.surface.width, self.surface.height);
        if let Some(bounds) = self.shadow_bounds.take() {
            render_ctx(&mut self.shadow_ctx, &mut self.scratch);
            self.shadow_ctx.reset();

            let (color, blur) = self
                .shadow
                .map(|s| (s.color, s.blur))
                .unwrap_or((Color::TRANSPARENT, 0.0));
            let opacity = f32::from(color.a) / 255.0;
            let params = shadow_blur_params(blur);
            let pad = params.map_or(0.0, |(radius, _)| f64::from(radius)) + 1.0;
            if let Some(region) = PixelRegion::covering(bounds, pad, w, h) {
                let src = self.scratch.data_as_u8_slice();
                let pixels = match params {
                    Some((radius, sigma)) => {
                        blur_region_rgba8_premul(src, w, h, region, radius, sigma)?
                    }
                    None => crop_rgba8(src, w, h, region)?,
                };
                over_region_in_place(&mut self.base, w, &pixels, region, opacity)?;
            }
        }
        if let Some(bounds) = self.layer_bounds.take() {
            render_ctx(&mut self.layer, &mut self.scratch);
            self.layer.reset();
            if let Some(region) = PixelRegion::covering(bounds, 1.0, w, h) {
                let pixels = crop_rgba8(self.scratch.data_as_u8_slice(), w, h, region)?;
                over_region_in_place(&mut self.base, w, &pixels, region, 1.0)?;
            }
        }
        Ok(())
    }

    fn shadow_target(
        &mut self,
        local: Affine,
        local_bounds: Rect,
    ) -> Option<(&mut vello_cpu::RenderContext, Color)> {
        let shadow = self.shadow?;
        let tr = Affine::translate(shadow.offset) * self.transform * local;
        self.shadow_ctx.set_transform(affine_to_cpu(tr));
        self.shadow_bounds = Some(grow(self.shadow_bounds, tr.transform_rect_bbox(local_bounds)));
        let c = shadow.color;
        Some((&mut self.shadow_ctx, Color::rgb(c.r, c.g, c.b)))
    }

    fn layer_target(&mut self, local: Affine, local_bounds: Rect) -> &mut vello_cpu::RenderContext {
        let tr = self.transform * local;
        self.layer.set_transform(affine_to_cpu(tr));
        self.layer_bounds = Some(grow(self.layer_bounds, tr.transform_rect_bbox(local_bounds)));
        &mut self.layer
    }
}

impl DrawSurface for CpuSurface {
    fn surface(&self) -> Surface {
        self.surface
    }

    fn draw_background(&mut self, background: &BackgroundImage) -> FieldcastResult<()> {
        self.flush()?;
        let pixmap = pixmap_from_premul_bytes(
            &background.rgba8_premul,
            background.width,
            background.height,
        )?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let (bw, bh) = (f64::from(background.width), f64::from(background.height));
        let fit = Affine::scale_non_uniform(
            self.surface.safe_width() / bw,
            self.surface.safe_height() / bh,
        );

        self.layer.set_transform(affine_to_cpu(fit));
        self.layer.set_paint(paint);
        self.layer
            .fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
        self.layer_bounds = Some(Rect::new(
            0.0,
            0.0,
            self.surface.safe_width(),
            self.surface.safe_height(),
        ));
        self.flush()
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn set_shadow(&mut self, shadow: Option<ShadowPaint>) -> FieldcastResult<()> {
        self.flush()?;
        self.shadow = shadow;
        Ok(())
    }

    fn fill_line(&mut self, line: &ShapedLine, origin: Point, color: Color) -> FieldcastResult<()> {
        let local = Affine::translate(origin.to_vec2());
        let bounds = line_bounds(line, 0.0);
        if let Some((ctx, shadow_color)) = self.shadow_target(local, bounds) {
            draw_glyphs(ctx, line, shadow_color, None);
        }
        draw_glyphs(self.layer_target(local, bounds), line, color, None);
        Ok(())
    }

    fn stroke_line(
        &mut self,
        line: &ShapedLine,
        origin: Point,
        color: Color,
        width: f64,
    ) -> FieldcastResult<()> {
        let local = Affine::translate(origin.to_vec2());
        let bounds = line_bounds(line, width);
        if let Some((ctx, shadow_color)) = self.shadow_target(local, bounds) {
            draw_glyphs(ctx, line, shadow_color, Some(width));
        }
        draw_glyphs(self.layer_target(local, bounds), line, color, Some(width));
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> FieldcastResult<()> {
        let r = vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1);
        if let Some((ctx, shadow_color)) = self.shadow_target(Affine::IDENTITY, rect) {
            ctx.set_paint(to_cpu_color(shadow_color));
            ctx.fill_rect(&r);
        }
        let ctx = self.layer_target(Affine::IDENTITY, rect);
        ctx.set_paint(to_cpu_color(color));
        ctx.fill_rect(&r);
        Ok(())
    }
}

fn draw_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    line: &ShapedLine,
    color: Color,
    stroke_width: Option<f64>,
) {
    if line.glyphs.is_empty() {
        return;
    }
    ctx.set_paint(to_cpu_color(color));
    let glyphs = line.glyphs.iter().map(|g| vello_cpu::Glyph {
        id: g.id,
        x: g.x,
        y: g.y,
    });
    match stroke_width {
        None => {
            ctx.glyph_run(&line.font)
                .font_size(line.font_size)
                .fill_glyphs(glyphs);
        }
        Some(width) => {
            ctx.set_stroke(
                vello_cpu::kurbo::Stroke::new(width).with_join(vello_cpu::kurbo::Join::Round),
            );
            ctx.glyph_run(&line.font)
                .font_size(line.font_size)
                .stroke_glyphs(glyphs);
        }
    }
}

/// Generous local bounds of a glyph line around its baseline origin: the face metrics plus half
/// an em for overhangs, plus half the stroke width.
fn line_bounds(line: &ShapedLine, stroke_width: f64) -> Rect {
    let size = f64::from(line.font_size);
    let pad = size * 0.5 + stroke_width.max(0.0) / 2.0;
    let mut rect = Rect::new(
        0.0,
        -f64::from(line.ascent),
        f64::from(line.advance),
        f64::from(line.descent),
    );
    for g in &line.glyphs {
        let (x, y) = (f64::from(g.x), f64::from(g.y));
        rect = rect.union(Rect::new(x, y - size, x + size, y + size * 0.5));
    }
    rect.inflate(pad, pad)
}

fn grow(acc: Option<Rect>, rect: Rect) -> Rect {
    acc.map_or(rect, |r| r.union(rect))
}

fn render_ctx(ctx: &mut vello_cpu::RenderContext, dst: &mut vello_cpu::Pixmap) {
    dst.data_as_u8_slice_mut().fill(0);
    ctx.flush();
    ctx.render_to_pixmap(dst);
}

fn raster_size(surface: Surface) -> FieldcastResult<(u16, u16)> {
    let w: u16 = surface
        .width
        .try_into()
        .map_err(|_| FieldcastError::render("surface width exceeds u16"))?;
    let h: u16 = surface
        .height
        .try_into()
        .map_err(|_| FieldcastError::render("surface height exceeds u16"))?;
    Ok((w, h))
}

fn to_cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FieldcastResult<vello_cpu::Pixmap> {
    let (w, h) = raster_size(Surface::new(width, height))?;
    if bytes.len() != (width as usize) * (height as usize) * 4 {
        return Err(FieldcastError::render("pixmap byte len mismatch"));
    }
    let mut may_have_opacities = false;
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]])
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
