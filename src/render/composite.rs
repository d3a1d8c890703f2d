use crate::foundation::core::Rect;
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Premultiplied source-over with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Composite `src` over `dst` pixel by pixel.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> FieldcastResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FieldcastError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Integer pixel rectangle inside a raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    /// Left column.
    pub x: u32,
    /// Top row.
    pub y: u32,
    /// Columns covered.
    pub width: u32,
    /// Rows covered.
    pub height: u32,
}

impl PixelRegion {
    /// The whole `width` x `height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Pixels touched by `rect` grown by `pad` on every side, clipped to a `width` x `height`
    /// raster. `None` when nothing is left; a non-finite `rect` covers the whole raster.
    pub fn covering(rect: Rect, pad: f64, width: u32, height: u32) -> Option<Self> {
        let coords = [rect.x0, rect.y0, rect.x1, rect.y1];
        if !coords.iter().all(|v| v.is_finite()) || !pad.is_finite() {
            return Some(Self::full(width, height));
        }
        let (w, h) = (f64::from(width), f64::from(height));
        let x0 = (rect.x0.min(rect.x1) - pad).floor().clamp(0.0, w);
        let y0 = (rect.y0.min(rect.y1) - pad).floor().clamp(0.0, h);
        let x1 = (rect.x0.max(rect.x1) + pad).ceil().clamp(0.0, w);
        let y1 = (rect.y0.max(rect.y1) + pad).ceil().clamp(0.0, h);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    fn byte_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    fn fits(self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }

    fn row_range(self, raster_width: u32, row: u32) -> std::ops::Range<usize> {
        let start = ((self.y + row) as usize * raster_width as usize + self.x as usize) * 4;
        start..start + self.width as usize * 4
    }
}

/// Copy `region` out of a `width` x `height` RGBA8 raster.
pub fn crop_rgba8(
    src: &[u8],
    width: u32,
    height: u32,
    region: PixelRegion,
) -> FieldcastResult<Vec<u8>> {
    if src.len() != width as usize * height as usize * 4 || !region.fits(width, height) {
        return Err(FieldcastError::render(
            "crop_rgba8 expects a region inside a width*height*4 buffer",
        ));
    }
    let mut out = Vec::with_capacity(region.byte_len());
    for row in 0..region.height {
        out.extend_from_slice(&src[region.row_range(width, row)]);
    }
    Ok(out)
}

/// Composite a region-sized `src` over the pixels of `region` in a `width`-wide `dst`.
pub fn over_region_in_place(
    dst: &mut [u8],
    width: u32,
    src: &[u8],
    region: PixelRegion,
    opacity: f32,
) -> FieldcastResult<()> {
    let height = if width == 0 {
        0
    } else {
        (dst.len() / 4 / width as usize) as u32
    };
    if src.len() != region.byte_len()
        || dst.len() != width as usize * height as usize * 4
        || !region.fits(width, height)
    {
        return Err(FieldcastError::render(
            "over_region_in_place expects a region-sized src inside dst",
        ));
    }
    let row_bytes = region.width as usize * 4;
    for row in 0..region.height {
        let src_row = &src[row as usize * row_bytes..(row as usize + 1) * row_bytes];
        over_in_place(&mut dst[region.row_range(width, row)], src_row, opacity)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
