use std::sync::Arc;

use crate::foundation::color::Color;
use crate::foundation::core::Surface;
use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::foundation::math::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place};

/// Rendered frame pixels.
///
/// Frames produced by fieldcast are **premultiplied alpha**; the flag makes this explicit at API
/// boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Frame of `surface` size filled with one premultiplied pixel.
    pub fn filled(surface: Surface, premul: [u8; 4]) -> Self {
        let n = surface.width as usize * surface.height as usize;
        Self {
            width: surface.width,
            height: surface.height,
            data: premul.repeat(n),
            premultiplied: true,
        }
    }

    /// Pixel at `(x, y)`; `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy of the pixel data (what PNG encoders expect).
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if self.premultiplied {
            unpremultiply_rgba8_in_place(&mut out);
        }
        out
    }

    /// Encode as an `image` buffer with straight alpha.
    pub fn to_rgba_image(&self) -> FieldcastResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.to_straight_rgba8())
            .ok_or_else(|| FieldcastError::render("frame buffer size does not match dimensions"))
    }
}

/// Decoded background, premultiplied RGBA8, shared between records and workers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl BackgroundImage {
    /// 1x1 image of `color`; stretched over the whole surface when drawn.
    pub fn solid(color: Color) -> Self {
        Self {
            width: 1,
            height: 1,
            rgba8_premul: Arc::new(color.to_premul().to_vec()),
        }
    }

    /// Wrap straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> FieldcastResult<Self> {
        if width == 0 || height == 0 {
            return Err(FieldcastError::decode("background image has zero size"));
        }
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(FieldcastError::decode(
                "background pixel buffer does not match dimensions",
            ));
        }
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Natural size as a surface.
    pub fn surface(&self) -> Surface {
        Surface::new(self.width, self.height)
    }
}

/// Decode an encoded image (PNG, JPEG, ...) from memory.
pub fn decode_background(bytes: &[u8]) -> FieldcastResult<BackgroundImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| FieldcastError::decode(format!("decode background image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    BackgroundImage::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Rendering options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOpts {
    /// Straight-alpha color under the background (visible where the background is transparent
    /// or missing).
    pub clear_rgba: [u8; 4],
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

impl RenderOpts {
    /// Return options with a different clear color.
    pub fn with_clear_rgba(mut self, clear: [u8; 4]) -> Self {
        self.clear_rgba = clear;
        self
    }

    pub(crate) fn clear_premul(&self) -> [u8; 4] {
        let [r, g, b, a] = self.clear_rgba;
        Color::rgba(r, g, b, a).to_premul()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
