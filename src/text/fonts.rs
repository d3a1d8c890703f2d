//! Font registration, measurement and shaping on top of `parley`.
//!
//! Only explicitly registered font bytes are visible: there is no system font lookup, so
//! measurement is identical on every machine that registers the same files.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::text::measure::{FontSpec, TextMeasure};

/// Glyph positioned relative to the start of its line (x) and its baseline (y).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph id in the face.
    pub id: u32,
    /// Horizontal pen position.
    pub x: f32,
    /// Vertical offset from the baseline.
    pub y: f32,
}

/// One shaped line ready for rasterization.
#[derive(Clone)]
pub struct ShapedLine {
    /// Face the glyph ids belong to.
    pub font: vello_cpu::peniko::FontData,
    /// Font size in pixels.
    pub font_size: f32,
    /// Glyphs in visual order.
    pub glyphs: Vec<ShapedGlyph>,
    /// Full advance including trailing whitespace.
    pub advance: f32,
    /// Face ascent at `font_size`.
    pub ascent: f32,
    /// Face descent at `font_size` (positive, below the baseline).
    pub descent: f32,
}

impl std::fmt::Debug for ShapedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapedLine")
            .field("font_size", &self.font_size)
            .field("glyphs", &self.glyphs.len())
            .field("advance", &self.advance)
            .field("ascent", &self.ascent)
            .field("descent", &self.descent)
            .finish()
    }
}

/// Produces glyph runs for rasterization. Implementations must agree with their own
/// [`TextMeasure`] so wrapped lines and drawn lines have the same width.
pub trait TextShaper: TextMeasure {
    /// Shape `text` as a single unbroken line.
    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<ShapedLine>;
}

impl<T: TextShaper + ?Sized> TextShaper for &mut T {
    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<ShapedLine> {
        (**self).shape_line(text, font)
    }
}

/// Thread-safe description of a font book: the raw font files plus the fallback family.
///
/// [`FontBook`] owns `parley` contexts that are not shared across threads, so parallel workers
/// each rebuild a book from one library.
#[derive(Clone, Debug, Default)]
pub struct FontLibrary {
    fonts: Vec<Arc<[u8]>>,
    fallback_family: Option<String>,
}

impl FontLibrary {
    /// Number of registered font files.
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Whether no font file is registered.
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Family used when a requested family has no registered face.
    pub fn fallback_family(&self) -> Option<&str> {
        self.fallback_family.as_deref()
    }
}

struct Face {
    family: String,
    weight: u16,
    italic: bool,
    data: vello_cpu::peniko::FontData,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct MeasureKey {
    text: String,
    face: usize,
    size_bits: u32,
}

/// Registered fonts plus the `parley` contexts used to measure and shape with them.
pub struct FontBook {
    library: FontLibrary,
    faces: Vec<Face>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    widths: HashMap<MeasureKey, f32>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("families", &self.families())
            .field("faces", &self.faces.len())
            .field("fallback_family", &self.library.fallback_family)
            .finish()
    }
}

impl FontBook {
    /// Empty book; every measurement fails with [`FieldcastError::FontsUnavailable`].
    pub fn new() -> Self {
        Self {
            library: FontLibrary::default(),
            faces: Vec::new(),
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            widths: HashMap::new(),
        }
    }

    /// Rebuild a book from a library.
    pub fn from_library(library: &FontLibrary) -> FieldcastResult<Self> {
        let mut book = Self::new();
        for bytes in &library.fonts {
            book.register_bytes(bytes)?;
        }
        book.library = library.clone();
        Ok(book)
    }

    /// Independent copy for another worker.
    pub fn fork(&self) -> FieldcastResult<Self> {
        Self::from_library(&self.library)
    }

    /// Snapshot of the registered fonts.
    pub fn library(&self) -> &FontLibrary {
        &self.library
    }

    /// Register a font file (TTF/OTF/TTC) and return the family names it provides.
    pub fn register_font(&mut self, bytes: impl Into<Arc<[u8]>>) -> FieldcastResult<Vec<String>> {
        let bytes = bytes.into();
        let families = self.register_bytes(&bytes)?;
        self.library.fonts.push(bytes);
        tracing::debug!(?families, faces = self.faces.len(), "registered font");
        Ok(families)
    }

    /// Use `family` for requests naming an unregistered family (e.g. `sans-serif`).
    pub fn set_fallback_family(&mut self, family: Option<String>) {
        self.library.fallback_family = family;
        self.widths.clear();
    }

    /// Distinct registered family names in registration order.
    pub fn families(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for face in &self.faces {
            if !out.iter().any(|f| f == &face.family) {
                out.push(face.family.clone());
            }
        }
        out
    }

    /// Whether `family` resolves without the fallback.
    pub fn has_family(&self, family: &str) -> bool {
        self.faces
            .iter()
            .any(|f| f.family.eq_ignore_ascii_case(family))
    }

    /// Check that `font` resolves to some face (directly or through the fallback).
    pub fn ensure_available(&self, font: &FontSpec) -> FieldcastResult<()> {
        self.resolve(font).map(|_| ())
    }

    fn register_bytes(&mut self, bytes: &Arc<[u8]>) -> FieldcastResult<Vec<String>> {
        let registered = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        if registered.is_empty() {
            return Err(FieldcastError::validation(
                "no font faces found in font data",
            ));
        }

        let blob = vello_cpu::peniko::Blob::from(bytes.to_vec());
        let mut names = Vec::new();
        for (family_id, infos) in registered {
            let family = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| FieldcastError::validation("registered font family has no name"))?
                .to_string();
            for info in infos {
                self.faces.push(Face {
                    family: family.clone(),
                    weight: info.weight().value().round().clamp(1.0, 1000.0) as u16,
                    italic: !matches!(info.style(), parley::fontique::FontStyle::Normal),
                    data: vello_cpu::peniko::FontData::new(blob.clone(), info.index()),
                });
            }
            if !names.contains(&family) {
                names.push(family);
            }
        }
        self.widths.clear();
        Ok(names)
    }

    fn resolve(&self, font: &FontSpec) -> FieldcastResult<usize> {
        self.closest_face(&font.family, font)
            .or_else(|| {
                self.library
                    .fallback_family
                    .as_deref()
                    .and_then(|fallback| self.closest_face(fallback, font))
            })
            .ok_or_else(|| FieldcastError::fonts_unavailable(font.family.clone()))
    }

    fn closest_face(&self, family: &str, font: &FontSpec) -> Option<usize> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, face)| face.family.eq_ignore_ascii_case(family))
            .min_by_key(|(_, face)| {
                let slant = if face.italic == font.italic { 0 } else { 10_000 };
                slant + u32::from(face.weight.abs_diff(font.weight))
            })
            .map(|(i, _)| i)
    }

    fn build_layout(&mut self, text: &str, face: usize, size_px: f32) -> parley::Layout<()> {
        use parley::style::{FontStack, FontStyle, FontWeight, StyleProperty};

        let face = &self.faces[face];
        let family = face.family.clone();
        let weight = FontWeight::new(f32::from(face.weight));
        let style = if face.italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(StyleProperty::FontStack(FontStack::Source(Cow::Owned(family))));
        builder.push_default(StyleProperty::FontSize(size_px));
        builder.push_default(StyleProperty::FontWeight(weight));
        builder.push_default(StyleProperty::FontStyle(style));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

fn validate_size(font: &FontSpec) -> FieldcastResult<()> {
    if !font.size_px.is_finite() || font.size_px <= 0.0 {
        return Err(FieldcastError::validation(
            "font size_px must be finite and > 0",
        ));
    }
    Ok(())
}

impl TextMeasure for FontBook {
    fn measure(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<f32> {
        let face = self.resolve(font)?;
        validate_size(font)?;
        if text.is_empty() {
            return Ok(0.0);
        }

        let key = MeasureKey {
            text: text.to_string(),
            face,
            size_bits: font.size_px.to_bits(),
        };
        if let Some(width) = self.widths.get(&key) {
            return Ok(*width);
        }
        let width = self.build_layout(text, face, font.size_px).full_width();
        self.widths.insert(key, width);
        Ok(width)
    }
}

impl TextShaper for FontBook {
    fn shape_line(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<ShapedLine> {
        let face = self.resolve(font)?;
        validate_size(font)?;

        let layout = self.build_layout(text, face, font.size_px);
        let mut glyphs = Vec::new();
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        for line in layout.lines() {
            let metrics = line.metrics();
            ascent = ascent.max(metrics.ascent);
            descent = descent.max(metrics.descent);
            let baseline = metrics.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                glyphs.extend(run.positioned_glyphs().map(|g| ShapedGlyph {
                    id: u32::from(g.id),
                    x: g.x,
                    y: g.y - baseline,
                }));
            }
        }
        if ascent <= 0.0 && descent <= 0.0 {
            // Empty text produces no line metrics.
            ascent = font.size_px * 0.8;
            descent = font.size_px * 0.2;
        }

        Ok(ShapedLine {
            font: self.faces[face].data.clone(),
            font_size: font.size_px,
            glyphs,
            advance: layout.full_width(),
            ascent,
            descent,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
