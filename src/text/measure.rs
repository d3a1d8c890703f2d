use crate::foundation::error::FieldcastResult;
use crate::model::field::{FieldStyle, FontStyle, FontWeight};

/// Resolved font request: family, effective pixel size and face selection.
#[derive(Clone, Debug, PartialEq)]
pub struct FontSpec {
    /// Family name.
    pub family: String,
    /// Effective size in output pixels (already scaled).
    pub size_px: f32,
    /// CSS numeric weight.
    pub weight: u16,
    /// Whether an italic face is requested.
    pub italic: bool,
}

impl FontSpec {
    /// Font for `style` at `scale` times its reference size.
    pub fn from_style(style: &FieldStyle, scale: f64) -> Self {
        Self {
            family: style.font_family.clone(),
            size_px: (style.font_size * scale) as f32,
            weight: style.font_weight.0,
            italic: style.font_style == FontStyle::Italic,
        }
    }

    /// Same family and size with bold/italic switched on where requested.
    pub fn emphasized(&self, bold: bool, italic: bool) -> Self {
        Self {
            family: self.family.clone(),
            size_px: self.size_px,
            weight: if bold {
                self.weight.max(FontWeight::BOLD.0)
            } else {
                self.weight
            },
            italic: self.italic || italic,
        }
    }
}

/// Font-metrics capability injected into text layout.
///
/// Both the preview and the rasterizer must be backed by metric-equivalent fonts, otherwise
/// wrap points diverge.
pub trait TextMeasure {
    /// Advance width of `text` set on a single line, in pixels.
    fn measure(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<f32>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &mut T {
    fn measure(&mut self, text: &str, font: &FontSpec) -> FieldcastResult<f32> {
        (**self).measure(text, font)
    }
}
