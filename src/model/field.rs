use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::{FieldcastError, FieldcastResult};

/// Minimum box width, in percent of the surface width.
pub const MIN_WIDTH_PCT: f64 = 5.0;
/// Minimum box height, in percent of the surface height.
pub const MIN_HEIGHT_PCT: f64 = 3.0;

/// Normalized placement of one field over the surface.
///
/// All lengths are percentages of the surface (top-left origin); `rotation` is in degrees and
/// turns the box about its centre.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldBox {
    /// Left edge of the unrotated box, percent of surface width.
    pub x: f64,
    /// Top edge of the unrotated box, percent of surface height.
    pub y: f64,
    /// Width, percent of surface width (>= [`MIN_WIDTH_PCT`]).
    pub width: f64,
    /// Height, percent of surface height (>= [`MIN_HEIGHT_PCT`]).
    pub height: f64,
    /// Rotation in degrees, normalized to `[0, 360)`.
    #[serde(default, alias = "rotationDegrees")]
    pub rotation: f64,
    /// Whether the field is rendered.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl FieldBox {
    /// Unrotated, visible box.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
            visible: true,
        }
    }

    /// Return a copy with the given rotation (not normalized).
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Centre in percent coordinates.
    pub fn center_pct(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check finiteness and minimum sizes.
    pub fn validate(&self) -> FieldcastResult<()> {
        let all = [self.x, self.y, self.width, self.height, self.rotation];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(FieldcastError::validation(
                "field box values must be finite",
            ));
        }
        if self.width < MIN_WIDTH_PCT - 1e-9 {
            return Err(FieldcastError::validation(format!(
                "field box width {} is below the {MIN_WIDTH_PCT}% minimum",
                self.width
            )));
        }
        if self.height < MIN_HEIGHT_PCT - 1e-9 {
            return Err(FieldcastError::validation(format!(
                "field box height {} is below the {MIN_HEIGHT_PCT}% minimum",
                self.height
            )));
        }
        Ok(())
    }
}

/// Horizontal alignment of lines within the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centred.
    Center,
    /// Flush right.
    Right,
}

/// Vertical alignment of the line block within the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Block starts at the top.
    #[default]
    Top,
    /// Block centred vertically.
    Middle,
    /// Block ends at the bottom.
    Bottom,
}

/// Font slant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic (or oblique when no italic face exists).
    Italic,
}

/// Line decoration drawn with the fill color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Line under the baseline.
    Underline,
    /// Line through the x-height.
    LineThrough,
}

/// CSS-style numeric font weight (`400` normal, `700` bold).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    /// `400`.
    pub const NORMAL: Self = Self(400);
    /// `700`.
    pub const BOLD: Self = Self(700);
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl<'de> Deserialize<'de> for FontWeight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(f64),
            Str(String),
        }

        let raw = match Repr::deserialize(deserializer)? {
            Repr::Num(n) => n,
            Repr::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "normal" => 400.0,
                "bold" => 700.0,
                "lighter" => 300.0,
                "bolder" => 800.0,
                other => other.parse::<f64>().map_err(|_| {
                    serde::de::Error::custom(format!("invalid font weight \"{other}\""))
                })?,
            },
        };
        if !raw.is_finite() {
            return Err(serde::de::Error::custom("font weight must be finite"));
        }
        Ok(Self(raw.round().clamp(1.0, 1000.0) as u16))
    }
}

/// Outline drawn beneath the fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrokeStyle {
    /// Whether the outline is drawn.
    pub enabled: bool,
    /// Outline color.
    pub color: Color,
    /// Outline width in pixels at the reference resolution.
    #[serde(alias = "widthPx")]
    pub width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::WHITE,
            width: 2.0,
        }
    }
}

/// Drop shadow behind stroke and fill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShadowStyle {
    /// Whether the shadow is drawn.
    pub enabled: bool,
    /// Shadow color.
    pub color: Color,
    /// Blur amount in pixels at the reference resolution.
    #[serde(alias = "blurPx")]
    pub blur: f64,
    /// Horizontal offset in pixels at the reference resolution.
    #[serde(alias = "offsetXPx")]
    pub offset_x: f64,
    /// Vertical offset in pixels at the reference resolution.
    #[serde(alias = "offsetYPx")]
    pub offset_y: f64,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgba(0, 0, 0, 128),
            blur: 4.0,
            offset_x: 2.0,
            offset_y: 2.0,
        }
    }
}

/// Typography and effects for one field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldStyle {
    /// Family name as registered with the font book.
    pub font_family: String,
    /// Font size in pixels at the reference resolution.
    pub font_size: f64,
    /// Numeric weight.
    pub font_weight: FontWeight,
    /// Slant.
    pub font_style: FontStyle,
    /// Fill color.
    pub color: Color,
    /// Horizontal alignment.
    pub text_align: TextAlign,
    /// Vertical alignment.
    pub vertical_align: VerticalAlign,
    /// Decoration line.
    pub text_decoration: TextDecoration,
    /// Line height as a multiple of the font size.
    #[serde(alias = "lineHeightMultiplier")]
    pub line_height: f64,
    /// Outline.
    pub stroke: StrokeStyle,
    /// Drop shadow.
    pub shadow: ShadowStyle,
}

impl Default for FieldStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 32.0,
            font_weight: FontWeight::NORMAL,
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            text_align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            text_decoration: TextDecoration::None,
            line_height: 1.2,
            stroke: StrokeStyle::default(),
            shadow: ShadowStyle::default(),
        }
    }
}

impl FieldStyle {
    /// Check the numeric style parameters.
    pub fn validate(&self) -> FieldcastResult<()> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(FieldcastError::validation(
                "fontSize must be finite and > 0",
            ));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(FieldcastError::validation(
                "lineHeight must be finite and > 0",
            ));
        }
        if !self.stroke.width.is_finite() || self.stroke.width < 0.0 {
            return Err(FieldcastError::validation(
                "stroke width must be finite and >= 0",
            ));
        }
        let shadow = &self.shadow;
        if !shadow.blur.is_finite() || shadow.blur < 0.0 {
            return Err(FieldcastError::validation(
                "shadow blur must be finite and >= 0",
            ));
        }
        if !shadow.offset_x.is_finite() || !shadow.offset_y.is_finite() {
            return Err(FieldcastError::validation(
                "shadow offsets must be finite",
            ));
        }
        if self.font_family.trim().is_empty() {
            return Err(FieldcastError::validation("fontFamily must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/field.rs"]
mod tests;
