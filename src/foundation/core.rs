use crate::foundation::error::{FieldcastError, FieldcastResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Pixel dimensions of a drawing destination (editor preview or native-resolution output).
///
/// A zero dimension means "not measured yet". Every percent/pixel conversion goes through
/// [`Surface::safe_width`] / [`Surface::safe_height`], which substitute `1` in that case so
/// geometry never produces non-finite values.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Surface {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Surface {
    /// Construct a surface size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is still unmeasured.
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width as `f64`, with `0` replaced by `1`.
    pub fn safe_width(self) -> f64 {
        f64::from(self.width.max(1))
    }

    /// Height as `f64`, with `0` replaced by `1`.
    pub fn safe_height(self) -> f64 {
        f64::from(self.height.max(1))
    }

    /// Convert a horizontal percentage into pixels.
    pub fn pct_to_px_x(self, pct: f64) -> f64 {
        pct / 100.0 * self.safe_width()
    }

    /// Convert a vertical percentage into pixels.
    pub fn pct_to_px_y(self, pct: f64) -> f64 {
        pct / 100.0 * self.safe_height()
    }

    /// Convert horizontal pixels into a percentage of the width.
    pub fn px_to_pct_x(self, px: f64) -> f64 {
        px / self.safe_width() * 100.0
    }

    /// Convert vertical pixels into a percentage of the height.
    pub fn px_to_pct_y(self, px: f64) -> f64 {
        px / self.safe_height() * 100.0
    }

    /// Validate that the surface can back a raster target.
    ///
    /// The CPU rasterizer addresses pixmaps with `u16` coordinates.
    pub fn validate_raster(self) -> FieldcastResult<()> {
        if self.is_degenerate() {
            return Err(FieldcastError::validation(
                "raster surface must be at least 1x1",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(FieldcastError::validation(format!(
                "raster surface {}x{} exceeds {}x{}",
                self.width,
                self.height,
                u16::MAX,
                u16::MAX
            )));
        }
        Ok(())
    }
}

/// Frame index in an output video stream.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Rational frames-per-second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator.
    pub num: u32,
    /// Denominator, must be > 0.
    pub den: u32,
}

impl Fps {
    /// Construct a validated frame rate.
    pub fn new(num: u32, den: u32) -> FieldcastResult<Self> {
        if den == 0 {
            return Err(FieldcastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(FieldcastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Frames per second as `f64`.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Convert seconds into a whole number of frames, rounding down.
    pub fn secs_to_frames_floor(self, secs: f64) -> u64 {
        (secs * self.as_f64()).floor().max(0.0) as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
