//! Percent-space box geometry under rotation.
//!
//! Boxes are stored in percentages of the surface, but every rotation is done in pixel space:
//! on a non-square surface a percent square is not a pixel square, and rotating percentages would
//! shear the box.

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Surface, Vec2};
use crate::model::field::{FieldBox, MIN_HEIGHT_PCT, MIN_WIDTH_PCT};

const FIT_EPS_PX: f64 = 1e-9;
const FIT_ITERATIONS: usize = 40;

/// One of the eight resize handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left corner.
    Nw,
    /// Top edge.
    N,
    /// Top-right corner.
    Ne,
    /// Right edge.
    E,
    /// Bottom-right corner.
    Se,
    /// Bottom edge.
    S,
    /// Bottom-left corner.
    Sw,
    /// Left edge.
    W,
}

impl Handle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    /// Unit direction from the box centre in the box's local frame (`-1`, `0` or `1` per axis).
    pub fn direction(self) -> (f64, f64) {
        match self {
            Handle::Nw => (-1.0, -1.0),
            Handle::N => (0.0, -1.0),
            Handle::Ne => (1.0, -1.0),
            Handle::E => (1.0, 0.0),
            Handle::Se => (1.0, 1.0),
            Handle::S => (0.0, 1.0),
            Handle::Sw => (-1.0, 1.0),
            Handle::W => (-1.0, 0.0),
        }
    }

    /// Handle on the other side of the centre.
    pub fn opposite(self) -> Handle {
        match self {
            Handle::Nw => Handle::Se,
            Handle::N => Handle::S,
            Handle::Ne => Handle::Sw,
            Handle::E => Handle::W,
            Handle::Se => Handle::Nw,
            Handle::S => Handle::N,
            Handle::Sw => Handle::Ne,
            Handle::W => Handle::E,
        }
    }

    /// Whether dragging this handle changes the width / the height.
    pub fn axes(self) -> (bool, bool) {
        let (hx, hy) = self.direction();
        (hx != 0.0, hy != 0.0)
    }
}

/// Width and height in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extent {
    /// Percent of surface width.
    pub width: f64,
    /// Percent of surface height.
    pub height: f64,
}

/// A field box resolved to pixels: centre, unrotated size and rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    /// Centre in surface pixels.
    pub center: Point,
    /// Unrotated width in pixels.
    pub width: f64,
    /// Unrotated height in pixels.
    pub height: f64,
    /// Rotation about the centre, degrees, clockwise on screen.
    pub rotation_deg: f64,
}

impl PixelRect {
    /// Map a vector in the box's local frame (origin at the centre) to a screen point.
    pub fn local_to_screen(&self, local: Vec2) -> Point {
        self.center + rotate_vec(local, self.rotation_deg)
    }

    /// Map a screen point into the box's local frame (origin at the centre).
    pub fn screen_to_local(&self, p: Point) -> Vec2 {
        rotate_vec(p - self.center, -self.rotation_deg)
    }

    /// Whether `p` lies inside the rotated box, with `slop` pixels of tolerance.
    pub fn contains(&self, p: Point, slop: f64) -> bool {
        let l = self.screen_to_local(p);
        l.x.abs() <= self.width / 2.0 + slop && l.y.abs() <= self.height / 2.0 + slop
    }

    /// Corners in order nw, ne, se, sw.
    pub fn corners(&self) -> [Point; 4] {
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        [
            self.local_to_screen(Vec2::new(-hw, -hh)),
            self.local_to_screen(Vec2::new(hw, -hh)),
            self.local_to_screen(Vec2::new(hw, hh)),
            self.local_to_screen(Vec2::new(-hw, hh)),
        ]
    }
}

fn rotate_vec(v: Vec2, deg: f64) -> Vec2 {
    let (s, c) = deg.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn rotated_extent_px(w: f64, h: f64, rotation_deg: f64) -> (f64, f64) {
    let (s, c) = rotation_deg.to_radians().sin_cos();
    let (s, c) = (s.abs(), c.abs());
    (w * c + h * s, w * s + h * c)
}

/// Axis-aligned extent of a `width_pct` x `height_pct` box rotated by `rotation_deg`.
pub fn rotated_bounding_box(
    width_pct: f64,
    height_pct: f64,
    rotation_deg: f64,
    surface: Surface,
) -> Extent {
    let (w, h) = rotated_extent_px(
        surface.pct_to_px_x(width_pct),
        surface.pct_to_px_y(height_pct),
        rotation_deg,
    );
    Extent {
        width: surface.px_to_pct_x(w),
        height: surface.px_to_pct_y(h),
    }
}

/// Resolve a box to pixels.
pub fn to_pixels(b: &FieldBox, surface: Surface) -> PixelRect {
    let (cx, cy) = b.center_pct();
    PixelRect {
        center: Point::new(surface.pct_to_px_x(cx), surface.pct_to_px_y(cy)),
        width: surface.pct_to_px_x(b.width),
        height: surface.pct_to_px_y(b.height),
        rotation_deg: b.rotation,
    }
}

/// Screen position of `handle` on the rotated box.
pub fn handle_point(b: &FieldBox, handle: Handle, surface: Surface) -> Point {
    let r = to_pixels(b, surface);
    let (hx, hy) = handle.direction();
    r.local_to_screen(Vec2::new(hx * r.width / 2.0, hy * r.height / 2.0))
}

/// Screen position of the point that stays fixed while `handle` is dragged.
pub fn anchor_point(b: &FieldBox, handle: Handle, surface: Surface) -> Point {
    handle_point(b, handle.opposite(), surface)
}

fn clamp_center(center: f64, extent: f64) -> f64 {
    if extent >= 100.0 {
        50.0
    } else {
        center.clamp(extent / 2.0, 100.0 - extent / 2.0)
    }
}

/// Move a box by a percent delta, keeping its rotated extent on the surface.
pub fn apply_drag(b: &FieldBox, dx_pct: f64, dy_pct: f64, surface: Surface) -> FieldBox {
    let ext = rotated_bounding_box(b.width, b.height, b.rotation, surface);
    let (cx, cy) = b.center_pct();
    let cx = clamp_center(cx + finite_or_zero(dx_pct), ext.width);
    let cy = clamp_center(cy + finite_or_zero(dy_pct), ext.height);
    FieldBox {
        x: cx - b.width / 2.0,
        y: cy - b.height / 2.0,
        ..*b
    }
}

/// Pixel-space resize solver for one gesture; the anchor is fixed for its lifetime.
struct ResizeFrame {
    anchor: Point,
    anchor_dir: (f64, f64),
    rotation_deg: f64,
    surface_w: f64,
    surface_h: f64,
}

impl ResizeFrame {
    fn center(&self, w: f64, h: f64) -> Point {
        let (ax, ay) = self.anchor_dir;
        self.anchor - rotate_vec(Vec2::new(ax * w / 2.0, ay * h / 2.0), self.rotation_deg)
    }

    fn fits(&self, w: f64, h: f64) -> bool {
        let c = self.center(w, h);
        let (ew, eh) = rotated_extent_px(w, h, self.rotation_deg);
        c.x - ew / 2.0 >= -FIT_EPS_PX
            && c.x + ew / 2.0 <= self.surface_w + FIT_EPS_PX
            && c.y - eh / 2.0 >= -FIT_EPS_PX
            && c.y + eh / 2.0 <= self.surface_h + FIT_EPS_PX
    }

    /// Largest `t` in `[0, 1]` such that `size(t)` fits, given that `size(0)` fits.
    fn bisect(&self, size: impl Fn(f64) -> (f64, f64)) -> (f64, f64) {
        let (w1, h1) = size(1.0);
        if self.fits(w1, h1) {
            return (w1, h1);
        }
        let (mut lo, mut hi) = (0.0, 1.0);
        for _ in 0..FIT_ITERATIONS {
            let mid = (lo + hi) / 2.0;
            let (w, h) = size(mid);
            if self.fits(w, h) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        size(lo)
    }
}

/// Resize `start` by dragging `handle` by a screen-space percent delta.
///
/// The delta is projected into the box's local frame so handles behave intuitively under
/// rotation; edge handles only change their own axis. The point opposite the handle keeps its
/// screen position. Sizes never drop below [`MIN_WIDTH_PCT`] / [`MIN_HEIGHT_PCT`], and when the
/// rotated result would leave the surface the growth is reduced until it fits.
///
/// `rotation_deg` is the box's current rotation (normally `start.rotation`); the result keeps
/// `start.rotation`.
pub fn apply_resize(
    start: &FieldBox,
    dx_pct: f64,
    dy_pct: f64,
    handle: Handle,
    rotation_deg: f64,
    surface: Surface,
) -> FieldBox {
    let rotation_deg = finite_or_zero(rotation_deg);
    let dx = surface.pct_to_px_x(finite_or_zero(dx_pct));
    let dy = surface.pct_to_px_y(finite_or_zero(dy_pct));
    let (s, c) = rotation_deg.to_radians().sin_cos();
    let local_dx = dx * c + dy * s;
    let local_dy = -dx * s + dy * c;

    let (hx, hy) = handle.direction();
    let w0 = surface.pct_to_px_x(start.width);
    let h0 = surface.pct_to_px_y(start.height);
    let min_w = surface.pct_to_px_x(MIN_WIDTH_PCT);
    let min_h = surface.pct_to_px_y(MIN_HEIGHT_PCT);

    let cand_w = if hx != 0.0 {
        (w0 + hx * local_dx).max(min_w)
    } else {
        w0
    };
    let cand_h = if hy != 0.0 {
        (h0 + hy * local_dy).max(min_h)
    } else {
        h0
    };

    let start_rect = to_pixels(start, surface);
    let frame = ResizeFrame {
        anchor: start_rect.center
            + rotate_vec(Vec2::new(-hx * w0 / 2.0, -hy * h0 / 2.0), rotation_deg),
        anchor_dir: (-hx, -hy),
        rotation_deg,
        surface_w: surface.safe_width(),
        surface_h: surface.safe_height(),
    };

    let (w, h) = if frame.fits(cand_w, cand_h) {
        (cand_w, cand_h)
    } else {
        let base_w = w0.max(min_w);
        let base_h = h0.max(min_h);
        if frame.fits(base_w, base_h) {
            let (jw, jh) = frame.bisect(|t| {
                (
                    base_w + (cand_w - base_w) * t,
                    base_h + (cand_h - base_h) * t,
                )
            });
            let (ww, _) = frame.bisect(|t| (jw + (cand_w - jw) * t, jh));
            frame.bisect(|t| (ww, jh + (cand_h - jh) * t))
        } else {
            // Already off-surface: allow shrinking, never growth; settle() repairs it on release.
            (cand_w.min(base_w), cand_h.min(base_h))
        }
    };

    let center = frame.center(w, h);
    FieldBox {
        x: surface.px_to_pct_x(center.x - w / 2.0),
        y: surface.px_to_pct_y(center.y - h / 2.0),
        width: surface.px_to_pct_x(w),
        height: surface.px_to_pct_y(h),
        rotation: start.rotation,
        visible: start.visible,
    }
}

/// Add `delta_deg` to `initial_deg` and normalize into `[0, 360)`.
pub fn rotate(initial_deg: f64, delta_deg: f64) -> f64 {
    let r = ((initial_deg + delta_deg) % 360.0 + 360.0) % 360.0;
    if r.is_finite() && r < 360.0 { r } else { 0.0 }
}

/// Largest size not above `(w, h)` whose rotated extent fits a `surface_w` x `surface_h` surface,
/// all in pixels.
///
/// Both sides shrink by one factor first. A side pinned at its minimum stops shrinking, so the
/// other side is then solved against whichever surface edge still overflows.
fn fit_size_px(
    w: f64,
    h: f64,
    rotation_deg: f64,
    (surface_w, surface_h): (f64, f64),
    (min_w, min_h): (f64, f64),
) -> (f64, f64) {
    let (ew, eh) = rotated_extent_px(w, h, rotation_deg);
    let k = (surface_w / ew).min(surface_h / eh).min(1.0);
    let (mut w, mut h) = ((w * k).max(min_w), (h * k).max(min_h));

    let (s, c) = rotation_deg.to_radians().sin_cos();
    let (s, c) = (s.abs(), c.abs());
    // Largest `other` with `fixed * a + other * b <= limit` for both surface axes.
    let bound = |fixed: f64, along: (f64, f64)| -> f64 {
        let (a_x, b_x) = along;
        let mut out = f64::INFINITY;
        if b_x > 1e-12 {
            out = out.min((surface_w - fixed * a_x) / b_x);
        }
        // The vertical extent swaps the roles of sin and cos.
        if a_x > 1e-12 {
            out = out.min((surface_h - fixed * b_x) / a_x);
        }
        out
    };
    h = h.min(bound(w, (c, s))).max(min_h);
    w = w.min(bound(h, (s, c))).max(min_w);
    (w, h)
}

/// Whether `b` already satisfies the at-rest rules: finite, rotation in `[0, 360)`, sizes at
/// least the minimums and the rotated extent inside the surface.
pub fn is_at_rest(b: &FieldBox, surface: Surface) -> bool {
    const EPS: f64 = 1e-9;
    if b.validate().is_err() || !(0.0..360.0).contains(&b.rotation) {
        return false;
    }
    let ext = rotated_bounding_box(b.width, b.height, b.rotation, surface);
    let (cx, cy) = b.center_pct();
    cx - ext.width / 2.0 >= -EPS
        && cx + ext.width / 2.0 <= 100.0 + EPS
        && cy - ext.height / 2.0 >= -EPS
        && cy + ext.height / 2.0 <= 100.0 + EPS
}

/// Bring a box to its at-rest form: rotation normalized, size at least the minimums and shrunk
/// if its rotated extent is larger than the surface, centre clamped onto the surface.
pub fn settle(b: &FieldBox, surface: Surface) -> FieldBox {
    let rotation = rotate(finite_or_zero(b.rotation), 0.0);
    let w_pct = finite_or_zero(b.width).max(MIN_WIDTH_PCT);
    let h_pct = finite_or_zero(b.height).max(MIN_HEIGHT_PCT);
    let (w_px, h_px) = (surface.pct_to_px_x(w_pct), surface.pct_to_px_y(h_pct));
    let (w, h) = fit_size_px(
        w_px,
        h_px,
        rotation,
        (surface.safe_width(), surface.safe_height()),
        (
            surface.pct_to_px_x(MIN_WIDTH_PCT),
            surface.pct_to_px_y(MIN_HEIGHT_PCT),
        ),
    );
    // untouched sides keep their exact percent value
    let w = if w == w_px { w_pct } else { surface.px_to_pct_x(w) };
    let h = if h == h_px { h_pct } else { surface.px_to_pct_y(h) };

    let ext = rotated_bounding_box(w, h, rotation, surface);
    let (cx, cy) = (
        finite_or_zero(b.x) + finite_or_zero(b.width) / 2.0,
        finite_or_zero(b.y) + finite_or_zero(b.height) / 2.0,
    );
    let cx = clamp_center(cx, ext.width);
    let cy = clamp_center(cy, ext.height);
    FieldBox {
        x: cx - w / 2.0,
        y: cy - h / 2.0,
        width: w,
        height: h,
        rotation,
        visible: b.visible,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
