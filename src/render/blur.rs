use crate::foundation::error::{FieldcastError, FieldcastResult};
use crate::render::composite::{PixelRegion, crop_rgba8};

/// Kernel radius and sigma for a CSS/canvas-style blur amount (`shadowBlur`), where the
/// standard deviation is half the blur value.
pub fn shadow_blur_params(blur_px: f64) -> Option<(u32, f32)> {
    if !blur_px.is_finite() || blur_px <= 0.0 {
        return None;
    }
    let sigma = blur_px / 2.0;
    let radius = (sigma * 3.0).ceil().clamp(1.0, 1024.0) as u32;
    Some((radius, sigma as f32))
}

/// Separable Gaussian blur over premultiplied RGBA8 using a Q16 fixed-point kernel.
///
/// Edges are clamped. Constant images are returned unchanged.
pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> FieldcastResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| FieldcastError::render("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(FieldcastError::render(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur only `region` of a `width` x `height` premultiplied raster; the result is region-sized.
///
/// Matches the full-raster blur inside `region` as long as every non-transparent pixel lies at
/// least `radius` pixels inside it (or against the raster edge, which both clamp the same way).
pub fn blur_region_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    region: PixelRegion,
    radius: u32,
    sigma: f32,
) -> FieldcastResult<Vec<u8>> {
    let cropped = crop_rgba8(src, width, height, region)?;
    blur_rgba8_premul(&cropped, region.width, region.height, radius, sigma)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> FieldcastResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FieldcastError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let sigma = f64::from(sigma);
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = f64::from(i);
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(FieldcastError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();

    // rounding drift goes to the centre tap so the kernel sums to exactly 1.0
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    for y in 0..i64::from(height) {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i64 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i64;
    let w = i64::from(width);
    let h = i64::from(height);
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i64 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += u64::from(kw) * u64::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    ((acc + 32768) >> 16).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
