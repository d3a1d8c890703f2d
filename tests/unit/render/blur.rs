use super::*;

#[test]
fn radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap(), src);
}

#[test]
fn constant_image_is_unchanged() {
    let (w, h) = (4u32, 3u32);
    let src = [10u8, 20, 30, 40].repeat((w * h) as usize);
    assert_eq!(blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap(), src);
}

#[test]
fn single_pixel_spreads_and_conserves_energy() {
    let (w, h) = (7u32, 7u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

    let out = blur_rgba8_premul(&src, w, h, 2, 1.2).unwrap();
    assert!(out.chunks_exact(4).filter(|px| px[3] != 0).count() > 1);
    let sum_a: i32 = out.chunks_exact(4).map(|px| i32::from(px[3])).sum();
    assert!((sum_a - 255).abs() <= 6, "{sum_a}");
    assert!(out[center + 3] < 255);
}

#[test]
fn mismatched_buffer_is_rejected() {
    assert!(blur_rgba8_premul(&[0u8; 7], 1, 2, 1, 1.0).is_err());
    assert!(blur_rgba8_premul(&[0u8; 8], 1, 2, 1, 0.0).is_err());
}

#[test]
fn shadow_blur_maps_to_half_sigma() {
    assert_eq!(shadow_blur_params(0.0), None);
    assert_eq!(shadow_blur_params(f64::NAN), None);
    assert_eq!(shadow_blur_params(4.0), Some((6, 2.0)));
    assert_eq!(shadow_blur_params(0.1), Some((1, 0.05)));
}

#[test]
fn region_blur_matches_the_full_blur_around_sparse_ink() {
    let (w, h) = (40u32, 30u32);
    let mut src = vec![0u8; (w * h * 4) as usize];
    for (x, y) in [(10u32, 12u32), (11, 12), (12, 14), (0, 29)] {
        let i = ((y * w + x) * 4) as usize;
        src[i..i + 4].copy_from_slice(&[200, 100, 50, 200]);
    }
    let (radius, sigma) = (3, 1.5);
    let full = blur_rgba8_premul(&src, w, h, radius, sigma).unwrap();

    // ink spans (0..=12, 12..=29); grow by the kernel radius and clip
    let region = PixelRegion {
        x: 0,
        y: 9,
        width: 16,
        height: 21,
    };
    let part = blur_region_rgba8_premul(&src, w, h, region, radius, sigma).unwrap();
    assert_eq!(part, crop_rgba8(&full, w, h, region).unwrap());
}
