use super::*;

#[test]
fn zero_opacity_or_transparent_source_is_noop() {
    let dst = [1, 2, 3, 4];
    assert_eq!(over(dst, [200, 200, 200, 200], 0.0), dst);
    assert_eq!(over(dst, [0, 0, 0, 0], 1.0), dst);
}

#[test]
fn opaque_source_replaces_destination() {
    assert_eq!(over([10, 20, 30, 255], [255, 0, 0, 255], 1.0), [255, 0, 0, 255]);
}

#[test]
fn half_transparent_source_blends() {
    let out = over([0, 0, 255, 255], [128, 0, 0, 128], 1.0);
    assert_eq!(out[3], 255);
    assert_eq!(out[0], 128);
    assert_eq!(out[2], 127);
}

#[test]
fn in_place_checks_lengths() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    over_in_place(&mut dst, &[255, 255, 255, 255, 0, 0, 0, 0], 1.0).unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255, 0, 0, 0, 0]);
}

#[test]
fn regions_are_padded_and_clipped_to_the_raster() {
    let r = PixelRegion::covering(Rect::new(2.2, 3.0, 5.5, 4.0), 1.0, 10, 5).unwrap();
    assert_eq!(
        r,
        PixelRegion {
            x: 1,
            y: 2,
            width: 6,
            height: 3
        }
    );
    assert_eq!(PixelRegion::covering(Rect::new(20.0, 0.0, 30.0, 2.0), 1.0, 10, 5), None);
    assert_eq!(
        PixelRegion::covering(Rect::new(f64::NAN, 0.0, 1.0, 1.0), 0.0, 10, 5),
        Some(PixelRegion::full(10, 5))
    );
}

#[test]
fn region_composite_touches_only_the_region() {
    let (w, h) = (4u32, 3u32);
    let mut dst = [0u8, 0, 0, 255].repeat((w * h) as usize);
    let region = PixelRegion {
        x: 1,
        y: 1,
        width: 2,
        height: 2,
    };
    let src = [255u8, 255, 255, 255].repeat(4);
    over_region_in_place(&mut dst, w, &src, region, 1.0).unwrap();

    let white: Vec<usize> = dst
        .chunks_exact(4)
        .enumerate()
        .filter(|(_, px)| px[0] == 255)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(white, vec![5, 6, 9, 10]);
    assert_eq!(crop_rgba8(&dst, w, h, region).unwrap(), src);
    assert!(over_region_in_place(&mut dst, w, &src[..8], region, 1.0).is_err());
}
