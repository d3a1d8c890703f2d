use super::*;
use crate::model::record::Record;
use crate::model::template::Template;
use crate::render::orchestrator::render_record;
use crate::text::fonts::FontBook;

const DEJAVU: &[u8] = include_bytes!("../../data/fonts/DejaVuSans.ttf");

fn near(px: [u8; 4], want: [u8; 4]) -> bool {
    px.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= 2)
}

fn frame(f: impl FnOnce(&mut CpuSurface)) -> FrameRGBA {
    let mut s = CpuSurface::new(Surface::new(4, 4), &RenderOpts::default()).unwrap();
    f(&mut s);
    s.into_frame().unwrap()
}

#[test]
fn empty_surface_is_the_clear_color() {
    let out = frame(|_| {});
    assert!(out.premultiplied);
    assert_eq!(out.pixel(3, 3), Some([0, 0, 0, 255]));
}

#[test]
fn degenerate_surfaces_are_rejected() {
    assert!(CpuSurface::new(Surface::new(0, 4), &RenderOpts::default()).is_err());
    assert!(CpuSurface::new(Surface::new(70_000, 4), &RenderOpts::default()).is_err());
}

#[test]
fn background_is_stretched_over_the_surface() {
    let bg = BackgroundImage::from_straight_rgba8(2, 2, [255, 0, 0, 255].repeat(4)).unwrap();
    let out = frame(|s| s.draw_background(&bg).unwrap());
    for (x, y) in [(0, 0), (1, 2), (3, 3)] {
        assert!(near(out.pixel(x, y).unwrap(), [255, 0, 0, 255]));
    }
}

#[test]
fn rects_follow_the_current_transform() {
    let out = frame(|s| {
        s.set_transform(Affine::translate((2.0, 0.0)));
        s.fill_rect(Rect::new(0.0, 0.0, 2.0, 4.0), Color::WHITE)
            .unwrap();
    });
    assert!(near(out.pixel(2, 1).unwrap(), [255, 255, 255, 255]));
    assert!(near(out.pixel(0, 1).unwrap(), [0, 0, 0, 255]));
}

#[test]
fn shadow_is_offset_in_screen_space_and_under_the_fill() {
    let opts = RenderOpts::default().with_clear_rgba([255, 255, 255, 255]);
    let mut s = CpuSurface::new(Surface::new(4, 4), &opts).unwrap();
    s.set_shadow(Some(ShadowPaint {
        color: Color::BLACK,
        blur: 0.0,
        offset: crate::foundation::core::Vec2::new(1.0, 0.0),
    }))
    .unwrap();
    s.fill_rect(Rect::new(0.0, 0.0, 2.0, 4.0), Color::rgb(255, 0, 0))
        .unwrap();
    s.set_shadow(None).unwrap();
    let out = s.into_frame().unwrap();

    assert!(near(out.pixel(1, 0).unwrap(), [255, 0, 0, 255]));
    assert!(near(out.pixel(2, 0).unwrap(), [0, 0, 0, 255]));
    assert!(near(out.pixel(3, 0).unwrap(), [255, 255, 255, 255]));
}

#[test]
fn blurred_shadow_spreads_only_around_its_ink() {
    let opts = RenderOpts::default().with_clear_rgba([255, 255, 255, 255]);
    let mut s = CpuSurface::new(Surface::new(64, 64), &opts).unwrap();
    s.set_shadow(Some(ShadowPaint {
        color: Color::BLACK,
        blur: 4.0,
        offset: crate::foundation::core::Vec2::new(4.0, 4.0),
    }))
    .unwrap();
    s.fill_rect(Rect::new(20.0, 20.0, 30.0, 30.0), Color::rgb(255, 0, 0))
        .unwrap();
    s.set_shadow(None).unwrap();
    let out = s.into_frame().unwrap();

    assert!(near(out.pixel(22, 22).unwrap(), [255, 0, 0, 255]));
    let edge = out.pixel(35, 27).unwrap();
    assert!(edge[0] < 250 && edge[0] > 0, "{edge:?}");
    assert_eq!(out.pixel(60, 60).unwrap(), [255, 255, 255, 255]);
    assert_eq!(out.pixel(2, 2).unwrap(), [255, 255, 255, 255]);
}

#[test]
fn text_is_rasterized_with_a_registered_font() {
    let mut fonts = FontBook::new();
    fonts.register_font(DEJAVU.to_vec()).unwrap();
    let mut t = Template::with_columns(["title"]);
    t.style_mut("title").unwrap().font_family = "DejaVu Sans".into();
    let r: Record = [("title", "Hello")].into_iter().collect();
    let surface = Surface::new(800, 600);

    let out = render_record(&BackgroundImage::solid(Color::WHITE), surface, &t, &r, &mut fonts)
        .unwrap();
    assert_eq!((out.width, out.height), (800, 600));

    let dark = out
        .data
        .chunks_exact(4)
        .filter(|px| px[0] < 128 && px[3] == 255)
        .count();
    assert!(dark > 20, "expected inked pixels, got {dark}");
    // text stays inside the box (x 10%..40%)
    assert!(near(out.pixel(790, 590).unwrap(), [255, 255, 255, 255]));
}
