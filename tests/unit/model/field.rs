use super::*;
use serde_json::json;

#[test]
fn field_box_accepts_rotation_alias_and_defaults_visible() {
    let b: FieldBox = serde_json::from_value(json!({
        "x": 10, "y": 20, "width": 30, "height": 10, "rotationDegrees": 45
    }))
    .unwrap();
    assert_eq!(b.rotation, 45.0);
    assert!(b.visible);

    let v = serde_json::to_value(b).unwrap();
    assert_eq!(v["rotation"], json!(45.0));
}

#[test]
fn field_box_validation_enforces_minimums() {
    FieldBox::new(0.0, 0.0, 5.0, 3.0).validate().unwrap();
    assert!(FieldBox::new(0.0, 0.0, 4.0, 3.0).validate().is_err());
    assert!(FieldBox::new(0.0, 0.0, 5.0, 2.0).validate().is_err());
    assert!(FieldBox::new(f64::NAN, 0.0, 5.0, 3.0).validate().is_err());
}

#[test]
fn style_deserializes_css_like_values() {
    let s: FieldStyle = serde_json::from_value(json!({
        "fontFamily": "DejaVu Sans",
        "fontSize": 24,
        "fontWeight": "bold",
        "fontStyle": "italic",
        "color": "#336699",
        "textAlign": "center",
        "verticalAlign": "middle",
        "textDecoration": "line-through",
        "lineHeight": 1.5,
        "stroke": { "enabled": true, "color": "#fff", "width": 3 },
        "shadow": { "enabled": true, "color": "rgba(0,0,0,0.5)", "blur": 6, "offsetX": 1, "offsetY": 2 }
    }))
    .unwrap();
    assert_eq!(s.font_weight, FontWeight::BOLD);
    assert_eq!(s.font_style, FontStyle::Italic);
    assert_eq!(s.text_align, TextAlign::Center);
    assert_eq!(s.vertical_align, VerticalAlign::Middle);
    assert_eq!(s.text_decoration, TextDecoration::LineThrough);
    assert!(s.stroke.enabled);
    assert_eq!(s.stroke.width, 3.0);
    assert_eq!(s.shadow.offset_y, 2.0);
    s.validate().unwrap();
}

#[test]
fn style_accepts_pixel_suffixed_names() {
    let s: FieldStyle = serde_json::from_value(json!({
        "lineHeightMultiplier": 1.5,
        "stroke": { "enabled": true, "color": "white", "widthPx": 3 },
        "shadow": { "enabled": true, "blurPx": 6, "offsetXPx": -2, "offsetYPx": 5 }
    }))
    .unwrap();
    assert_eq!(s.line_height, 1.5);
    assert_eq!(s.stroke.width, 3.0);
    assert_eq!(s.shadow.blur, 6.0);
    assert_eq!((s.shadow.offset_x, s.shadow.offset_y), (-2.0, 5.0));

    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["lineHeight"], json!(1.5));
    assert_eq!(v["shadow"]["offsetX"], json!(-2.0));
}

#[test]
fn font_weight_accepts_numeric_strings() {
    let w: FontWeight = serde_json::from_value(json!("600")).unwrap();
    assert_eq!(w, FontWeight(600));
    let w: FontWeight = serde_json::from_value(json!(5000)).unwrap();
    assert_eq!(w, FontWeight(1000));
    assert!(serde_json::from_value::<FontWeight>(json!("heavy-ish")).is_err());
}

#[test]
fn style_validation_rejects_bad_numbers() {
    let mut s = FieldStyle::default();
    s.validate().unwrap();
    s.line_height = 0.0;
    assert!(s.validate().is_err());

    let mut s = FieldStyle::default();
    s.font_size = -1.0;
    assert!(s.validate().is_err());

    let mut s = FieldStyle::default();
    s.shadow.blur = f64::INFINITY;
    assert!(s.validate().is_err());
}
