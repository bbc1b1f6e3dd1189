use super::*;

fn rect(id: u64, w: f64, h: f64) -> SceneObject {
    SceneObject {
        id: ObjectId(id),
        placement: Placement::centered_at(Point::new(100.0, 100.0)),
        kind: ObjectKind::Shape(ShapeBody {
            kind: ShapeKind::Rect,
            size: Size::new(w, h),
            fill: "#3B82F6".to_string(),
            corner_radius: Some(10.0),
        }),
    }
}

fn text(id: u64) -> SceneObject {
    SceneObject {
        id: ObjectId(id),
        placement: Placement::default(),
        kind: ObjectKind::Text(TextBody {
            content: "Hello".to_string(),
            font_size: 48.0,
            font_family: "Inter, sans-serif".to_string(),
            font_weight: FontWeight::W700,
            fill: "#FFFFFF".to_string(),
            extent: Size::new(150.0, 56.0),
        }),
    }
}

#[test]
fn centered_origin_bbox() {
    let r = rect(1, 200.0, 100.0);
    let bb = r.bounding_box();
    assert!((bb.x0 - 0.0).abs() < 1e-9);
    assert!((bb.y0 - 50.0).abs() < 1e-9);
    assert!((bb.x1 - 200.0).abs() < 1e-9);
    assert!((bb.y1 - 150.0).abs() < 1e-9);
}

#[test]
fn rotated_bbox_swaps_extents() {
    let mut r = rect(1, 200.0, 100.0);
    r.placement.rotation_deg = 90.0;
    let bb = r.bounding_box();
    assert!((bb.width() - 100.0).abs() < 1e-6);
    assert!((bb.height() - 200.0).abs() < 1e-6);
    assert!((bb.center().x - 100.0).abs() < 1e-6);
}

#[test]
fn position_attrs_and_opacity_clamp() {
    let mut r = rect(1, 10.0, 10.0);
    assert_eq!(r.apply(&Attr::Left(5.0)), Applied::Changed);
    assert_eq!(r.apply(&Attr::Top(7.0)), Applied::Changed);
    assert_eq!(r.apply(&Attr::Opacity(3.0)), Applied::Changed);
    assert_eq!(r.placement.position, Point::new(5.0, 7.0));
    assert_eq!(r.placement.opacity, 1.0);

    assert_eq!(r.apply(&Attr::Left(f64::NAN)), Applied::Ignored);
    assert_eq!(r.apply(&Attr::ScaleX(0.0)), Applied::Ignored);
    assert_eq!(r.placement.position.x, 5.0);
}

#[test]
fn variant_specific_attrs() {
    let mut r = rect(1, 10.0, 10.0);
    assert_eq!(r.apply(&Attr::FontSize(72.0)), Applied::Ignored);
    assert_eq!(r.apply(&Attr::Fill("not a color".to_string())), Applied::Ignored);
    assert_eq!(r.apply(&Attr::Fill(" #ff0000 ".to_string())), Applied::Changed);
    assert_eq!(r.fill(), Some("#ff0000"));
    assert_eq!(r.apply(&Attr::CornerRadius(-1.0)), Applied::Ignored);
    assert_eq!(r.apply(&Attr::CornerRadius(4.0)), Applied::Changed);

    let mut t = text(2);
    assert_eq!(t.apply(&Attr::FontSize(72.0)), Applied::ChangedText);
    assert_eq!(t.apply(&Attr::CornerRadius(4.0)), Applied::Ignored);
    assert_eq!(t.apply(&Attr::FontFamily("  ".to_string())), Applied::Ignored);
    assert_eq!(t.apply(&Attr::Content(String::new())), Applied::ChangedText);
    let ObjectKind::Text(body) = &t.kind else {
        panic!("expected text");
    };
    assert_eq!(body.font_size, 72.0);
    assert_eq!(body.content, "");
}

#[test]
fn width_resizes_shapes_and_rescales_text() {
    let mut r = rect(1, 10.0, 10.0);
    r.apply(&Attr::Width(40.0));
    assert_eq!(r.native_size(), Size::new(40.0, 10.0));

    let mut c = rect(1, 10.0, 10.0);
    if let ObjectKind::Shape(s) = &mut c.kind {
        s.kind = ShapeKind::Circle;
    }
    c.apply(&Attr::Height(30.0));
    assert_eq!(c.native_size(), Size::new(30.0, 30.0));

    let mut t = text(2);
    t.apply(&Attr::Width(300.0));
    assert!((t.placement.scale.x - 2.0).abs() < 1e-9);
    assert!((t.scaled_size().width - 300.0).abs() < 1e-9);
}

#[test]
fn background_is_locked() {
    let mut bg = SceneObject {
        id: ObjectId(9),
        placement: Placement::default(),
        kind: ObjectKind::Background(BackgroundBody {
            template_id: "t".to_string(),
            image: PreparedImage::solid(4, 4, [0, 0, 0, 255]).unwrap(),
        }),
    };
    assert!(!bg.is_selectable());
    assert_eq!(bg.apply(&Attr::Left(10.0)), Applied::Ignored);
    assert_eq!(bg.native_size(), Size::new(4.0, 4.0));
}

#[test]
fn font_weight_tables() {
    assert_eq!(FontWeight::W600.label(), "Semi Bold");
    assert_eq!(FontWeight::Normal.css_value(), "normal");
    assert_eq!("bold".parse::<FontWeight>().unwrap(), FontWeight::W700);
    assert_eq!("800".parse::<FontWeight>().unwrap().numeric(), 800);
    assert!("900".parse::<FontWeight>().is_err());
    assert_eq!(ObjectId(3).to_string(), "obj-3");
}
