use super::*;
use crate::scene::object::{ShapeBody, ShapeKind};

fn shape() -> ObjectKind {
    ObjectKind::Shape(ShapeBody {
        kind: ShapeKind::Rect,
        size: Size::new(20.0, 10.0),
        fill: "#3B82F6".to_string(),
        corner_radius: None,
    })
}

fn text(content: &str) -> ObjectKind {
    ObjectKind::Text(TextBody {
        content: content.to_string(),
        font_size: 10.0,
        font_family: "sans-serif".to_string(),
        font_weight: Default::default(),
        fill: "#FFFFFF".to_string(),
        extent: Size::ZERO,
    })
}

fn assert_size(s: Size, w: f64, h: f64) {
    assert!((s.width - w).abs() < 1e-9, "width {} != {w}", s.width);
    assert!((s.height - h).abs() < 1e-9, "height {} != {h}", s.height);
}

fn ids(g: &SceneGraph) -> Vec<ObjectId> {
    g.objects().iter().map(|o| o.id).collect()
}

fn install(g: &mut SceneGraph, template: &str) -> ObjectId {
    let img = PreparedImage::solid(8, 8, [0, 0, 0, 255]).unwrap();
    g.install_background(Canvas::new(8, 8).unwrap(), template, img)
}

#[test]
fn add_appends_and_selects() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    let b = g.add_object(shape(), Placement::default());
    assert_ne!(a, b);
    assert_eq!(ids(&g), vec![a, b]);
    assert_eq!(g.selection(), &[b]);
    assert_eq!(
        g.drain_events(),
        vec![
            SceneEvent::Added(a),
            SceneEvent::SelectionChanged,
            SceneEvent::Added(b),
            SceneEvent::SelectionChanged,
        ]
    );
    assert!(g.drain_events().is_empty());
}

#[test]
fn text_extent_is_measured_on_add_and_edit() {
    let mut g = SceneGraph::new(Canvas::default());
    let t = g.add_object(text("abcd"), Placement::default());
    assert_size(g.object(t).unwrap().native_size(), 24.0, 11.6);

    assert!(g.update_object_attribute(t, Attr::Content("ab".to_string())));
    assert_size(g.object(t).unwrap().native_size(), 12.0, 11.6);

    assert!(g.update_object_attribute(t, Attr::FontSize(20.0)));
    assert_size(g.object(t).unwrap().native_size(), 24.0, 23.2);
}

#[test]
fn remove_is_idempotent_and_shrinks_selection() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    let b = g.add_object(shape(), Placement::default());
    g.set_selection([a, b]);
    assert_eq!(g.selection(), &[a, b]);

    assert!(g.remove_object(a));
    assert_eq!(g.selection(), &[b]);
    let rev = g.revision();
    assert!(!g.remove_object(a));
    assert_eq!(g.revision(), rev);
    assert_eq!(ids(&g), vec![b]);
}

#[test]
fn selection_filters_unknown_duplicate_and_background() {
    let mut g = SceneGraph::new(Canvas::default());
    let bg = install(&mut g, "t");
    let a = g.add_object(shape(), Placement::default());

    g.set_selection([bg, a, a, ObjectId(999)]);
    assert_eq!(g.selection(), &[a]);

    g.set_selection([bg]);
    assert!(g.selection().is_empty());
}

#[test]
fn selection_revision_only_moves_on_change() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    let rev = g.selection_revision();
    g.set_selection([a]);
    assert_eq!(g.selection_revision(), rev);
    g.clear_selection();
    assert_eq!(g.selection_revision(), rev + 1);
}

#[test]
fn update_missing_object_is_noop() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    g.remove_object(a);
    let rev = g.revision();
    assert!(!g.update_object_attribute(a, Attr::Left(1.0)));
    assert_eq!(g.revision(), rev);
}

#[test]
fn reorder_round_trip_and_clamping() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    let b = g.add_object(shape(), Placement::default());
    let c = g.add_object(shape(), Placement::default());

    assert!(g.reorder(b, ReorderDirection::Forward));
    assert_eq!(ids(&g), vec![a, c, b]);
    assert!(g.reorder(b, ReorderDirection::Backward));
    assert_eq!(ids(&g), vec![a, b, c]);

    assert!(!g.reorder(c, ReorderDirection::Forward));
    assert!(!g.reorder(a, ReorderDirection::Backward));
    assert!(!g.reorder(ObjectId(42), ReorderDirection::Forward));
    assert_eq!(ids(&g), vec![a, b, c]);
}

#[test]
fn reorder_never_passes_background() {
    let mut g = SceneGraph::new(Canvas::default());
    let bg = install(&mut g, "t");
    let a = g.add_object(shape(), Placement::default());

    assert!(!g.reorder(a, ReorderDirection::Backward));
    assert!(!g.reorder(bg, ReorderDirection::Forward));
    assert_eq!(ids(&g), vec![bg, a]);
}

#[test]
fn install_background_clears_resizes_and_stays_unique() {
    let mut g = SceneGraph::new(Canvas::default());
    g.add_object(shape(), Placement::default());
    let epoch = g.scene_epoch();

    let first = install(&mut g, "a");
    let second = install(&mut g, "b");
    assert_eq!(g.scene_epoch(), epoch + 2);
    assert_eq!(g.len(), 1);
    assert_eq!(g.canvas(), Canvas::new(8, 8).unwrap());

    let bg = g.background().unwrap();
    assert_eq!(bg.id, second);
    assert_ne!(bg.id, first);
    assert!(g.selection().is_empty());
    let ObjectKind::Background(body) = &bg.kind else {
        panic!("expected background");
    };
    assert_eq!(body.template_id, "b");
}

#[test]
fn reinstalling_background_resizes_and_replaces() {
    let mut g = SceneGraph::new(Canvas::default());
    let bg1 = install(&mut g, "a");
    let epoch = g.scene_epoch();

    let img = PreparedImage::solid(2, 2, [0, 0, 0, 255]).unwrap();
    let bg2 = g.install_background(Canvas::new(1080, 1920).unwrap(), "b", img);
    assert_ne!(bg1, bg2);
    assert_eq!(ids(&g), vec![bg2]);
    assert_eq!(g.canvas(), Canvas::new(1080, 1920).unwrap());
    assert!(g.scene_epoch() > epoch);
    assert!(g.selection().is_empty());

    let a = g.add_object(shape(), Placement::default());
    assert_eq!(ids(&g), vec![bg2, a]);
}

#[test]
fn canvas_resize_keeps_objects_and_ignores_zero() {
    let mut g = SceneGraph::new(Canvas::default());
    let a = g.add_object(shape(), Placement::default());
    assert!(g.set_canvas_size(1200, 675));
    assert!(!g.set_canvas_size(0, 675));
    assert!(!g.set_canvas_size(1200, 675));
    assert_eq!(g.canvas(), Canvas::new(1200, 675).unwrap());
    assert_eq!(ids(&g), vec![a]);
}

#[test]
fn clear_resets_everything() {
    let mut g = SceneGraph::new(Canvas::default());
    install(&mut g, "t");
    g.add_object(shape(), Placement::default());
    g.clear();
    assert!(g.is_empty());
    assert!(g.selection().is_empty());
    assert!(g.background().is_none());
}
