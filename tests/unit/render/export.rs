use super::*;
use crate::assets::fonts::FontBook;
use crate::foundation::core::Canvas;
use crate::session::editor::EditorOpts;
use std::sync::Arc;

fn small_session() -> EditorSession {
    let opts = EditorOpts::default().with_default_canvas(Canvas::new(30, 20).unwrap());
    EditorSession::new(opts, Arc::new(FontBook::empty()))
}

#[test]
fn file_names() {
    assert_eq!(export_file_name("ShapeShift", Some("quote-card")), "ShapeShift-quote-card.png");
    assert_eq!(export_file_name("ShapeShift", None), "ShapeShift-design.png");
    assert_eq!(export_file_name("A/B: Co", Some("x")), "A_B_ Co-x.png");
    assert_eq!(export_file_name("  ", Some("")), "brand-design.png");
}

#[test]
fn export_is_supersampled_png() {
    let session = small_session();
    let out = export_png(&session, 2.0).unwrap();
    assert_eq!((out.width, out.height), (60, 40));
    assert_eq!(out.file_name, "ShapeShift-design.png");

    let decoded = image::load_from_memory(&out.png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (60, 40));
    assert_eq!(decoded.get_pixel(59, 39).0, [0x0A, 0x0B, 0x0D, 0xFF]);
}

#[test]
fn invalid_ratio_is_rejected() {
    let session = small_session();
    assert!(export_png(&session, 0.0).is_err());
}

#[test]
fn write_to_creates_directory() {
    let dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("target")
        .join("test-fixtures")
        .join("export-write")
        .join("nested");
    let _ = std::fs::remove_dir_all(&dir);

    let out = export_png(&small_session(), 1.0).unwrap();
    let path = out.write_to(&dir).unwrap();
    assert_eq!(path, dir.join("ShapeShift-design.png"));
    assert_eq!(std::fs::read(&path).unwrap(), out.png);
}

#[test]
fn straight_frames_encode_unchanged() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![10, 20, 30, 40],
        premultiplied: false,
    };
    let png = encode_png(&frame).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 40]);
}
