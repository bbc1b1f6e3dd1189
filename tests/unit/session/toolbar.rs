use super::*;
use crate::assets::source::FsLoader;
use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::EditorError;
use std::sync::Arc;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

fn data_source(bytes: Vec<u8>) -> ImageSource {
    ImageSource::Data {
        mime: "image/png".to_string(),
        bytes: Arc::new(bytes),
    }
}

struct GateLoader {
    gate: RefCell<Option<tokio::sync::oneshot::Receiver<()>>>,
    bytes: Vec<u8>,
}

impl SourceLoader for GateLoader {
    async fn load(&self, _source: &ImageSource) -> EditorResult<Vec<u8>> {
        let gate = self.gate.borrow_mut().take();
        if let Some(rx) = gate {
            let _ = rx.await;
        }
        Ok(self.bytes.clone())
    }
}

#[test]
fn add_text_uses_toolbar_defaults() {
    let mut session = EditorSession::with_defaults();
    let id = session.add_text();
    let obj = session.scene().object(id).unwrap();
    assert_eq!(session.scene().selection(), &[id]);
    assert_eq!(obj.placement.position, Point::new(540.0, 540.0));

    let ObjectKind::Text(body) = &obj.kind else {
        panic!("expected text");
    };
    assert_eq!(body.content, NEW_TEXT_CONTENT);
    assert_eq!(body.font_size, 48.0);
    assert_eq!(body.font_weight, FontWeight::W700);
    assert_eq!(body.fill, "#FFFFFF");
    assert!(body.extent.width > 0.0);

    let bb = obj.bounding_box();
    assert!((bb.center().x - 540.0).abs() < 1e-9);
}

#[test]
fn add_shapes_centered() {
    let mut session = EditorSession::with_defaults();
    let r = session.add_rectangle();
    let c = session.add_circle();

    let rect = session.scene().object(r).unwrap();
    assert_eq!(rect.native_size(), Size::new(200.0, 200.0));
    let bb = rect.bounding_box();
    assert!((bb.x0 - 440.0).abs() < 1e-9);

    let ObjectKind::Shape(circle) = &session.scene().object(c).unwrap().kind else {
        panic!("expected shape");
    };
    assert_eq!(circle.kind, ShapeKind::Circle);
    assert_eq!(circle.corner_radius, None);
    assert_eq!(session.scene().selection(), &[c]);
}

#[test]
fn delete_selected_removes_all_selected() {
    let mut session = EditorSession::with_defaults();
    let a = session.add_rectangle();
    let b = session.add_circle();
    let t = session.add_text();
    session.scene_mut().set_selection([a, t]);

    assert_eq!(session.delete_selected(), 2);
    assert!(session.scene().selection().is_empty());
    let left: Vec<_> = session.scene().objects().iter().map(|o| o.id).collect();
    assert_eq!(left, vec![b]);
    assert_eq!(session.delete_selected(), 0);
}

#[test]
fn aspect_ratio_switch_resizes_without_clearing() {
    let mut session = EditorSession::with_defaults();
    let a = session.add_rectangle();
    assert!(session.select_aspect_ratio(AspectRatio::Portrait));
    assert_eq!(session.scene().canvas(), Canvas::new(1080, 1920).unwrap());
    assert!(session.scene().object(a).is_some());
    assert!(!session.select_aspect_ratio(AspectRatio::Portrait));
}

#[test]
fn image_fit_never_enlarges() {
    let s = ImageFit::Upload.scale_for(Size::new(100.0, 50.0), 1080.0);
    assert_eq!(s, 1.0);
    let s = ImageFit::Upload.scale_for(Size::new(1200.0, 600.0), 1080.0);
    assert!((s - 0.45).abs() < 1e-9);
    let s = ImageFit::Asset.scale_for(Size::new(600.0, 1200.0), 1000.0);
    assert!((s - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn add_image_decodes_scales_and_selects() {
    let session = RefCell::new(EditorSession::with_defaults());
    let loader = FsLoader::new("target");

    let id = add_image(&session, &loader, data_source(png_bytes(1200, 600)), ImageFit::Upload)
        .await
        .unwrap()
        .unwrap();

    let s = session.borrow();
    let obj = s.scene().object(id).unwrap();
    assert_eq!(obj.native_size(), Size::new(1200.0, 600.0));
    assert!((obj.placement.scale.x - 0.45).abs() < 1e-9);
    assert!((obj.scaled_size().width - 540.0).abs() < 1e-6);
    assert_eq!(s.scene().selection(), &[id]);
}

#[tokio::test]
async fn add_image_decode_failure_leaves_scene_untouched() {
    let session = RefCell::new(EditorSession::with_defaults());
    let existing = session.borrow_mut().add_rectangle();
    let rev = session.borrow().scene().revision();
    let loader = FsLoader::new("target");

    let err = add_image(&session, &loader, data_source(b"garbage".to_vec()), ImageFit::Upload)
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::Decode(_)));

    let s = session.borrow();
    assert_eq!(s.scene().revision(), rev);
    assert_eq!(s.scene().len(), 1);
    assert_eq!(s.scene().selection(), &[existing]);
    assert_eq!(s.notices().len(), 1);
    assert_eq!(s.notices()[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn add_image_missing_file_is_reported() {
    let session = RefCell::new(EditorSession::with_defaults());
    let loader = FsLoader::new("target/does-not-exist");
    let source = ImageSource::parse("/images/missing.png").unwrap();

    assert!(add_image(&session, &loader, source, ImageFit::Asset).await.is_err());
    assert!(session.borrow().scene().is_empty());
    assert!(session.borrow().notices()[0].message.contains("missing.png"));
}

#[tokio::test]
async fn add_image_is_dropped_when_scene_cleared_meanwhile() {
    let session = RefCell::new(EditorSession::with_defaults());
    let (tx, rx) = tokio::sync::oneshot::channel();
    let loader = GateLoader {
        gate: RefCell::new(Some(rx)),
        bytes: png_bytes(4, 4),
    };

    let add = add_image(&session, &loader, data_source(Vec::new()), ImageFit::Upload);
    let clear = async {
        session.borrow_mut().scene_mut().clear();
        let _ = tx.send(());
    };
    let (res, ()) = tokio::join!(add, clear);

    assert_eq!(res.unwrap(), None);
    assert!(session.borrow().scene().is_empty());
    assert!(session.borrow().notices().is_empty());
}
