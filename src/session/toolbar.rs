use std::cell::RefCell;

use crate::assets::decode::decode_image;
use crate::assets::source::{ImageSource, SourceLoader};
use crate::foundation::core::{AspectRatio, Size};
use crate::foundation::error::EditorResult;
use crate::scene::object::{
    FontWeight, ImageBody, ObjectId, ObjectKind, Placement, ShapeBody, ShapeKind, TextBody,
};
use crate::session::editor::{EditorSession, NoticeLevel};

pub const NEW_TEXT_CONTENT: &str = "Double-click to edit";
pub const NEW_TEXT_FAMILY: &str = "Inter, sans-serif";
pub const NEW_TEXT_SIZE: f64 = 48.0;
pub const NEW_SHAPE_FILL: &str = "#3B82F6";

/// How large an added image may be, relative to the canvas's shorter side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFit {
    /// Toolbar upload: at most 50%.
    Upload,
    /// Asset library pick: at most 30%.
    Asset,
}

impl ImageFit {
    pub fn max_fraction(self) -> f64 {
        match self {
            ImageFit::Upload => 0.5,
            ImageFit::Asset => 0.3,
        }
    }

    /// Uniform scale that fits `size` inside the allowed box, never enlarging.
    pub fn scale_for(self, size: Size, canvas_min_side: f64) -> f64 {
        let max = canvas_min_side * self.max_fraction();
        if size.width <= 0.0 || size.height <= 0.0 {
            return 1.0;
        }
        (max / size.width).min(max / size.height).min(1.0)
    }
}

impl EditorSession {
    /// Add the default text object at the canvas center.
    pub fn add_text(&mut self) -> ObjectId {
        let center = self.scene().canvas().center();
        self.scene_mut().add_object(
            ObjectKind::Text(TextBody {
                content: NEW_TEXT_CONTENT.to_string(),
                font_size: NEW_TEXT_SIZE,
                font_family: NEW_TEXT_FAMILY.to_string(),
                font_weight: FontWeight::W700,
                fill: "#FFFFFF".to_string(),
                extent: Size::ZERO,
            }),
            Placement::centered_at(center),
        )
    }

    /// Add a 200×200 rounded rectangle at the canvas center.
    pub fn add_rectangle(&mut self) -> ObjectId {
        let center = self.scene().canvas().center();
        self.scene_mut().add_object(
            ObjectKind::Shape(ShapeBody {
                kind: ShapeKind::Rect,
                size: Size::new(200.0, 200.0),
                fill: NEW_SHAPE_FILL.to_string(),
                corner_radius: Some(10.0),
            }),
            Placement::centered_at(center),
        )
    }

    /// Add a circle of radius 100 at the canvas center.
    pub fn add_circle(&mut self) -> ObjectId {
        let center = self.scene().canvas().center();
        self.scene_mut().add_object(
            ObjectKind::Shape(ShapeBody {
                kind: ShapeKind::Circle,
                size: Size::new(200.0, 200.0),
                fill: NEW_SHAPE_FILL.to_string(),
                corner_radius: None,
            }),
            Placement::centered_at(center),
        )
    }

    /// Remove every selected object. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let selected = self.scene().selection().to_vec();
        let mut removed = 0;
        for id in selected {
            if self.scene_mut().remove_object(id) {
                removed += 1;
            }
        }
        removed
    }

    /// Toolbar size selector: resize only, objects stay where they are.
    pub fn select_aspect_ratio(&mut self, ratio: AspectRatio) -> bool {
        let canvas = ratio.canvas();
        self.scene_mut().set_canvas_size(canvas.width, canvas.height)
    }
}

/// Load, decode, and add an image centered on the canvas.
///
/// No session borrow is held across the load. Returns `Ok(None)` when the scene was cleared (for
/// example by a template switch) while the image was loading. Load and decode failures leave the
/// scene untouched, push a notice, and are returned.
#[tracing::instrument(skip(session, loader, source), fields(source = %source.describe()))]
pub async fn add_image<L: SourceLoader>(
    session: &RefCell<EditorSession>,
    loader: &L,
    source: ImageSource,
    fit: ImageFit,
) -> EditorResult<Option<ObjectId>> {
    let epoch = session.borrow().scene().scene_epoch();

    let decoded = match loader.load(&source).await {
        Ok(bytes) => decode_image(&bytes),
        Err(e) => Err(e),
    };
    let image = match decoded {
        Ok(image) => image,
        Err(e) => {
            session.borrow_mut().notify(
                NoticeLevel::Error,
                format!("Could not load image {}: {e}", source.describe()),
            );
            return Err(e);
        }
    };

    let mut s = session.borrow_mut();
    if s.scene().scene_epoch() != epoch {
        tracing::debug!("scene cleared while image was loading; dropping result");
        return Ok(None);
    }

    let canvas = s.scene().canvas();
    let size = Size::new(f64::from(image.width), f64::from(image.height));
    let scale = fit.scale_for(size, canvas.min_side());
    let placement = Placement::centered_at(canvas.center()).with_scale(scale, scale);
    let id = s
        .scene_mut()
        .add_object(ObjectKind::Image(ImageBody { source, image }), placement);
    Ok(Some(id))
}

#[cfg(test)]
#[path = "../../tests/unit/session/toolbar.rs"]
mod tests;
