//! Form model for the single selected object.

use crate::scene::graph::SceneGraph;
use crate::scene::object::{Attr, ObjectId, ObjectKind, SceneObject};

pub use crate::scene::object::FontWeight;

/// Slider increment for opacity; typed values are accepted at any precision.
pub const OPACITY_STEP: f64 = 0.1;

/// Variant-specific inspector fields.
#[derive(Clone, Debug, PartialEq)]
pub enum VariantFields {
    Text {
        font_size: f64,
        fill: String,
        font_weight: FontWeight,
    },
    Shape {
        fill: String,
    },
    Image,
}

/// Snapshot of the selected object's editable attributes.
///
/// `left`, `top` and `angle` are rounded for display. `width` and `height` are the
/// rotation-aware bounding box size and are read-only here.
#[derive(Clone, Debug, PartialEq)]
pub struct InspectorFields {
    pub target: ObjectId,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub angle: f64,
    pub opacity: f64,
    pub variant: VariantFields,
}

impl InspectorFields {
    fn from_object(obj: &SceneObject) -> Option<Self> {
        let variant = match &obj.kind {
            ObjectKind::Text(t) => VariantFields::Text {
                font_size: t.font_size,
                fill: t.fill.clone(),
                font_weight: t.font_weight,
            },
            ObjectKind::Shape(s) => VariantFields::Shape {
                fill: s.fill.clone(),
            },
            ObjectKind::Image(_) => VariantFields::Image,
            ObjectKind::Background(_) => return None,
        };
        let p = &obj.placement;
        let size = obj.bounding_box().size();
        Some(Self {
            target: obj.id,
            left: p.position.x.round(),
            top: p.position.y.round(),
            width: size.width.round(),
            height: size.height.round(),
            angle: p.rotation_deg.round(),
            opacity: p.opacity,
            variant,
        })
    }

    /// Opacity as a whole percentage for display.
    pub fn opacity_percent(&self) -> u8 {
        (self.opacity.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InspectorState {
    /// Zero or several objects selected.
    #[default]
    Empty,
    Editing(InspectorFields),
}

/// One field edit coming from the form.
#[derive(Clone, Debug, PartialEq)]
pub enum InspectorEdit {
    Left(f64),
    Top(f64),
    Angle(f64),
    Opacity(f64),
    FontSize(f64),
    Fill(String),
    FontWeight(FontWeight),
}

impl InspectorEdit {
    fn to_attr(&self) -> Attr {
        match self {
            InspectorEdit::Left(v) => Attr::Left(*v),
            InspectorEdit::Top(v) => Attr::Top(*v),
            InspectorEdit::Angle(v) => Attr::Angle(*v),
            InspectorEdit::Opacity(v) => Attr::Opacity(*v),
            InspectorEdit::FontSize(v) => Attr::FontSize(*v),
            InspectorEdit::Fill(c) => Attr::Fill(c.clone()),
            InspectorEdit::FontWeight(w) => Attr::FontWeight(*w),
        }
    }
}

/// Keeps a form snapshot in step with the scene's selection.
///
/// The snapshot is tied to the selection revision it was derived from. An edit arriving after
/// the selection moved on is dropped and the snapshot re-derived, so a write can never land on
/// an object the user is no longer looking at.
#[derive(Clone, Debug, Default)]
pub struct Inspector {
    state: InspectorState,
    synced_revision: Option<u64>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    pub fn fields(&self) -> Option<&InspectorFields> {
        match &self.state {
            InspectorState::Editing(f) => Some(f),
            InspectorState::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.state, InspectorState::Empty)
    }

    /// Re-derive if the selection changed since the last sync. Returns whether it re-derived.
    pub fn sync(&mut self, scene: &SceneGraph) -> bool {
        if self.synced_revision == Some(scene.selection_revision()) {
            return false;
        }
        self.refresh(scene);
        true
    }

    /// Re-derive unconditionally, e.g. after the object was moved on the canvas.
    pub fn refresh(&mut self, scene: &SceneGraph) {
        self.synced_revision = Some(scene.selection_revision());
        self.state = scene
            .single_selection()
            .and_then(InspectorFields::from_object)
            .map_or(InspectorState::Empty, InspectorState::Editing);
    }

    /// Write one field through to the scene and mirror it locally.
    ///
    /// Returns `false` when the edit was dropped: stale snapshot, nothing being edited, target
    /// gone, or a value the object rejected. In every such case the snapshot is re-derived.
    pub fn edit(&mut self, scene: &mut SceneGraph, edit: InspectorEdit) -> bool {
        if self.synced_revision != Some(scene.selection_revision()) {
            tracing::debug!(?edit, "inspector edit dropped after selection change");
            self.refresh(scene);
            return false;
        }
        let InspectorState::Editing(fields) = &mut self.state else {
            return false;
        };

        if !scene.update_object_attribute(fields.target, edit.to_attr()) {
            self.refresh(scene);
            return false;
        }

        let target = fields.target;
        let resized = matches!(edit, InspectorEdit::Angle(_) | InspectorEdit::FontSize(_));
        let mirrored = match (edit, &mut fields.variant) {
            (InspectorEdit::Left(v), _) => {
                fields.left = v.round();
                true
            }
            (InspectorEdit::Top(v), _) => {
                fields.top = v.round();
                true
            }
            (InspectorEdit::Angle(v), _) => {
                fields.angle = v.round();
                true
            }
            (InspectorEdit::Opacity(v), _) => {
                fields.opacity = v.clamp(0.0, 1.0);
                true
            }
            (InspectorEdit::FontSize(v), VariantFields::Text { font_size, .. }) => {
                *font_size = v;
                true
            }
            (InspectorEdit::FontWeight(w), VariantFields::Text { font_weight, .. }) => {
                *font_weight = w;
                true
            }
            (
                InspectorEdit::Fill(c),
                VariantFields::Text { fill, .. } | VariantFields::Shape { fill },
            ) => {
                *fill = c.trim().to_string();
                true
            }
            _ => false,
        };
        if !mirrored {
            self.refresh(scene);
            return true;
        }
        if resized {
            if let (InspectorState::Editing(fields), Some(obj)) =
                (&mut self.state, scene.object(target))
            {
                let size = obj.bounding_box().size();
                fields.width = size.width.round();
                fields.height = size.height.round();
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "../tests/unit/inspector.rs"]
mod tests;
