//! Layer list: non-background objects front-to-back, always re-derived from the scene.

use crate::scene::graph::{ReorderDirection, SceneGraph};
use crate::scene::object::{ObjectId, ObjectKind, SceneObject};

const LABEL_MAX_CHARS: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Text,
    Image,
    Shape,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerRow {
    pub id: ObjectId,
    pub label: String,
    pub kind: LayerKind,
    pub selected: bool,
}

/// Rows for every non-background object, frontmost first.
pub fn layer_rows(scene: &SceneGraph) -> Vec<LayerRow> {
    let selection = scene.selection();
    scene
        .objects()
        .iter()
        .rev()
        .filter_map(|obj| {
            let (label, kind) = describe(obj)?;
            Some(LayerRow {
                id: obj.id,
                label,
                kind,
                selected: selection.contains(&obj.id),
            })
        })
        .collect()
}

fn describe(obj: &SceneObject) -> Option<(String, LayerKind)> {
    match &obj.kind {
        ObjectKind::Text(t) => Some((truncate_label(&t.content), LayerKind::Text)),
        ObjectKind::Image(_) => Some(("Image".to_string(), LayerKind::Image)),
        ObjectKind::Shape(s) => Some((s.kind.label().to_string(), LayerKind::Shape)),
        ObjectKind::Background(_) => None,
    }
}

fn truncate_label(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(LABEL_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Clicking a row makes it the sole selection.
pub fn select_row(scene: &mut SceneGraph, id: ObjectId) {
    scene.set_selection([id]);
}

pub fn move_row_forward(scene: &mut SceneGraph, id: ObjectId) -> bool {
    scene.reorder(id, ReorderDirection::Forward)
}

pub fn move_row_backward(scene: &mut SceneGraph, id: ObjectId) -> bool {
    scene.reorder(id, ReorderDirection::Backward)
}

pub fn delete_row(scene: &mut SceneGraph, id: ObjectId) -> bool {
    scene.remove_object(id)
}

#[cfg(test)]
#[path = "../tests/unit/layers.rs"]
mod tests;
