use crate::assets::decode::PreparedImage;
use crate::assets::fonts::approximate_text_extent;
use crate::foundation::core::{Canvas, Size};
use crate::scene::object::{
    Applied, Attr, BackgroundBody, ObjectId, ObjectKind, Placement, SceneObject, TextBody,
};

/// Measures the native size of a text object.
pub trait TextMeasurer {
    fn measure(&self, body: &TextBody) -> Size;
}

/// Font-free metrics: 0.6em per char, 1.16 line height.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxTextMeasurer;

impl TextMeasurer for ApproxTextMeasurer {
    fn measure(&self, body: &TextBody) -> Size {
        approximate_text_extent(&body.content, body.font_size)
    }
}

/// One step in z-order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReorderDirection {
    /// Toward the viewer (higher index).
    Forward,
    /// Away from the viewer (lower index).
    Backward,
}

/// Change notification emitted by every successful mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    Added(ObjectId),
    Removed(ObjectId),
    Modified(ObjectId),
    Reordered(ObjectId),
    SelectionChanged,
    Resized(Canvas),
    Cleared,
    BackgroundInstalled(ObjectId),
}

/// Authoritative editable design: ordered objects (index 0 drawn first), selection, canvas size.
///
/// Every operation is synchronous and total. Unknown ids are treated as benign races and ignored.
pub struct SceneGraph {
    canvas: Canvas,
    objects: Vec<SceneObject>,
    selection: Vec<ObjectId>,
    next_id: u64,
    revision: u64,
    selection_revision: u64,
    scene_epoch: u64,
    events: Vec<SceneEvent>,
    measurer: Box<dyn TextMeasurer>,
}

impl std::fmt::Debug for SceneGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneGraph")
            .field("canvas", &self.canvas)
            .field("objects", &self.objects.len())
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("scene_epoch", &self.scene_epoch)
            .finish()
    }
}

impl SceneGraph {
    /// Empty scene using approximate text metrics.
    pub fn new(canvas: Canvas) -> Self {
        Self::with_measurer(canvas, Box::new(ApproxTextMeasurer))
    }

    pub fn with_measurer(canvas: Canvas, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            canvas,
            objects: Vec::new(),
            selection: Vec::new(),
            next_id: 1,
            revision: 0,
            selection_revision: 0,
            scene_epoch: 0,
            events: Vec::new(),
            measurer,
        }
    }

    /// Append a new object at the front and make it the sole selection.
    ///
    /// Backgrounds only enter through [`SceneGraph::install_background`].
    pub(crate) fn add_object(&mut self, kind: ObjectKind, placement: Placement) -> ObjectId {
        debug_assert!(!matches!(kind, ObjectKind::Background(_)));
        let id = self.alloc_id();
        let mut obj = SceneObject {
            id,
            placement,
            kind,
        };
        if let ObjectKind::Text(body) = &mut obj.kind {
            body.extent = self.measurer.measure(body);
        }

        self.objects.push(obj);
        self.touch(SceneEvent::Added(id));
        self.replace_selection(vec![id]);
        id
    }

    /// Remove one object. Returns `false` (and changes nothing) for unknown ids.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        self.objects.remove(idx);
        self.touch(SceneEvent::Removed(id));
        if self.selection.contains(&id) {
            let rest = self.selection.iter().copied().filter(|s| *s != id).collect();
            self.replace_selection(rest);
        }
        true
    }

    /// Replace the selection. Unknown and non-selectable ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = ObjectId>) {
        let mut next = Vec::new();
        for id in ids {
            let selectable = self.object(id).is_some_and(SceneObject::is_selectable);
            if selectable && !next.contains(&id) {
                next.push(id);
            }
        }
        self.replace_selection(next);
    }

    pub fn clear_selection(&mut self) {
        self.replace_selection(Vec::new());
    }

    /// Apply one attribute write. Returns whether anything changed.
    pub fn update_object_attribute(&mut self, id: ObjectId, attr: Attr) -> bool {
        let Some(idx) = self.index_of(id) else {
            tracing::debug!(%id, ?attr, "attribute write to missing object ignored");
            return false;
        };
        let obj = &mut self.objects[idx];
        match obj.apply(&attr) {
            Applied::Ignored => return false,
            Applied::Changed => {}
            Applied::ChangedText => {
                if let ObjectKind::Text(body) = &mut obj.kind {
                    body.extent = self.measurer.measure(body);
                }
            }
        }
        self.touch(SceneEvent::Modified(id));
        true
    }

    /// Move one step in z-order, clamping at the ends and never below the background.
    pub fn reorder(&mut self, id: ObjectId, direction: ReorderDirection) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.objects[idx].is_background() {
            return false;
        }
        let target = match direction {
            ReorderDirection::Forward if idx + 1 < self.objects.len() => idx + 1,
            ReorderDirection::Backward if idx > 0 && !self.objects[idx - 1].is_background() => {
                idx - 1
            }
            _ => return false,
        };
        self.objects.swap(idx, target);
        self.touch(SceneEvent::Reordered(id));
        true
    }

    /// Resize the drawing surface. Objects are neither moved nor dropped.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> bool {
        let Ok(canvas) = Canvas::new(width, height) else {
            return false;
        };
        if canvas == self.canvas {
            return false;
        }
        self.canvas = canvas;
        self.touch(SceneEvent::Resized(canvas));
        true
    }

    /// Remove everything, background included, and reset the selection.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.scene_epoch += 1;
        self.touch(SceneEvent::Cleared);
        self.replace_selection(Vec::new());
    }

    /// Clear, resize, and install a template raster as the background in one step.
    ///
    /// The raster is stretched to the canvas if its pixel size differs.
    pub fn install_background(
        &mut self,
        canvas: Canvas,
        template_id: impl Into<String>,
        image: PreparedImage,
    ) -> ObjectId {
        self.clear();
        self.set_canvas_size(canvas.width, canvas.height);

        let sx = f64::from(canvas.width) / f64::from(image.width.max(1));
        let sy = f64::from(canvas.height) / f64::from(image.height.max(1));
        let id = self.alloc_id();
        self.objects.insert(
            0,
            SceneObject {
                id,
                placement: Placement::default().with_scale(sx, sy),
                kind: ObjectKind::Background(BackgroundBody {
                    template_id: template_id.into(),
                    image,
                }),
            },
        );
        self.touch(SceneEvent::BackgroundInstalled(id));
        id
    }

    /// Objects in render order (index 0 is drawn first).
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// The selected object when exactly one is selected.
    pub fn single_selection(&self) -> Option<&SceneObject> {
        match self.selection.as_slice() {
            [id] => self.object(*id),
            _ => None,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn background(&self) -> Option<&SceneObject> {
        self.objects.first().filter(|o| o.is_background())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumped whenever the selection set changes.
    pub fn selection_revision(&self) -> u64 {
        self.selection_revision
    }

    /// Bumped by every full clear; async results captured under an older epoch are stale.
    pub fn scene_epoch(&self) -> u64 {
        self.scene_epoch
    }

    /// Take pending change notifications in the order they happened.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn touch(&mut self, event: SceneEvent) {
        self.revision += 1;
        self.events.push(event);
    }

    fn replace_selection(&mut self, next: Vec<ObjectId>) {
        if next == self.selection {
            return;
        }
        self.selection = next;
        self.selection_revision += 1;
        self.revision += 1;
        self.events.push(SceneEvent::SelectionChanged);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/graph.rs"]
mod tests;
