use std::cell::RefCell;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::assets::fonts::{FontBook, TextLayoutEngine, approximate_text_extent};
use crate::catalog::brand::BrandConfig;
use crate::foundation::core::{Canvas, Size};
use crate::scene::graph::{SceneGraph, TextMeasurer};
use crate::scene::object::TextBody;

/// Session-wide editor settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorOpts {
    /// Canvas size before any template is baked.
    pub default_canvas: Canvas,
    /// Straight RGBA8 the compositor clears to before drawing objects.
    pub clear_rgba: [u8; 4],
    /// Supersampling factor for PNG export.
    pub export_pixel_ratio: f64,
}

impl Default for EditorOpts {
    fn default() -> Self {
        Self {
            default_canvas: Canvas::default(),
            clear_rgba: [0x0A, 0x0B, 0x0D, 0xFF],
            export_pixel_ratio: 2.0,
        }
    }
}

impl EditorOpts {
    pub fn with_default_canvas(mut self, canvas: Canvas) -> Self {
        self.default_canvas = canvas;
        self
    }

    pub fn with_clear_rgba(mut self, clear: [u8; 4]) -> Self {
        self.clear_rgba = clear;
        self
    }

    pub fn with_export_pixel_ratio(mut self, ratio: f64) -> Self {
        self.export_pixel_ratio = ratio;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking, user-visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// In-flight bake bookkeeping; at most one bake is live per session.
#[derive(Debug, Default)]
pub(crate) struct BakeSlot {
    pub(crate) generation: u64,
    pub(crate) cancel: Option<CancellationToken>,
}

/// One editing session: the scene and everything operations need alongside it.
///
/// There is no global editor state; every operation receives the session explicitly.
pub struct EditorSession {
    scene: SceneGraph,
    opts: EditorOpts,
    fonts: Arc<FontBook>,
    brand: BrandConfig,
    template_id: Option<String>,
    notices: Vec<Notice>,
    pub(crate) bake: BakeSlot,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("scene", &self.scene)
            .field("template_id", &self.template_id)
            .field("brand", &self.brand.name)
            .field("notices", &self.notices.len())
            .finish()
    }
}

impl EditorSession {
    /// Create a session. The font book must already be loaded; text is measured with it.
    pub fn new(opts: EditorOpts, fonts: Arc<FontBook>) -> Self {
        let measurer = FontMetrics::new(Arc::clone(&fonts));
        Self {
            scene: SceneGraph::with_measurer(opts.default_canvas, Box::new(measurer)),
            opts,
            fonts,
            brand: BrandConfig::default_brand(),
            template_id: None,
            notices: Vec::new(),
            bake: BakeSlot::default(),
        }
    }

    /// Default options with an empty font book (approximate text metrics).
    pub fn with_defaults() -> Self {
        Self::new(EditorOpts::default(), Arc::new(FontBook::empty()))
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn opts(&self) -> &EditorOpts {
        &self.opts
    }

    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    pub fn brand(&self) -> &BrandConfig {
        &self.brand
    }

    pub fn set_brand(&mut self, brand: BrandConfig) {
        self.brand = brand;
    }

    /// Template of the installed background, if any.
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    pub(crate) fn set_template_id(&mut self, id: Option<String>) {
        self.template_id = id;
    }

    /// Record a notification for the user.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error | NoticeLevel::Warning => tracing::warn!(%message, "editor notice"),
            NoticeLevel::Info => tracing::debug!(%message, "editor notice"),
        }
        self.notices.push(Notice { level, message });
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

/// Text measurement backed by the session's font book, falling back to approximate metrics.
pub(crate) struct FontMetrics {
    fonts: Arc<FontBook>,
    engine: RefCell<TextLayoutEngine>,
}

impl FontMetrics {
    pub(crate) fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            fonts,
            engine: RefCell::new(TextLayoutEngine::new()),
        }
    }
}

impl TextMeasurer for FontMetrics {
    fn measure(&self, body: &TextBody) -> Size {
        let weight = body.font_weight.numeric();
        let measured = self
            .fonts
            .resolve(&body.font_family, weight)
            .and_then(|face| {
                self.engine
                    .borrow_mut()
                    .measure(&body.content, &face, body.font_size as f32, weight)
                    .ok()
            })
            .filter(|s| s.width.is_finite() && s.height > 0.0);
        measured.unwrap_or_else(|| approximate_text_extent(&body.content, body.font_size))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
