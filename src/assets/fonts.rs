use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use crate::foundation::core::Size;
use crate::foundation::error::{EditorError, EditorResult};

/// Where fonts are loaded from when a [`FontBook`] is built.
#[derive(Clone, Debug)]
pub struct FontBookOpts {
    /// Directories scanned (non-recursively) for `.ttf`, `.otf` and `.ttc` files.
    pub dirs: Vec<PathBuf>,
    /// Also register the platform's installed fonts.
    pub load_system_fonts: bool,
}

impl Default for FontBookOpts {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl FontBookOpts {
    /// Add a font directory.
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Enable or disable system font discovery.
    pub fn with_system_fonts(mut self, enabled: bool) -> Self {
        self.load_system_fonts = enabled;
        self
    }
}

/// One concrete font face resolved from a CSS family stack.
#[derive(Clone)]
pub struct FontFace {
    /// Raw font file bytes (shared).
    pub bytes: Arc<Vec<u8>>,
    /// Face index inside a collection file.
    pub index: u32,
    /// Primary family name of the face.
    pub family: String,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

/// Font database shared by text measurement, the compositor and the template renderer.
///
/// Building a `FontBook` is the explicit "fonts ready" step: every face is registered before
/// any layout happens, so nothing downstream races a background font load.
pub struct FontBook {
    db: Arc<usvg::fontdb::Database>,
    face_cache: Mutex<HashMap<usvg::fontdb::ID, Arc<Vec<u8>>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontBook {
    /// A book with no faces; text falls back to approximate metrics and is not drawn.
    pub fn empty() -> Self {
        Self::from_database(usvg::fontdb::Database::new())
    }

    /// Load every configured source.
    #[tracing::instrument]
    pub fn load(opts: &FontBookOpts) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if opts.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &opts.dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font book loaded");
        Self::from_database(db)
    }

    fn from_database(db: usvg::fontdb::Database) -> Self {
        Self {
            db: Arc::new(db),
            face_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register one font file's bytes on top of a fresh book.
    pub fn from_font_bytes(bytes: Vec<u8>) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_font_data(bytes);
        Self::from_database(db)
    }

    /// Number of registered faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Shared database handle, as `usvg` options expect.
    pub fn database(&self) -> Arc<usvg::fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// Resolve a CSS family stack (`"'Inter', sans-serif"`) and numeric weight to a face.
    ///
    /// Falls back to the generic sans-serif family and finally to any registered face.
    pub fn resolve(&self, family_stack: &str, weight: u16) -> Option<FontFace> {
        let names = parse_family_stack(family_stack);
        let mut families: Vec<usvg::fontdb::Family<'_>> =
            names.iter().map(|n| family_for(n)).collect();
        families.push(usvg::fontdb::Family::SansSerif);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight(weight),
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;

        let family = self
            .db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| "unknown".to_string());

        let mut cache = self
            .face_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (bytes, index) = match cache.get(&id) {
            Some(bytes) => (Arc::clone(bytes), self.db.face(id).map_or(0, |f| f.index)),
            None => {
                let (bytes, index) = self
                    .db
                    .with_face_data(id, |data, index| (Arc::new(data.to_vec()), index))?;
                cache.insert(id, Arc::clone(&bytes));
                (bytes, index)
            }
        };

        Some(FontFace {
            bytes,
            index,
            family,
        })
    }
}

/// Split a CSS `font-family` value into unquoted names.
pub(crate) fn parse_family_stack(stack: &str) -> Vec<String> {
    stack
        .split(',')
        .map(|part| part.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn family_for(name: &str) -> usvg::fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => usvg::fontdb::Family::Serif,
        "sans-serif" | "system-ui" | "-apple-system" | "blinkmacsystemfont" => {
            usvg::fontdb::Family::SansSerif
        }
        "monospace" => usvg::fontdb::Family::Monospace,
        "cursive" => usvg::fontdb::Family::Cursive,
        "fantasy" => usvg::fontdb::Family::Fantasy,
        _ => usvg::fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// RGBA8 brush color used by Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Stateful helper for building Parley text layouts from resolved font faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    registered: HashMap<(usize, u32), String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            registered: HashMap::new(),
        }
    }

    /// Shape and lay out plain text (newlines honored, no wrapping).
    pub fn layout_plain(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        weight: u16,
        brush: TextBrushRgba8,
    ) -> EditorResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(EditorError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let family_name = self.register(face)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(weight)),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Measured size of `text` laid out with `face`.
    pub fn measure(
        &mut self,
        text: &str,
        face: &FontFace,
        size_px: f32,
        weight: u16,
    ) -> EditorResult<Size> {
        let layout = self.layout_plain(text, face, size_px, weight, TextBrushRgba8::default())?;
        Ok(Size::new(
            f64::from(layout.width()),
            f64::from(layout.height()),
        ))
    }

    fn register(&mut self, face: &FontFace) -> EditorResult<String> {
        let key = (Arc::as_ptr(&face.bytes) as usize, face.index);
        if let Some(name) = self.registered.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.bytes.as_ref().clone()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            EditorError::decode("no font families registered from font bytes")
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| EditorError::decode("registered font family has no name"))?
            .to_string();

        self.registered.insert(key, family_name.clone());
        Ok(family_name)
    }
}

/// Metrics used when no face resolves: 0.6em average advance, 1.16 line height.
pub fn approximate_text_extent(text: &str, size_px: f64) -> Size {
    let lines: Vec<&str> = text.split('\n').collect();
    let widest = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    Size::new(
        widest as f64 * size_px * 0.6,
        lines.len().max(1) as f64 * size_px * 1.16,
    )
}
