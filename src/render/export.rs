use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{EditorError, EditorResult};
use crate::render::backend::FrameRGBA;
use crate::render::compose::SceneCompositor;
use crate::session::editor::EditorSession;

/// Design id used in file names when no template is baked.
pub const UNTITLED_DESIGN_ID: &str = "design";

/// An encoded PNG ready to be offered for download.
#[derive(Clone, Debug)]
pub struct ExportedImage {
    /// `{brandName}-{templateOrDesignId}.png`.
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ExportedImage {
    /// Write into `dir` under [`ExportedImage::file_name`], creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> EditorResult<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create export dir '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.png)
            .with_context(|| format!("write png to '{}'", path.display()))?;
        Ok(path)
    }
}

/// Composite the session's scene at `pixel_ratio` and encode it as PNG.
#[tracing::instrument(skip(session))]
pub fn export_png(session: &EditorSession, pixel_ratio: f64) -> EditorResult<ExportedImage> {
    let mut compositor = SceneCompositor::new(session.fonts().clone());
    let frame = compositor.render(session.scene(), session.opts().clear_rgba, pixel_ratio)?;
    let png = encode_png(&frame)?;

    let file_name = export_file_name(&session.brand().name, session.template_id());
    tracing::debug!(%file_name, width = frame.width, height = frame.height, bytes = png.len(), "exported");
    Ok(ExportedImage {
        file_name,
        width: frame.width,
        height: frame.height,
        png,
    })
}

/// Encode a frame as straight-alpha RGBA PNG.
pub fn encode_png(frame: &FrameRGBA) -> EditorResult<Vec<u8>> {
    let rgba = frame.to_straight_rgba8();
    let mut out = std::io::Cursor::new(Vec::new());
    image::write_buffer_with_format(
        &mut out,
        &rgba,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .map_err(|e| EditorError::render(format!("encode png: {e}")))?;
    Ok(out.into_inner())
}

/// `{brandName}-{templateOrDesignId}.png`, with characters file systems reject replaced by `_`.
pub fn export_file_name(brand_name: &str, template_id: Option<&str>) -> String {
    let brand = sanitize(brand_name);
    let brand = if brand.is_empty() { "brand".to_string() } else { brand };
    let design = sanitize(template_id.unwrap_or(UNTITLED_DESIGN_ID));
    let design = if design.is_empty() {
        UNTITLED_DESIGN_ID.to_string()
    } else {
        design
    };
    format!("{brand}-{design}.png")
}

fn sanitize(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/export.rs"]
mod tests;
