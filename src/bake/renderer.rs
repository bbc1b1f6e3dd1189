use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::assets::decode::rasterize_svg;
use crate::assets::fonts::FontBook;
use crate::assets::source::normalize_rel_path;
use crate::catalog::brand::BrandConfig;
use crate::catalog::template::TemplateDefinition;
use crate::foundation::core::Canvas;
use crate::foundation::error::{EditorError, EditorResult};
use crate::render::backend::FrameRGBA;

/// Everything a renderer needs for one template render.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub template: TemplateDefinition,
    pub brand: BrandConfig,
    /// Caller values merged over the template's declared defaults.
    pub variables: BTreeMap<String, String>,
    /// Native output size for the template's aspect ratio.
    pub canvas: Canvas,
    /// Extra wait between the document being ready and rasterizing it.
    pub settle_delay: Duration,
}

/// Capability that turns a template, brand, and variables into pixels.
///
/// Implementations must not resolve until every image and font the template depends on is
/// ready; the bake pipeline captures whatever comes back.
pub trait TemplateRenderer {
    fn render(&self, job: &RenderJob) -> impl Future<Output = EditorResult<FrameRGBA>>;
}

/// Renders `<template_id>.svg` documents from a directory.
///
/// `{{brand.<path>}}` and `{{var.<name>}}` placeholders are substituted (XML-escaped) before
/// parsing. Referenced images and fonts are resolved while `usvg` parses the document, so the
/// output is complete when this resolves.
#[derive(Clone, Debug)]
pub struct SvgTemplateRenderer {
    dir: PathBuf,
    fonts: Arc<FontBook>,
}

impl SvgTemplateRenderer {
    pub fn new(dir: impl Into<PathBuf>, fonts: Arc<FontBook>) -> Self {
        Self {
            dir: dir.into(),
            fonts,
        }
    }

    /// Where the document for `template_id` is expected.
    pub fn template_path(&self, template_id: &str) -> EditorResult<PathBuf> {
        let rel = normalize_rel_path(&format!("{template_id}.svg"))?;
        Ok(self.dir.join(rel))
    }

    fn parse(&self, svg: &str) -> EditorResult<usvg::Tree> {
        let opts = usvg::Options {
            resources_dir: Some(self.dir.clone()),
            fontdb: self.fonts.database(),
            font_resolver: svg_font_resolver(),
            ..Default::default()
        };
        usvg::Tree::from_str(svg, &opts)
            .map_err(|e| EditorError::render(format!("parse template svg: {e}")))
    }
}

impl TemplateRenderer for SvgTemplateRenderer {
    #[tracing::instrument(skip_all, fields(template = %job.template.id))]
    async fn render(&self, job: &RenderJob) -> EditorResult<FrameRGBA> {
        let path = self.template_path(&job.template.id)?;
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read template svg from '{}'", path.display()))?;

        let svg = fill_placeholders(&raw, &job.brand, &job.variables);
        let tree = self.parse(&svg)?;
        if !job.settle_delay.is_zero() {
            tokio::time::sleep(job.settle_delay).await;
        }
        let image = rasterize_svg(&tree, job.canvas.width, job.canvas.height)?;
        tracing::debug!(width = image.width, height = image.height, "template rasterized");

        Ok(FrameRGBA {
            width: image.width,
            height: image.height,
            data: image.rgba8_premul.as_ref().clone(),
            premultiplied: true,
        })
    }
}

/// Replace `{{brand.*}}` and `{{var.*}}` placeholders. Unknown keys become empty strings.
pub fn fill_placeholders(
    template: &str,
    brand: &BrandConfig,
    variables: &BTreeMap<String, String>,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = after[..end].trim();
        let value = if let Some(path) = key.strip_prefix("brand.") {
            brand.field(path)
        } else if let Some(name) = key.strip_prefix("var.") {
            variables.get(name).cloned()
        } else {
            None
        };
        match value {
            Some(v) => out.push_str(&xml_escape(&v)),
            None => tracing::debug!(key, "unresolved template placeholder"),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn svg_font_resolver() -> usvg::FontResolver<'static> {
    use usvg::FontResolver;

    FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<usvg::fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                })
                .collect();
            families.push(usvg::fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
                usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
                usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
            };
            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style,
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/renderer.rs"]
mod tests;
