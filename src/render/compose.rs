use std::collections::HashMap;
use std::sync::Arc;

use crate::assets::color::Color;
use crate::assets::decode::PreparedImage;
use crate::assets::fonts::{FontBook, FontFace, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::Affine;
use crate::foundation::error::{EditorError, EditorResult};
use crate::render::backend::FrameRGBA;
use crate::scene::graph::SceneGraph;
use crate::scene::object::{ObjectKind, SceneObject, ShapeBody, ShapeKind, TextBody};

/// Software compositor that flattens a scene into pixels with `vello_cpu`.
///
/// Decoded image paints and font data are cached per compositor, keyed by the shared buffers
/// the scene already holds.
pub struct SceneCompositor {
    fonts: Arc<FontBook>,
    text: TextLayoutEngine,
    image_cache: HashMap<usize, (Arc<Vec<u8>>, vello_cpu::Image)>,
    font_cache: HashMap<(usize, u32), (Arc<Vec<u8>>, vello_cpu::peniko::FontData)>,
}

impl SceneCompositor {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            fonts,
            text: TextLayoutEngine::new(),
            image_cache: HashMap::new(),
            font_cache: HashMap::new(),
        }
    }

    /// Draw every object in z-order over `clear_rgba` (straight RGBA8).
    ///
    /// The output is `pixel_ratio` times the canvas size; object geometry is scaled to match.
    #[tracing::instrument(skip(self, scene), fields(canvas = ?scene.canvas()))]
    pub fn render(
        &mut self,
        scene: &SceneGraph,
        clear_rgba: [u8; 4],
        pixel_ratio: f64,
    ) -> EditorResult<FrameRGBA> {
        let target = scene.canvas().scaled(pixel_ratio)?;
        let width: u16 = target
            .width
            .try_into()
            .map_err(|_| EditorError::render("output width exceeds u16"))?;
        let height: u16 = target
            .height
            .try_into()
            .map_err(|_| EditorError::render("output height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        let [r, g, b, a] = clear_rgba;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        let root = Affine::scale(pixel_ratio);
        for obj in scene.objects() {
            self.draw_object(&mut ctx, obj, root)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Ok(FrameRGBA {
            width: target.width,
            height: target.height,
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_object(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        obj: &SceneObject,
        root: Affine,
    ) -> EditorResult<()> {
        let opacity = obj.placement.opacity.clamp(0.0, 1.0) as f32;
        if opacity <= 0.0 {
            return Ok(());
        }

        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(root * obj.affine()));
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }

        match &obj.kind {
            ObjectKind::Background(bg) => self.draw_image(ctx, &bg.image)?,
            ObjectKind::Image(img) => self.draw_image(ctx, &img.image)?,
            ObjectKind::Shape(shape) => draw_shape(ctx, shape)?,
            ObjectKind::Text(text) => self.draw_text(ctx, text)?,
        }

        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        image: &PreparedImage,
    ) -> EditorResult<()> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        let paint = match self.image_cache.get(&key) {
            Some((_, paint)) => paint.clone(),
            None => {
                let pixmap = image_to_pixmap(image)?;
                let paint = vello_cpu::Image {
                    image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                    sampler: vello_cpu::peniko::ImageSampler::default(),
                };
                self.image_cache
                    .insert(key, (Arc::clone(&image.rgba8_premul), paint.clone()));
                paint
            }
        };

        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width),
            f64::from(image.height),
        ));
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        body: &TextBody,
    ) -> EditorResult<()> {
        let weight = body.font_weight.numeric();
        let Some(face) = self.fonts.resolve(&body.font_family, weight) else {
            tracing::debug!(family = %body.font_family, "no font face available, text skipped");
            return Ok(());
        };

        let [r, g, b, a] = Color::parse(&body.fill)?.to_rgba8();
        let brush = TextBrushRgba8 { r, g, b, a };
        let layout = self.text.layout_plain(
            &body.content,
            &face,
            body.font_size as f32,
            weight,
            brush,
        )?;
        let font = self.font_data(&face);

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn font_data(&mut self, face: &FontFace) -> vello_cpu::peniko::FontData {
        let key = (Arc::as_ptr(&face.bytes) as usize, face.index);
        self.font_cache
            .entry(key)
            .or_insert_with(|| {
                let blob = vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone());
                (
                    Arc::clone(&face.bytes),
                    vello_cpu::peniko::FontData::new(blob, face.index),
                )
            })
            .1
            .clone()
    }
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, shape: &ShapeBody) -> EditorResult<()> {
    use vello_cpu::kurbo::Shape as _;

    let [r, g, b, a] = Color::parse(&shape.fill)?.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));

    let (w, h) = (shape.size.width, shape.size.height);
    let path = match shape.kind {
        ShapeKind::Rect => {
            let radius = shape
                .corner_radius
                .unwrap_or(0.0)
                .clamp(0.0, w.min(h) / 2.0);
            vello_cpu::kurbo::RoundedRect::new(0.0, 0.0, w, h, radius).to_path(0.1)
        }
        ShapeKind::Circle => {
            vello_cpu::kurbo::Circle::new((w / 2.0, h / 2.0), w.min(h) / 2.0).to_path(0.1)
        }
    };
    ctx.fill_path(&path);
    Ok(())
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn image_to_pixmap(image: &PreparedImage) -> EditorResult<vello_cpu::Pixmap> {
    let w: u16 = image
        .width
        .try_into()
        .map_err(|_| EditorError::render("image width exceeds u16"))?;
    let h: u16 = image
        .height
        .try_into()
        .map_err(|_| EditorError::render("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let pixels = image
        .rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
