use std::{collections::HashMap, sync::Arc};

use kurbo::Shape as _;

use crate::{
    assets::store::{AssetStore, ImageKey},
    foundation::{
        core::{Rect, Rgba8},
        error::{VizError, VizResult},
    },
    render::{
        FrameRGBA, composite,
        scene::{DrawItem, Scene, Stroke},
        svg_text,
    },
};

const TOLERANCE: f64 = 0.1;

/// Software rasterizer for [`Scene`]s.
///
/// Decoded images are uploaded once and reused across frames, so keep one backend per
/// [`AssetStore`].
#[derive(Default)]
pub struct CpuBackend {
    image_cache: HashMap<ImageKey, vello_cpu::Image>,
}

impl CpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, scene: &Scene, assets: &AssetStore) -> VizResult<FrameRGBA> {
        let width: u16 = scene
            .canvas
            .width
            .try_into()
            .map_err(|_| VizError::render("canvas width exceeds u16"))?;
        let height: u16 = scene
            .canvas
            .height
            .try_into()
            .map_err(|_| VizError::render("canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(width, height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(scene.background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        ));

        for item in &scene.items {
            self.draw_item(&mut ctx, item, assets)?;
        }

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let mut data = pixmap.data_as_u8_slice().to_vec();

        if !scene.labels.is_empty() {
            let overlay = svg_text::rasterize_labels(&scene.labels, scene.canvas, assets.fontdb())?;
            composite::over_in_place(&mut data, &overlay, 1.0)?;
        }

        Ok(FrameRGBA {
            width: scene.canvas.width,
            height: scene.canvas.height,
            data,
            premultiplied: true,
        })
    }

    fn draw_item(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        item: &DrawItem,
        assets: &AssetStore,
    ) -> VizResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        match item {
            DrawItem::Image { key, rect, opacity } => {
                let paint = self.image_paint_for(key, assets)?;
                let (w, h) = image_paint_size(&paint)?;
                if w <= 0.0 || h <= 0.0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return Ok(());
                }
                let transform = kurbo::Affine::translate((rect.x0, rect.y0))
                    * kurbo::Affine::scale_non_uniform(rect.width() / w, rect.height() / h);
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint(paint);
                with_opacity(ctx, *opacity, |ctx| {
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                });
            }
            DrawItem::Circle {
                center,
                radius,
                fill,
                edge,
                opacity,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                let circle = |r: f64| kurbo::Circle::new(*center, r).to_path(TOLERANCE);
                with_opacity(ctx, *opacity, |ctx| {
                    let (outer, inner) = edge_radii(*radius, *edge);
                    if let Some(Stroke { color, .. }) = edge {
                        ctx.set_paint(color_to_cpu(*color));
                        ctx.fill_path(&bezpath_to_cpu(&circle(outer)));
                    }
                    if inner > 0.0 {
                        ctx.set_paint(color_to_cpu(*fill));
                        ctx.fill_path(&bezpath_to_cpu(&circle(inner)));
                    }
                });
            }
            DrawItem::RoundedRect {
                rect,
                radius,
                fill,
                edge,
                opacity,
            } => {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                with_opacity(ctx, *opacity, |ctx| {
                    let inset = edge.map_or(0.0, |s| s.width / 2.0);
                    if let Some(Stroke { color, .. }) = edge {
                        ctx.set_paint(color_to_cpu(*color));
                        ctx.fill_path(&bezpath_to_cpu(&rounded(
                            rect.inflate(inset, inset),
                            radius + inset,
                        )));
                    }
                    let inner = rect.inflate(-inset, -inset);
                    if inner.width() > 0.0 && inner.height() > 0.0 {
                        ctx.set_paint(color_to_cpu(*fill));
                        ctx.fill_path(&bezpath_to_cpu(&rounded(
                            inner,
                            (radius - inset).max(0.0),
                        )));
                    }
                });
            }
        }
        Ok(())
    }

    fn image_paint_for(
        &mut self,
        key: &ImageKey,
        assets: &AssetStore,
    ) -> VizResult<vello_cpu::Image> {
        if let Some(paint) = self.image_cache.get(key) {
            return Ok(paint.clone());
        }

        let img = assets
            .image(key)
            .ok_or_else(|| VizError::render(format!("scene references unknown image {key:?}")))?;
        let pixmap =
            image_premul_bytes_to_pixmap(img.rgba8_premul.as_slice(), img.width, img.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.image_cache.insert(key.clone(), paint.clone());
        Ok(paint)
    }
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f32,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    let layered = opacity < 1.0;
    if layered {
        ctx.push_opacity_layer(opacity.max(0.0));
    }
    draw(ctx);
    if layered {
        ctx.pop_layer();
    }
}

/// Outer (edge) and inner (fill) radii; the edge straddles the nominal radius.
fn edge_radii(radius: f64, edge: Option<Stroke>) -> (f64, f64) {
    match edge {
        Some(s) => (radius + s.width / 2.0, radius - s.width / 2.0),
        None => (radius, radius),
    }
}

fn rounded(rect: Rect, radius: f64) -> kurbo::BezPath {
    let r = radius.min(rect.width() / 2.0).min(rect.height() / 2.0).max(0.0);
    kurbo::RoundedRect::from_rect(rect, r).to_path(TOLERANCE)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> VizResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| VizError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| VizError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(VizError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

fn image_paint_size(image: &vello_cpu::Image) -> VizResult<(f64, f64)> {
    match &image.image {
        vello_cpu::ImageSource::Pixmap(p) => Ok((f64::from(p.width()), f64::from(p.height()))),
        vello_cpu::ImageSource::OpaqueId(_) => Err(VizError::render(
            "cpu backend does not support opaque image ids",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
