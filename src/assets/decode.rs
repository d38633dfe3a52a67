use std::{path::Path, sync::Arc};

use anyhow::Context;
use image::{RgbaImage, imageops::FilterType};

use crate::{assets::PreparedImage, foundation::error::VizResult};

/// Read and decode an image file into straight-alpha RGBA8.
pub fn load_rgba(path: &Path) -> VizResult<RgbaImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let rgba =
        decode_rgba(&bytes).with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(rgba)
}

/// Decode any format `image` recognizes into straight-alpha RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Premultiply and freeze a straight-alpha image.
pub fn prepare(rgba: RgbaImage) -> PreparedImage {
    let (width, height) = rgba.dimensions();
    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    }
}

/// Resample to `width`, keeping the aspect ratio.
pub fn resize_to_width(img: &RgbaImage, width: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == width || w == 0 {
        return img.clone();
    }
    let height = ((f64::from(h) * f64::from(width) / f64::from(w)).round() as u32).max(1);
    image::imageops::resize(img, width, height, FilterType::Lanczos3)
}

/// Shrink to fit inside a `max` x `max` box, keeping the aspect ratio. Never enlarges.
pub fn thumbnail(img: &RgbaImage, max: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if (w <= max && h <= max) || w == 0 || h == 0 {
        return img.clone();
    }
    let scale = f64::from(max) / f64::from(w.max(h));
    let tw = ((f64::from(w) * scale).round() as u32).clamp(1, max);
    let th = ((f64::from(h) * scale).round() as u32).clamp(1, max);
    image::imageops::resize(img, tw, th, FilterType::Lanczos3)
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
