use std::path::Path;

use anyhow::Context as _;

use crate::{
    encode::{ensure_parent_dir, flatten_frame},
    foundation::{core::Rgba8, error::VizResult},
    render::FrameRGBA,
};

/// Write `frame` as an opaque PNG, flattening any transparency over `bg`.
pub fn write_png(frame: &FrameRGBA, path: &Path, bg: Rgba8) -> VizResult<()> {
    ensure_parent_dir(path)?;
    let img = flatten_frame(frame, bg)?;
    image::save_buffer_with_format(
        path,
        img.as_raw(),
        img.width(),
        img.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), width = frame.width, height = frame.height, "wrote png");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
