use std::{
    cell::RefCell,
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    rc::Rc,
};

use anyhow::Context as _;
use image::{
    Delay, Frame, RgbaImage,
    codecs::gif::{GifEncoder, Repeat},
    imageops::FilterType,
};

use crate::{
    encode::{ensure_parent_dir, flatten_frame},
    foundation::{
        core::Rgba8,
        error::{VizError, VizResult},
    },
    render::FrameRGBA,
};

/// Quantizer speed handed to the GIF encoder (1 is best, 30 is fastest).
const GIF_SPEED: i32 = 10;

#[derive(Clone, Debug)]
pub struct GifConfig {
    pub out_path: PathBuf,
    pub frame_duration_ms: u32,
    /// Color transparent pixels are flattened onto.
    pub background: Rgba8,
}

impl GifConfig {
    pub fn validate(&self) -> VizResult<()> {
        if self.frame_duration_ms == 0 {
            return Err(VizError::validation("gif frame duration must be non-zero"));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(VizError::validation("gif output path is empty"));
        }
        Ok(())
    }
}

/// Buffered output file shared between the encoder and the sink.
///
/// The encoder writes the trailer when it drops and cannot report errors from there, so the sink
/// keeps its own handle and flushes explicitly afterwards.
#[derive(Clone)]
struct SharedFile(Rc<RefCell<BufWriter<File>>>);

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Streaming looping-GIF writer.
///
/// The first pushed frame fixes the output size; later frames of another size are resampled.
pub struct GifSink {
    cfg: GifConfig,
    encoder: GifEncoder<SharedFile>,
    file: SharedFile,
    size: Option<(u32, u32)>,
    frames: usize,
}

impl GifSink {
    pub fn new(cfg: GifConfig) -> VizResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;
        let file = File::create(&cfg.out_path)
            .with_context(|| format!("create gif '{}'", cfg.out_path.display()))?;
        let file = SharedFile(Rc::new(RefCell::new(BufWriter::new(file))));
        let mut encoder = GifEncoder::new_with_speed(file.clone(), GIF_SPEED);
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| VizError::encode(format!("failed to set gif loop: {e}")))?;
        Ok(Self {
            cfg,
            encoder,
            file,
            size: None,
            frames: 0,
        })
    }

    pub fn push_frame(&mut self, frame: &FrameRGBA) -> VizResult<()> {
        let flat = flatten_frame(frame, self.cfg.background)?;
        let (width, height) = *self.size.get_or_insert((flat.width(), flat.height()));
        let img = standardize_frame(flat, width, height);

        let delay = Delay::from_numer_denom_ms(self.cfg.frame_duration_ms, 1);
        self.encoder
            .encode_frame(Frame::from_parts(img, 0, 0, delay))
            .map_err(|e| VizError::encode(format!("failed to encode gif frame: {e}")))?;
        self.frames += 1;
        Ok(())
    }

    pub fn finish(self) -> VizResult<usize> {
        if self.frames == 0 {
            return Err(VizError::encode("gif has no frames"));
        }
        let Self {
            cfg,
            encoder,
            mut file,
            frames,
            ..
        } = self;
        // Dropping the encoder writes the trailer into the buffer.
        drop(encoder);
        file.flush()
            .with_context(|| format!("flush gif '{}'", cfg.out_path.display()))?;
        tracing::info!(path = %cfg.out_path.display(), frames, "wrote gif");
        Ok(frames)
    }
}

/// Resample `img` to `width`x`height` when its size differs.
pub fn standardize_frame(img: RgbaImage, width: u32, height: u32) -> RgbaImage {
    if img.dimensions() == (width, height) {
        return img;
    }
    tracing::debug!(
        from_w = img.width(),
        from_h = img.height(),
        to_w = width,
        to_h = height,
        "resizing frame to match first frame"
    );
    image::imageops::resize(&img, width, height, FilterType::Lanczos3)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gif.rs"]
mod tests;
