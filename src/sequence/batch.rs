use std::path::Path;

use chrono::NaiveDateTime;

use crate::{
    assets::store::AssetStore,
    config::VizConfig,
    data::table::ObservationTable,
    encode::{GifConfig, GifSink, write_png},
    foundation::error::{VizError, VizResult},
    render::{
        FrameRGBA,
        cpu::CpuBackend,
        scene::{Scene, compose_frame},
    },
    stats::aggregate::FrameStats,
};

/// Renders table positions (indices into the sorted timestamps) to pixels.
pub struct FrameRenderer<'a> {
    table: &'a ObservationTable,
    assets: &'a AssetStore,
    config: &'a VizConfig,
    timestamps: Vec<NaiveDateTime>,
    backend: CpuBackend,
}

impl<'a> FrameRenderer<'a> {
    pub fn new(
        table: &'a ObservationTable,
        assets: &'a AssetStore,
        config: &'a VizConfig,
    ) -> VizResult<Self> {
        let timestamps = table.timestamps();
        if timestamps.is_empty() {
            return Err(VizError::load("no timestamps found in data"));
        }
        Ok(Self {
            table,
            assets,
            config,
            timestamps,
            backend: CpuBackend::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn config(&self) -> &VizConfig {
        self.config
    }

    fn timestamp(&self, index: usize) -> VizResult<NaiveDateTime> {
        self.timestamps.get(index).copied().ok_or_else(|| {
            VizError::validation(format!(
                "position {index} out of range (0..{})",
                self.timestamps.len()
            ))
        })
    }

    pub fn stats(&self, index: usize) -> VizResult<FrameStats> {
        let ts = self.timestamp(index)?;
        Ok(FrameStats::compute(
            &self.table.frame(ts),
            self.config.capacity,
        ))
    }

    pub fn scene(&self, index: usize) -> VizResult<Scene> {
        let ts = self.timestamp(index)?;
        let frame = self.table.frame(ts);
        let stats = FrameStats::compute(&frame, self.config.capacity);
        compose_frame(&frame, &stats, self.assets, self.config)
    }

    pub fn render_position(&mut self, index: usize) -> VizResult<FrameRGBA> {
        let scene = self.scene(index)?;
        self.backend.render(&scene, self.assets)
    }
}

/// Render the first timestamp to a PNG.
#[tracing::instrument(skip(renderer), fields(path = %path.display()))]
pub fn render_preview(renderer: &mut FrameRenderer<'_>, path: &Path) -> VizResult<()> {
    let frame = renderer.render_position(0)?;
    write_png(&frame, path, renderer.config().style.page_background)
}

/// Render every timestamp, in order, into a looping GIF. Returns the frame count.
#[tracing::instrument(skip(renderer), fields(path = %path.display()))]
pub fn render_animation(renderer: &mut FrameRenderer<'_>, path: &Path) -> VizResult<usize> {
    let total = renderer.len();
    let mut sink = GifSink::new(GifConfig {
        out_path: path.to_path_buf(),
        frame_duration_ms: renderer.config().frame_duration_ms,
        background: renderer.config().style.page_background,
    })?;

    for index in 0..total {
        let n = index + 1;
        if n == 1 || n % 10 == 0 {
            tracing::info!(
                frame = n,
                total,
                timestamp = %renderer.timestamps()[index],
                "rendering frame"
            );
        }
        let frame = renderer.render_position(index)?;
        sink.push_frame(&frame)?;
    }
    sink.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/batch.rs"]
mod tests;
