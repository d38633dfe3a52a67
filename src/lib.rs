//! Parking and pickup-zone occupancy visualization.
//!
//! A run loads a spreadsheet of per-slot observations ([`load_normalized`]), computes per-timestamp
//! statistics ([`FrameStats`]) and draws each timestamp over a background map. Output is a preview
//! PNG and a looping GIF ([`sequence`]) or a static HTML dashboard ([`dashboard`]).
//!
//! All image and font I/O happens once in [`AssetStore::prepare`]; scene composition and
//! rasterization are pure with respect to the file system.

#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod encode;
pub mod foundation;
pub mod render;
pub mod sequence;
pub mod stats;

pub use assets::{PreparedImage, store::AssetStore};
pub use config::{Preset, VizConfig};
pub use dashboard::{export_dashboard, run_live};
pub use data::{
    diagnostics::CoordinateReport,
    loader::{DataFormat, load_normalized, load_table},
    observation::{Service, SpotObservation, SpotStatus},
    reclassify::{SplitPolicy, split_unclassified},
    table::{Frame, LoadIssues, ObservationTable},
    writer::write_table,
};
pub use foundation::{
    coords::{CoordMapper, Origin, map_point},
    core::{Canvas, Point, Rgba8},
    error::{VizError, VizResult},
};
pub use render::{FrameRGBA, cpu::CpuBackend};
pub use sequence::{
    DashboardSession, FrameRenderer, RefreshInterval, SessionState, render_animation,
    render_preview,
};
pub use stats::aggregate::FrameStats;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
