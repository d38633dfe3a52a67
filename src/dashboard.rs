//! Static HTML dashboard.
//!
//! The export is a directory of self-contained pages: `index.html`, one navigable page per
//! position under `manual/`, and a self-advancing copy under `auto/`. Live mode keeps rewriting a
//! single `live.html` instead.

pub mod export;
pub mod map_svg;
pub mod page;

pub use export::{AssetLinks, DashboardBuilder, ExportSummary, export_dashboard, run_live};
pub use page::PageKind;
