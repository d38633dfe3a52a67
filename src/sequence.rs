//! Walking the timestamps: batch output and the interactive dashboard session.

pub mod batch;
pub mod session;

pub use batch::{FrameRenderer, render_animation, render_preview};
pub use session::{DashboardSession, RefreshInterval, SessionState};
