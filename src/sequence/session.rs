use std::time::Duration;

use crate::foundation::error::{VizError, VizResult};

/// Auto-refresh period: 0.5 s to 5.0 s in 0.5 s steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefreshInterval {
    half_seconds: u8,
}

impl RefreshInterval {
    pub const MIN_S: f64 = 0.5;
    pub const MAX_S: f64 = 5.0;
    pub const STEP_S: f64 = 0.5;

    pub fn new(seconds: f64) -> VizResult<Self> {
        if !seconds.is_finite() || !(Self::MIN_S..=Self::MAX_S).contains(&seconds) {
            return Err(VizError::validation(format!(
                "refresh interval must be between {} and {} seconds, got {seconds}",
                Self::MIN_S,
                Self::MAX_S
            )));
        }
        let steps = seconds / Self::STEP_S;
        if (steps - steps.round()).abs() > 1e-9 {
            return Err(VizError::validation(format!(
                "refresh interval must be a multiple of {} seconds, got {seconds}",
                Self::STEP_S
            )));
        }
        Ok(Self {
            half_seconds: steps.round() as u8,
        })
    }

    pub fn as_secs_f64(self) -> f64 {
        f64::from(self.half_seconds) * Self::STEP_S
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(u64::from(self.half_seconds) * 500)
    }
}

impl Default for RefreshInterval {
    fn default() -> Self {
        Self { half_seconds: 4 }
    }
}

impl std::fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}s", self.as_secs_f64())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Rendering(usize),
}

/// Cursor over the sorted timestamps plus the auto-refresh setting.
///
/// Owns no frame data; callers pass the position into their own render closure.
#[derive(Clone, Debug)]
pub struct DashboardSession {
    len: usize,
    position: usize,
    auto_refresh: bool,
    interval: RefreshInterval,
    state: SessionState,
}

impl DashboardSession {
    pub fn new(len: usize, interval: RefreshInterval) -> VizResult<Self> {
        if len == 0 {
            return Err(VizError::load("no timestamps found in data"));
        }
        Ok(Self {
            len,
            position: 0,
            auto_refresh: false,
            interval,
            state: SessionState::Idle,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn interval(&self) -> RefreshInterval {
        self.interval
    }

    pub fn select(&mut self, index: usize) -> VizResult<()> {
        if index >= self.len {
            return Err(VizError::validation(format!(
                "position {index} out of range (0..{})",
                self.len
            )));
        }
        self.position = index;
        Ok(())
    }

    /// Advance one position, wrapping to the start. Returns the new position.
    pub fn tick(&mut self) -> usize {
        self.position = (self.position + 1) % self.len;
        self.position
    }

    pub fn set_auto_refresh(&mut self, on: bool, interval_s: f64) -> VizResult<()> {
        self.interval = RefreshInterval::new(interval_s)?;
        self.auto_refresh = on;
        Ok(())
    }

    /// Run `render` for the current position, reporting `Rendering` while it runs.
    pub fn render_current<T>(
        &mut self,
        render: impl FnOnce(usize) -> VizResult<T>,
    ) -> VizResult<T> {
        self.state = SessionState::Rendering(self.position);
        let out = render(self.position);
        self.state = SessionState::Idle;
        out
    }

    /// Render, then sleep/tick/render `ticks` times (forever when `None`).
    ///
    /// Returns the number of ticks performed.
    pub fn run_auto_advance(
        &mut self,
        ticks: Option<usize>,
        render: impl FnMut(usize) -> VizResult<()>,
    ) -> VizResult<usize> {
        self.run_auto_advance_with(ticks, std::thread::sleep, render)
    }

    pub fn run_auto_advance_with(
        &mut self,
        ticks: Option<usize>,
        mut sleep: impl FnMut(Duration),
        mut render: impl FnMut(usize) -> VizResult<()>,
    ) -> VizResult<usize> {
        self.auto_refresh = true;
        self.render_current(&mut render)?;

        let mut done = 0usize;
        while ticks.is_none_or(|n| done < n) {
            sleep(self.interval.as_duration());
            let at = self.tick();
            tracing::debug!(position = at, "auto-advance");
            self.render_current(&mut render)?;
            done += 1;
        }
        Ok(done)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sequence/session.rs"]
mod tests;
