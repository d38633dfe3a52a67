//! Run configuration.
//!
//! Every field has a default, so a JSON file only needs the values it changes. Files are merged
//! over the preset they name (or the one selected on the command line) before deserializing.

use std::path::Path;

use anyhow::Context;

use crate::{
    data::{observation::Service, reclassify::SplitPolicy},
    foundation::{
        core::Rgba8,
        error::{VizError, VizResult},
    },
    sequence::session::RefreshInterval,
};

pub mod preset;

pub use preset::Preset;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VizConfig {
    pub preset: Preset,
    /// Total spot count; not derived from the data.
    pub capacity: u32,
    /// Subtracted from every source `y` before drawing.
    pub vertical_offset: f64,
    pub frame_duration_ms: u32,
    pub split: SplitPolicy,
    pub assets: AssetPaths,
    pub style: Style,
    pub dashboard: DashboardSettings,
}

impl Default for VizConfig {
    fn default() -> Self {
        Preset::default().config()
    }
}

/// Asset locations relative to the asset root.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetPaths {
    /// Background map candidates; the first one that loads wins.
    pub map_candidates: Vec<String>,
    pub logo_dir: String,
    pub plate_dir: String,
    pub font_dir: Option<String>,
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self {
            map_candidates: vec!["map_v3.png".to_owned(), "map.png".to_owned()],
            logo_dir: "logos".to_owned(),
            plate_dir: "plates".to_owned(),
            font_dir: Some("fonts".to_owned()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub background_opacity: f32,
    pub page_background: Rgba8,
    pub header: HeaderStyle,
    pub services: ServicePalette,
    pub vacant_marker: MarkerStyle,
    /// Fallback marker for occupied spots without a usable plate image.
    pub occupied_marker: MarkerStyle,
    /// Fill fallback markers with the service color instead of `occupied_marker.fill`.
    pub color_by_service: bool,
    pub plate: PlateStyle,
    pub badge: BadgeStyle,
    pub legend: LegendStyle,
    pub panel: PanelStyle,
}

impl Default for Style {
    fn default() -> Self {
        Preset::default().config().style
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeaderStyle {
    pub title: String,
    /// chrono `strftime` pattern for the frame timestamp.
    pub time_format: String,
    /// `"<title> - <time>"` on one line instead of the time on its own line.
    pub inline_time: bool,
    pub height_px: u32,
    pub color: Rgba8,
    pub size_px: f32,
}

impl Default for HeaderStyle {
    fn default() -> Self {
        Self {
            title: String::new(),
            time_format: "%B %d, %Y at %I:%M %p".to_owned(),
            inline_time: false,
            height_px: 80,
            color: Rgba8::rgb(0x2c, 0x3e, 0x50),
            size_px: 22.0,
        }
    }
}

impl HeaderStyle {
    pub fn format_time(&self, ts: chrono::NaiveDateTime) -> String {
        format_time(ts, &self.time_format)
    }

    /// Header lines for one frame.
    pub fn lines(&self, ts: chrono::NaiveDateTime) -> Vec<String> {
        let time = self.format_time(ts);
        if self.inline_time {
            vec![format!("{} - {time}", self.title)]
        } else {
            vec![self.title.clone(), time]
        }
    }
}

/// Brand colors. The unclassified placeholder never reaches rendering but gets neutral gray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServicePalette {
    pub uber: Rgba8,
    pub lyft: Rgba8,
    pub waymo: Rgba8,
    pub taxi: Rgba8,
}

impl Default for ServicePalette {
    fn default() -> Self {
        Self {
            uber: Rgba8::rgb(0x00, 0x00, 0x00),
            lyft: Rgba8::rgb(0xff, 0x00, 0xbf),
            waymo: Rgba8::rgb(0x00, 0xb4, 0xa2),
            taxi: Rgba8::rgb(0xf5, 0xa6, 0x23),
        }
    }
}

impl ServicePalette {
    pub fn color(&self, service: Service) -> Rgba8 {
        match service {
            Service::Uber => self.uber,
            Service::Lyft => self.lyft,
            Service::Waymo => self.waymo,
            Service::Taxi => self.taxi,
            Service::Unclassified => Rgba8::rgb(0x80, 0x80, 0x80),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: Rgba8,
    pub edge: Rgba8,
    pub edge_width: f64,
    pub opacity: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius: 7.0,
            fill: Rgba8::rgb(0x80, 0x80, 0x80),
            edge: Rgba8::rgb(0x4a, 0x4a, 0x4a),
            edge_width: 1.5,
            opacity: 0.7,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlateStyle {
    /// Plates are resampled to this width, keeping aspect ratio.
    pub width_px: u32,
    /// Service-colored frame; 0 disables it.
    pub border_px: f64,
    pub corner_radius: f64,
}

impl Default for PlateStyle {
    fn default() -> Self {
        Self {
            width_px: 80,
            border_px: 3.0,
            corner_radius: 3.0,
        }
    }
}

/// Service logo drawn below each plate.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BadgeStyle {
    pub enabled: bool,
    pub size_px: u32,
    /// Gap between the plate's bottom edge and the badge.
    pub gap_px: f64,
    /// Stand-in dot when the service logo is unavailable.
    pub dot_radius: f64,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            size_px: 24,
            gap_px: 5.0,
            dot_radius: 6.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendMode {
    /// One entry per concrete service present in the frame.
    ServicesShown,
    /// A single "Vacant" entry.
    Vacant,
    Hidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegendStyle {
    pub mode: LegendMode,
    pub corner: Corner,
    pub title: Option<String>,
}

impl Default for LegendStyle {
    fn default() -> Self {
        Self {
            mode: LegendMode::ServicesShown,
            corner: Corner::TopLeft,
            title: Some("Service Legend".to_owned()),
        }
    }
}

/// Statistics panel placement, in map pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelStyle {
    pub enabled: bool,
    /// Distance from the map's right edge to the panel's left edge.
    pub right_inset: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for PanelStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            right_inset: 290.0,
            top: 120.0,
            width: 270.0,
            height: 480.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardSettings {
    pub page_title: String,
    pub heading: String,
    pub refresh_interval_s: f64,
    pub time_format: String,
    /// Pixel height of the map widget.
    pub map_height_px: u32,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            page_title: "Sky Harbor Airport - Ride-Hailing Dashboard".to_owned(),
            heading: "SKY HARBOR AIRPORT - Ride-Hailing Pickup Zone".to_owned(),
            refresh_interval_s: 2.0,
            time_format: "%B %d, %Y at %I:%M %p".to_owned(),
            map_height_px: 600,
        }
    }
}

impl VizConfig {
    /// Parse a JSON document, merging it over its preset.
    ///
    /// The preset comes from the document's `"preset"` key, else `fallback`.
    pub fn from_json_str(s: &str, fallback: Preset) -> VizResult<Self> {
        let overrides: serde_json::Value =
            serde_json::from_str(s).map_err(|e| VizError::serde(e.to_string()))?;
        if !overrides.is_object() {
            return Err(VizError::serde("config root must be a JSON object"));
        }
        let preset = match overrides.get("preset") {
            Some(v) => serde_json::from_value::<Preset>(v.clone())
                .map_err(|e| VizError::serde(format!("preset: {e}")))?,
            None => fallback,
        };

        let mut merged =
            serde_json::to_value(preset.config()).map_err(|e| VizError::serde(e.to_string()))?;
        merge_json(&mut merged, overrides);
        let cfg: VizConfig =
            serde_json::from_value(merged).map_err(|e| VizError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path, fallback: Preset) -> VizResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s, fallback)
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.capacity == 0 {
            return Err(VizError::validation("capacity must be > 0"));
        }
        if self.frame_duration_ms == 0 {
            return Err(VizError::validation("frame_duration_ms must be > 0"));
        }
        if !self.vertical_offset.is_finite() {
            return Err(VizError::validation("vertical_offset must be finite"));
        }
        self.split.validate()?;
        RefreshInterval::new(self.dashboard.refresh_interval_s)?;

        if self.assets.map_candidates.is_empty() {
            return Err(VizError::validation(
                "assets.map_candidates must list at least one file",
            ));
        }

        let st = &self.style;
        unit_interval("style.background_opacity", st.background_opacity)?;
        unit_interval("style.vacant_marker.opacity", st.vacant_marker.opacity)?;
        unit_interval("style.occupied_marker.opacity", st.occupied_marker.opacity)?;
        for (name, m) in [
            ("vacant_marker", &st.vacant_marker),
            ("occupied_marker", &st.occupied_marker),
        ] {
            if !(m.radius.is_finite() && m.radius > 0.0) {
                return Err(VizError::validation(format!(
                    "style.{name}.radius must be > 0"
                )));
            }
            if !(m.edge_width.is_finite() && m.edge_width >= 0.0) {
                return Err(VizError::validation(format!(
                    "style.{name}.edge_width must be >= 0"
                )));
            }
        }
        if st.plate.width_px == 0 {
            return Err(VizError::validation("style.plate.width_px must be > 0"));
        }
        if !(st.plate.border_px.is_finite() && st.plate.border_px >= 0.0) {
            return Err(VizError::validation("style.plate.border_px must be >= 0"));
        }
        if st.badge.enabled && st.badge.size_px == 0 {
            return Err(VizError::validation("style.badge.size_px must be > 0"));
        }
        if st.panel.enabled && (st.panel.width <= 0.0 || st.panel.height <= 0.0) {
            return Err(VizError::validation("style.panel width/height must be > 0"));
        }
        if st.header.size_px <= 0.0 {
            return Err(VizError::validation("style.header.size_px must be > 0"));
        }
        strftime_pattern("style.header.time_format", &st.header.time_format)?;
        strftime_pattern("dashboard.time_format", &self.dashboard.time_format)?;
        Ok(())
    }

    pub fn refresh_interval(&self) -> VizResult<RefreshInterval> {
        RefreshInterval::new(self.dashboard.refresh_interval_s)
    }
}

fn unit_interval(name: &str, v: f32) -> VizResult<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(VizError::validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

/// Format `ts` with a user pattern without panicking on specifiers a naive time cannot fill.
pub fn try_format_time(ts: chrono::NaiveDateTime, pattern: &str) -> Option<String> {
    use std::fmt::Write as _;
    let mut out = String::new();
    write!(out, "{}", ts.format(pattern)).ok()?;
    Some(out)
}

/// Like [`try_format_time`], falling back to `%Y-%m-%d %H:%M` when the pattern cannot be used.
pub fn format_time(ts: chrono::NaiveDateTime, pattern: &str) -> String {
    try_format_time(ts, pattern).unwrap_or_else(|| ts.format("%Y-%m-%d %H:%M").to_string())
}

// `%Z`/`%z` parse fine but fail once formatted without an offset, so format a sample.
fn strftime_pattern(name: &str, pattern: &str) -> VizResult<()> {
    if try_format_time(chrono::NaiveDateTime::default(), pattern).is_none() {
        return Err(VizError::validation(format!(
            "{name} '{pattern}' is not a valid strftime pattern for a local time"
        )));
    }
    Ok(())
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(b), serde_json::Value::Object(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(slot) => merge_json(slot, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (slot, v) => *slot = v,
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
