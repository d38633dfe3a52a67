use std::str::FromStr;

use crate::{
    config::{
        AssetPaths, BadgeStyle, Corner, DashboardSettings, HeaderStyle, LegendMode, LegendStyle,
        MarkerStyle, PanelStyle, PlateStyle, ServicePalette, Style, VizConfig,
    },
    data::reclassify::SplitPolicy,
    foundation::{core::Rgba8, error::VizError},
};

/// Named bundles of cosmetic defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Branded pickup-zone view: plates with service borders, logo badges, statistics panel.
    #[default]
    RideHailing,
    /// Plain occupancy view: gray vacant dots, red fallback dots, no panel.
    Parking,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::RideHailing, Preset::Parking];

    pub fn name(self) -> &'static str {
        match self {
            Self::RideHailing => "ride-hailing",
            Self::Parking => "parking",
        }
    }

    pub fn config(self) -> VizConfig {
        match self {
            Self::RideHailing => ride_hailing(),
            Self::Parking => parking(),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                VizError::validation(format!(
                    "unknown preset '{s}' (expected ride-hailing or parking)"
                ))
            })
    }
}

fn ride_hailing() -> VizConfig {
    VizConfig {
        preset: Preset::RideHailing,
        capacity: 24,
        vertical_offset: 30.0,
        frame_duration_ms: 2000,
        split: SplitPolicy::default(),
        assets: AssetPaths::default(),
        style: Style {
            background_opacity: 0.85,
            page_background: Rgba8::rgb(0xf5, 0xf6, 0xfa),
            header: HeaderStyle {
                title: "SKY HARBOR AIRPORT  -  Ride-Hailing Pickup Zone".to_owned(),
                time_format: "%B %d, %Y  |  %I:%M %p".to_owned(),
                ..HeaderStyle::default()
            },
            services: ServicePalette::default(),
            vacant_marker: MarkerStyle::default(),
            occupied_marker: MarkerStyle {
                radius: 10.0,
                fill: Rgba8::rgb(0xf5, 0xa6, 0x23),
                edge: Rgba8::WHITE,
                edge_width: 2.0,
                opacity: 1.0,
            },
            color_by_service: true,
            plate: PlateStyle::default(),
            badge: BadgeStyle::default(),
            legend: LegendStyle::default(),
            panel: PanelStyle::default(),
        },
        dashboard: DashboardSettings::default(),
    }
}

fn parking() -> VizConfig {
    VizConfig {
        preset: Preset::Parking,
        capacity: 24,
        vertical_offset: 250.0,
        frame_duration_ms: 2000,
        split: SplitPolicy::default(),
        assets: AssetPaths::default(),
        style: Style {
            background_opacity: 0.8,
            page_background: Rgba8::WHITE,
            header: HeaderStyle {
                title: "Parking Status".to_owned(),
                time_format: "%B %d, %Y at %I:%M %p".to_owned(),
                inline_time: true,
                color: Rgba8::BLACK,
                size_px: 24.0,
                ..HeaderStyle::default()
            },
            services: ServicePalette::default(),
            vacant_marker: MarkerStyle {
                radius: 6.5,
                fill: Rgba8::rgb(0x80, 0x80, 0x80),
                edge: Rgba8::rgb(0xa9, 0xa9, 0xa9),
                edge_width: 1.0,
                opacity: 0.8,
            },
            occupied_marker: MarkerStyle {
                radius: 6.5,
                fill: Rgba8::rgb(0xff, 0x00, 0x00),
                edge: Rgba8::rgb(0x8b, 0x00, 0x00),
                edge_width: 1.0,
                opacity: 1.0,
            },
            color_by_service: false,
            plate: PlateStyle {
                border_px: 0.0,
                ..PlateStyle::default()
            },
            badge: BadgeStyle {
                enabled: false,
                ..BadgeStyle::default()
            },
            legend: LegendStyle {
                mode: LegendMode::Vacant,
                corner: Corner::TopRight,
                title: None,
            },
            panel: PanelStyle {
                enabled: false,
                ..PanelStyle::default()
            },
        },
        dashboard: DashboardSettings::default(),
    }
}
