use crate::{
    assets::store::{AssetStore, ImageKey},
    config::{PanelStyle, VizConfig},
    data::observation::Service,
    foundation::core::{Point, Rect, Rgba8},
    render::scene::{DrawItem, Stroke, TextAnchor, TextLabel},
    stats::aggregate::FrameStats,
};

pub const INK: Rgba8 = Rgba8::rgb(0x2c, 0x3e, 0x50);
pub const MUTED: Rgba8 = Rgba8::rgb(0x7f, 0x8c, 0x8d);
pub const TRACK: Rgba8 = Rgba8::rgb(0xec, 0xf0, 0xf1);
pub const AVAILABLE: Rgba8 = Rgba8::rgb(0x27, 0xae, 0x60);

const HEADER_H: f64 = 45.0;
const CORNER: f64 = 15.0;
const FIRST_ROW: f64 = 270.0;
const ROW_STEP: f64 = 48.0;
const BAR_X: f64 = 60.0;
const BAR_W: f64 = 130.0;
const BAR_H: f64 = 10.0;
const MIN_BAR_W: f64 = 5.0;

/// One service line in the statistics panel.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceRow {
    pub service: Service,
    pub count: usize,
    pub color: Rgba8,
    pub bar_fraction: f64,
    pub share_pct: f64,
    /// Panel logo size, when the logo loaded.
    pub logo: Option<(f64, f64)>,
}

/// Presentation-ready numbers for the "LIVE STATUS" panel, shared by raster and HTML output.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelView {
    pub rate_pct: f64,
    pub rate_color: Rgba8,
    pub vacant: usize,
    pub rows: Vec<ServiceRow>,
}

impl PanelView {
    pub fn new(stats: &FrameStats, assets: &AssetStore, config: &VizConfig) -> Self {
        let rows = stats
            .per_service
            .iter()
            .map(|(service, count)| ServiceRow {
                service,
                count,
                color: config.style.services.color(service),
                bar_fraction: stats.per_service.bar_fraction(service),
                share_pct: stats.share_of_vehicles(service),
                logo: assets.panel_logo(service).map(|l| l.size()),
            })
            .collect();
        Self {
            rate_pct: stats.occupancy_rate,
            rate_color: stats.rate_band().color(),
            vacant: stats.vacant_count,
            rows,
        }
    }

    pub fn rate_text(&self) -> String {
        format!("{:.0}%", self.rate_pct)
    }
}

/// Lay the panel out with its top-left corner at `origin` (map space).
pub fn compose_panel(
    view: &PanelView,
    origin: Point,
    geom: &PanelStyle,
) -> (Vec<DrawItem>, Vec<TextLabel>) {
    let (px, py, w, h) = (origin.x, origin.y, geom.width, geom.height);
    let cx = px + w / 2.0;

    let mut items = vec![
        DrawItem::RoundedRect {
            rect: Rect::new(px + 4.0, py + 4.0, px + 4.0 + w, py + 4.0 + h),
            radius: CORNER,
            fill: Rgba8::rgb(0x33, 0x33, 0x33),
            edge: None,
            opacity: 0.3,
        },
        DrawItem::RoundedRect {
            rect: Rect::new(px, py, px + w, py + h),
            radius: CORNER,
            fill: Rgba8::rgb(0xf0, 0xf0, 0xf0),
            edge: Some(Stroke {
                color: INK,
                width: 2.0,
            }),
            opacity: 0.97,
        },
        DrawItem::RoundedRect {
            rect: Rect::new(px, py, px + w, py + HEADER_H),
            radius: CORNER,
            fill: INK,
            edge: None,
            opacity: 1.0,
        },
        DrawItem::RoundedRect {
            rect: Rect::new(px + 20.0, py + 219.0, px + w - 20.0, py + 221.0),
            radius: 0.0,
            fill: TRACK,
            edge: None,
            opacity: 1.0,
        },
    ];

    let mut labels = vec![
        TextLabel::new(Point::new(cx, py + 25.0), "LIVE STATUS", 14.0, Rgba8::WHITE).bold(),
        TextLabel::new(Point::new(cx, py + 85.0), view.rate_text(), 32.0, view.rate_color).bold(),
        TextLabel::new(Point::new(cx, py + 115.0), "OCCUPANCY", 9.0, MUTED).bold(),
        TextLabel::new(
            Point::new(cx, py + 160.0),
            view.vacant.to_string(),
            40.0,
            AVAILABLE,
        )
        .bold(),
        TextLabel::new(Point::new(cx, py + 198.0), "SPOTS AVAILABLE", 9.0, MUTED).bold(),
        TextLabel::new(Point::new(cx, py + 245.0), "BY SERVICE", 10.0, INK).bold(),
    ];

    let mut row_y = py + FIRST_ROW;
    for row in &view.rows {
        let icon = Point::new(px + 35.0, row_y + 8.0);
        if let Some(size) = row.logo {
            items.push(DrawItem::Image {
                key: ImageKey::PanelLogo(row.service),
                rect: Rect::from_center_size(icon, size),
                opacity: 1.0,
            });
        } else {
            labels.push(
                TextLabel::new(icon, row.service.initial().to_string(), 12.0, row.color).bold(),
            );
        }

        labels.push(
            TextLabel::new(
                Point::new(px + w - 25.0, row_y + 8.0),
                row.count.to_string(),
                14.0,
                row.color,
            )
            .bold()
            .anchored(TextAnchor::End),
        );

        let bar_top = row_y + 20.0;
        items.push(DrawItem::RoundedRect {
            rect: Rect::new(px + BAR_X, bar_top, px + BAR_X + BAR_W, bar_top + BAR_H),
            radius: BAR_H / 2.0,
            fill: TRACK,
            edge: None,
            opacity: 1.0,
        });
        if row.count > 0 {
            let bw = (row.bar_fraction * BAR_W).max(MIN_BAR_W);
            items.push(DrawItem::RoundedRect {
                rect: Rect::new(px + BAR_X, bar_top, px + BAR_X + bw, bar_top + BAR_H),
                radius: BAR_H / 2.0,
                fill: row.color,
                edge: None,
                opacity: 0.85,
            });
        }

        row_y += ROW_STEP;
    }

    (items, labels)
}

#[cfg(test)]
#[path = "../../tests/unit/render/panel.rs"]
mod tests;
