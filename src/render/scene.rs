use std::collections::BTreeSet;

use crate::{
    assets::store::{AssetStore, ImageKey},
    config::{Corner, LegendMode, VizConfig},
    data::{
        observation::{Service, SpotObservation, SpotStatus},
        table::Frame,
    },
    foundation::{
        coords::{CoordMapper, Origin},
        core::{Canvas, Point, Rect, Rgba8, Vec2},
        error::VizResult,
    },
    render::panel::{PanelView, compose_panel},
    stats::aggregate::FrameStats,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba8,
    pub width: f64,
}

/// Shape or image drawn in painter's order.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawItem {
    Image {
        key: ImageKey,
        rect: Rect,
        opacity: f32,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgba8,
        edge: Option<Stroke>,
        opacity: f32,
    },
    RoundedRect {
        rect: Rect,
        radius: f64,
        fill: Rgba8,
        edge: Option<Stroke>,
        opacity: f32,
    },
}

impl DrawItem {
    pub fn translated(self, by: Vec2) -> Self {
        match self {
            Self::Image { key, rect, opacity } => Self::Image {
                key,
                rect: rect + by,
                opacity,
            },
            Self::Circle {
                center,
                radius,
                fill,
                edge,
                opacity,
            } => Self::Circle {
                center: center + by,
                radius,
                fill,
                edge,
                opacity,
            },
            Self::RoundedRect {
                rect,
                radius,
                fill,
                edge,
                opacity,
            } => Self::RoundedRect {
                rect: rect + by,
                radius,
                fill,
                edge,
                opacity,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// Single line of text, vertically centered on `pos`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub pos: Point,
    pub text: String,
    pub size_px: f32,
    pub bold: bool,
    pub color: Rgba8,
    pub anchor: TextAnchor,
}

impl TextLabel {
    pub fn new(pos: Point, text: impl Into<String>, size_px: f32, color: Rgba8) -> Self {
        Self {
            pos,
            text: text.into(),
            size_px,
            bold: false,
            color,
            anchor: TextAnchor::Middle,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn anchored(mut self, anchor: TextAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn translated(mut self, by: Vec2) -> Self {
        self.pos += by;
        self
    }
}

/// How one spot ended up being drawn.
#[derive(Clone, Debug, PartialEq)]
pub enum SpotMark {
    Plate {
        /// Plate image bounds (inside the border).
        rect: Rect,
        badge: Option<BadgeMark>,
    },
    Marker {
        center: Point,
        radius: f64,
        fill: Rgba8,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum BadgeMark {
    Logo(Rect),
    Dot(Point),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotGlyph {
    pub slot_id: u32,
    pub status: SpotStatus,
    pub service: Option<Service>,
    pub plate_number: Option<String>,
    pub mark: SpotMark,
}

impl SpotGlyph {
    fn translated(mut self, by: Vec2) -> Self {
        self.mark = match self.mark {
            SpotMark::Plate { rect, badge } => SpotMark::Plate {
                rect: rect + by,
                badge: badge.map(|b| match b {
                    BadgeMark::Logo(r) => BadgeMark::Logo(r + by),
                    BadgeMark::Dot(p) => BadgeMark::Dot(p + by),
                }),
            },
            SpotMark::Marker {
                center,
                radius,
                fill,
            } => SpotMark::Marker {
                center: center + by,
                radius,
                fill,
            },
        };
        self
    }
}

/// Spot drawings for one frame, in map space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapLayer {
    pub items: Vec<DrawItem>,
    pub spots: Vec<SpotGlyph>,
    /// Services drawn on the map (occupied spots only).
    pub services_shown: BTreeSet<Service>,
}

/// Everything needed to rasterize one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub canvas: Canvas,
    pub background: Rgba8,
    pub items: Vec<DrawItem>,
    /// Drawn above all items.
    pub labels: Vec<TextLabel>,
    pub spots: Vec<SpotGlyph>,
}

/// Service styling for an occupied row; rows without a service are drawn as taxis.
pub fn display_service(row: &SpotObservation) -> Service {
    row.service.unwrap_or(Service::Taxi)
}

/// Build the spot layer. Derived positions (badges) are computed in source space, then mapped.
pub fn compose_map_layer(
    frame: &Frame<'_>,
    assets: &AssetStore,
    config: &VizConfig,
    mapper: &CoordMapper,
) -> MapLayer {
    let style = &config.style;
    let mut layer = MapLayer::default();

    let vm = style.vacant_marker;
    for r in frame.vacant() {
        let center = mapper.map(r.x, r.y);
        layer.items.push(DrawItem::Circle {
            center,
            radius: vm.radius,
            fill: vm.fill,
            edge: edge(vm.edge, vm.edge_width),
            opacity: vm.opacity,
        });
        layer.spots.push(SpotGlyph {
            slot_id: r.slot_id,
            status: SpotStatus::Vacant,
            service: r.service,
            plate_number: r.plate_number.clone(),
            mark: SpotMark::Marker {
                center,
                radius: vm.radius,
                fill: vm.fill,
            },
        });
    }

    for r in frame.occupied() {
        let service = display_service(r);
        let color = style.services.color(service);
        layer.services_shown.insert(service);

        let plate = r
            .plate_number
            .as_deref()
            .and_then(|p| assets.plate(p).map(|img| (p, img)));

        let mark = match plate {
            Some((plate_number, img)) => {
                let center = mapper.map(r.x, r.y);
                let (w, h) = img.size();
                let rect = Rect::from_center_size(center, (w, h));
                let border = style.plate.border_px;
                if border > 0.0 {
                    layer.items.push(DrawItem::RoundedRect {
                        rect: rect.inflate(border, border),
                        radius: style.plate.corner_radius,
                        fill: Rgba8::WHITE,
                        edge: edge(color, border),
                        opacity: 1.0,
                    });
                }
                layer.items.push(DrawItem::Image {
                    key: ImageKey::Plate(plate_number.trim().to_owned()),
                    rect,
                    opacity: 1.0,
                });

                let badge = style.badge.enabled.then(|| {
                    let b = f64::from(style.badge.size_px);
                    let dy = h / 2.0 + border + style.badge.gap_px + b / 2.0;
                    let at = mapper.map_below(r.x, r.y, dy);
                    match assets.badge(service) {
                        Some(logo) => {
                            let rect = Rect::from_center_size(at, logo.size());
                            layer.items.push(DrawItem::Image {
                                key: ImageKey::Badge(service),
                                rect,
                                opacity: 1.0,
                            });
                            BadgeMark::Logo(rect)
                        }
                        None => {
                            layer.items.push(DrawItem::Circle {
                                center: at,
                                radius: style.badge.dot_radius,
                                fill: color,
                                edge: edge(Rgba8::WHITE, 1.5),
                                opacity: 1.0,
                            });
                            BadgeMark::Dot(at)
                        }
                    }
                });
                SpotMark::Plate { rect, badge }
            }
            None => {
                tracing::debug!(
                    slot_id = r.slot_id,
                    plate = r.plate_number.as_deref().unwrap_or(""),
                    "no plate image; drawing marker"
                );
                let om = style.occupied_marker;
                let fill = if style.color_by_service { color } else { om.fill };
                let center = mapper.map(r.x, r.y);
                layer.items.push(DrawItem::Circle {
                    center,
                    radius: om.radius,
                    fill,
                    edge: edge(om.edge, om.edge_width),
                    opacity: om.opacity,
                });
                SpotMark::Marker {
                    center,
                    radius: om.radius,
                    fill,
                }
            }
        };

        layer.spots.push(SpotGlyph {
            slot_id: r.slot_id,
            status: SpotStatus::Occupied,
            service: Some(service),
            plate_number: r.plate_number.clone(),
            mark,
        });
    }

    layer
}

/// Full raster frame: page background, header, map, spots, legend and statistics panel.
pub fn compose_frame(
    frame: &Frame<'_>,
    stats: &FrameStats,
    assets: &AssetStore,
    config: &VizConfig,
) -> VizResult<Scene> {
    let style = &config.style;
    let (map_w, map_h) = assets.map_size();
    let header_h = style.header.height_px;
    let canvas = Canvas::new(map_w, map_h + header_h)?;
    let map_w = f64::from(map_w);
    let map_h = f64::from(map_h);
    let shift = Vec2::new(0.0, f64::from(header_h));

    let mut items = Vec::new();
    if assets.background().is_some() {
        items.push(DrawItem::Image {
            key: ImageKey::Background,
            rect: Rect::new(0.0, 0.0, map_w, map_h) + shift,
            opacity: style.background_opacity,
        });
    }
    let mut labels = header_labels(frame, config, map_w);

    let mapper = CoordMapper::new(map_h, config.vertical_offset, Origin::TopLeft);
    let layer = compose_map_layer(frame, assets, config, &mapper);
    items.extend(layer.items.into_iter().map(|i| i.translated(shift)));
    let spots = layer
        .spots
        .into_iter()
        .map(|s| s.translated(shift))
        .collect();

    let (legend_items, legend_labels) = compose_legend(&layer.services_shown, config, map_w);
    items.extend(legend_items.into_iter().map(|i| i.translated(shift)));
    labels.extend(legend_labels.into_iter().map(|l| l.translated(shift)));

    if style.panel.enabled {
        let view = PanelView::new(stats, assets, config);
        let origin = Point::new(map_w - style.panel.right_inset, style.panel.top);
        let (panel_items, panel_labels) = compose_panel(&view, origin, &style.panel);
        items.extend(panel_items.into_iter().map(|i| i.translated(shift)));
        labels.extend(panel_labels.into_iter().map(|l| l.translated(shift)));
    }

    Ok(Scene {
        canvas,
        background: style.page_background,
        items,
        labels,
        spots,
    })
}

fn header_labels(frame: &Frame<'_>, config: &VizConfig, map_w: f64) -> Vec<TextLabel> {
    let header = &config.style.header;
    let h = f64::from(header.height_px);
    let lines = header.lines(frame.timestamp);
    let n = lines.len() as f64;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let y = h * (i as f64 + 1.0) / (n + 1.0);
            TextLabel::new(Point::new(map_w / 2.0, y), text, header.size_px, header.color).bold()
        })
        .collect()
}

const LEGEND_MARGIN: f64 = 10.0;
const LEGEND_WIDTH: f64 = 150.0;
const LEGEND_ROW: f64 = 22.0;
const LEGEND_PAD: f64 = 8.0;

/// Legend box in map space. Empty when there is nothing to list.
pub fn compose_legend(
    services_shown: &BTreeSet<Service>,
    config: &VizConfig,
    map_w: f64,
) -> (Vec<DrawItem>, Vec<TextLabel>) {
    let style = &config.style;
    let entries: Vec<(String, Rgba8, Option<Stroke>)> = match style.legend.mode {
        LegendMode::Hidden => Vec::new(),
        LegendMode::Vacant => vec![(
            "Vacant".to_owned(),
            style.vacant_marker.fill,
            edge(style.vacant_marker.edge, style.vacant_marker.edge_width),
        )],
        LegendMode::ServicesShown => Service::CONCRETE
            .into_iter()
            .filter(|s| services_shown.contains(s))
            .map(|s| {
                (
                    s.label().to_owned(),
                    style.services.color(s),
                    edge(Rgba8::WHITE, 1.5),
                )
            })
            .collect(),
    };
    if entries.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let title_rows = usize::from(style.legend.title.is_some());
    let height = LEGEND_PAD * 2.0 + LEGEND_ROW * (entries.len() + title_rows) as f64;
    let x0 = match style.legend.corner {
        Corner::TopLeft => LEGEND_MARGIN,
        Corner::TopRight => map_w - LEGEND_MARGIN - LEGEND_WIDTH,
    };
    let y0 = LEGEND_MARGIN;
    let ink = Rgba8::rgb(0x2c, 0x3e, 0x50);

    let mut items = vec![DrawItem::RoundedRect {
        rect: Rect::new(x0, y0, x0 + LEGEND_WIDTH, y0 + height),
        radius: 4.0,
        fill: Rgba8::WHITE,
        edge: edge(ink, 1.0),
        opacity: 0.95,
    }];
    let mut labels = Vec::new();

    let mut row_y = y0 + LEGEND_PAD + LEGEND_ROW / 2.0;
    if let Some(title) = &style.legend.title {
        labels.push(
            TextLabel::new(Point::new(x0 + LEGEND_WIDTH / 2.0, row_y), title, 13.0, ink).bold(),
        );
        row_y += LEGEND_ROW;
    }
    for (text, fill, stroke) in entries {
        items.push(DrawItem::Circle {
            center: Point::new(x0 + LEGEND_PAD + 8.0, row_y),
            radius: 6.0,
            fill,
            edge: stroke,
            opacity: 1.0,
        });
        labels.push(
            TextLabel::new(Point::new(x0 + LEGEND_PAD + 22.0, row_y), text, 12.0, Rgba8::BLACK)
                .anchored(TextAnchor::Start),
        );
        row_y += LEGEND_ROW;
    }
    (items, labels)
}

fn edge(color: Rgba8, width: f64) -> Option<Stroke> {
    (width > 0.0).then_some(Stroke { color, width })
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
