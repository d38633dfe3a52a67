//! Map widget for the dashboard pages.
//!
//! The widget works like a plot: spots are placed with a bottom-left origin (`y` grows upwards),
//! then every point is converted back to SVG's top-down axis when emitted. Images keep their
//! orientation because only their anchor rectangles are converted.

use std::fmt::Write as _;

use crate::{
    assets::store::{AssetStore, ImageKey},
    config::VizConfig,
    data::{observation::SpotStatus, table::Frame},
    foundation::{
        coords::{CoordMapper, Origin},
        core::{Point, Rect, Rgba8, escape_markup},
    },
    render::{
        scene::{DrawItem, MapLayer, SpotGlyph, SpotMark, Stroke, compose_legend, compose_map_layer},
        svg_text::text_element,
    },
};

/// Plot area with `y` pointing up, `height` pixels tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlotFrame {
    pub width: f64,
    pub height: f64,
}

impl PlotFrame {
    pub fn to_svg_point(&self, p: Point) -> Point {
        Point::new(p.x, self.height - p.y)
    }

    pub fn to_svg_rect(&self, r: Rect) -> Rect {
        Rect::new(r.x0, self.height - r.y1, r.x1, self.height - r.y0)
    }
}

/// Spot layer for `frame`, in plot space.
pub fn plot_layer(
    frame: &Frame<'_>,
    assets: &AssetStore,
    config: &VizConfig,
) -> (PlotFrame, MapLayer) {
    let (w, h) = assets.map_size();
    let plot = PlotFrame {
        width: f64::from(w),
        height: f64::from(h),
    };
    let mapper = CoordMapper::new(plot.height, config.vertical_offset, Origin::BottomLeft);
    (plot, compose_map_layer(frame, assets, config, &mapper))
}

/// Render the widget. `href` resolves an image key to a URL relative to the page.
pub fn map_svg(
    plot: PlotFrame,
    layer: &MapLayer,
    config: &VizConfig,
    href: impl Fn(&ImageKey) -> Option<String>,
) -> String {
    let mut s = format!(
        r#"<svg class="map" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" preserveAspectRatio="xMidYMid meet" style="max-height:{mh}px">"#,
        w = plot.width,
        h = plot.height,
        mh = config.dashboard.map_height_px,
    );

    if let Some(url) = href(&ImageKey::Background) {
        let _ = write!(
            s,
            r#"<image href="{}" x="0" y="0" width="{}" height="{}" opacity="{}" preserveAspectRatio="none"/>"#,
            escape_markup(&url),
            plot.width,
            plot.height,
            config.style.background_opacity
        );
    }

    for item in &layer.items {
        write_item(&mut s, item, |r| plot.to_svg_rect(r), |p| plot.to_svg_point(p), &href);
    }
    for spot in &layer.spots {
        write_hover_target(&mut s, &plot, spot);
    }

    let (legend_items, legend_labels) = compose_legend(&layer.services_shown, config, plot.width);
    for item in &legend_items {
        write_item(&mut s, item, |r| r, |p| p, &href);
    }
    for label in &legend_labels {
        s.push_str(&text_element(label));
    }

    s.push_str("</svg>");
    s
}

/// Hover text for one spot.
pub fn spot_title(spot: &SpotGlyph) -> String {
    match spot.status {
        SpotStatus::Vacant => format!("Slot {}: {}", spot.slot_id, spot.status.as_str()),
        SpotStatus::Occupied => {
            let service = spot.service.map(|s| s.label()).unwrap_or("Taxi");
            match spot.plate_number.as_deref() {
                Some(plate) => format!("Slot {}: {service} ({plate})", spot.slot_id),
                None => format!("Slot {}: {service}", spot.slot_id),
            }
        }
    }
}

fn write_item(
    s: &mut String,
    item: &DrawItem,
    rect: impl Fn(Rect) -> Rect,
    point: impl Fn(Point) -> Point,
    href: &impl Fn(&ImageKey) -> Option<String>,
) {
    match item {
        DrawItem::Image { key, rect: r, opacity } => {
            let Some(url) = href(key) else {
                return;
            };
            let r = rect(*r);
            let _ = write!(
                s,
                r#"<image href="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"{} preserveAspectRatio="none"/>"#,
                escape_markup(&url),
                r.x0,
                r.y0,
                r.width(),
                r.height(),
                opacity_attr(*opacity)
            );
        }
        DrawItem::Circle {
            center,
            radius,
            fill,
            edge,
            opacity,
        } => {
            let c = point(*center);
            let _ = write!(
                s,
                r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}"{}{}{}/>"#,
                c.x,
                c.y,
                radius,
                fill_attr(*fill),
                stroke_attr(*edge),
                opacity_attr(*opacity)
            );
        }
        DrawItem::RoundedRect {
            rect: r,
            radius,
            fill,
            edge,
            opacity,
        } => {
            let r = rect(*r);
            let _ = write!(
                s,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}"{}{}{}/>"#,
                r.x0,
                r.y0,
                r.width(),
                r.height(),
                radius,
                fill_attr(*fill),
                stroke_attr(*edge),
                opacity_attr(*opacity)
            );
        }
    }
}

fn write_hover_target(s: &mut String, plot: &PlotFrame, spot: &SpotGlyph) {
    let title = escape_markup(&spot_title(spot));
    match &spot.mark {
        SpotMark::Plate { rect, .. } => {
            let r = plot.to_svg_rect(*rect);
            let _ = write!(
                s,
                r#"<rect class="spot" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="transparent"><title>{title}</title></rect>"#,
                r.x0,
                r.y0,
                r.width(),
                r.height()
            );
        }
        SpotMark::Marker { center, radius, .. } => {
            let c = plot.to_svg_point(*center);
            let _ = write!(
                s,
                r#"<circle class="spot" cx="{:.2}" cy="{:.2}" r="{:.2}" fill="transparent"><title>{title}</title></circle>"#,
                c.x, c.y, radius
            );
        }
    }
}

fn fill_attr(c: Rgba8) -> String {
    if c.a == 255 {
        format!(r#" fill="{}""#, c.to_hex())
    } else {
        format!(
            r#" fill="{}" fill-opacity="{:.3}""#,
            c.with_alpha(255).to_hex(),
            f32::from(c.a) / 255.0
        )
    }
}

fn stroke_attr(edge: Option<Stroke>) -> String {
    edge.map(|e| {
        format!(
            r#" stroke="{}" stroke-width="{}""#,
            e.color.with_alpha(255).to_hex(),
            e.width
        )
    })
    .unwrap_or_default()
}

fn opacity_attr(opacity: f32) -> String {
    if opacity < 1.0 {
        format!(r#" opacity="{opacity}""#)
    } else {
        String::new()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dashboard/map_svg.rs"]
mod tests;
