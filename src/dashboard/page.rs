//! Static HTML pages for the dashboard.

use std::fmt::Write as _;

use chrono::NaiveDateTime;

use crate::{
    assets::store::ImageKey,
    config::{VizConfig, format_time},
    data::observation::Service,
    foundation::core::escape_markup,
    render::panel::{AVAILABLE, PanelView},
    sequence::session::RefreshInterval,
    stats::aggregate::FrameStats,
};

/// Which flavor of page is being written; decides links and reload behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    /// `index.html`: position 0, links into `manual/`.
    Index,
    /// `manual/frame_NNNN.html`: navigation only.
    Manual,
    /// `auto/frame_NNNN.html`: reloads to the next position after the interval.
    Auto,
    /// `live.html`: reloads itself; the content is rewritten by the live loop.
    Live,
}

impl PageKind {
    /// Prefix from this page to the export root.
    pub fn root_prefix(self) -> &'static str {
        match self {
            Self::Index | Self::Live => "",
            Self::Manual | Self::Auto => "../",
        }
    }
}

pub fn frame_file(index: usize) -> String {
    format!("frame_{index:04}.html")
}

/// Everything one page shows.
pub struct PageContext<'a> {
    pub kind: PageKind,
    pub position: usize,
    pub total: usize,
    pub timestamps: &'a [NaiveDateTime],
    pub stats: &'a FrameStats,
    pub panel: &'a PanelView,
    pub map_svg: &'a str,
    pub interval: RefreshInterval,
    pub config: &'a VizConfig,
    /// Image URL relative to the export root.
    pub asset_href: &'a dyn Fn(&ImageKey) -> Option<String>,
}

impl PageContext<'_> {
    fn href(&self, key: &ImageKey) -> Option<String> {
        (self.asset_href)(key).map(|h| format!("{}{h}", self.kind.root_prefix()))
    }

    fn next(&self) -> usize {
        (self.position + 1) % self.total
    }

    fn prev(&self) -> usize {
        (self.position + self.total - 1) % self.total
    }
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let cfg = &ctx.config.dashboard;
    let timestamp = ctx.stats.timestamp;
    let mut s = String::with_capacity(16 * 1024);

    s.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    match ctx.kind {
        PageKind::Auto => {
            let _ = writeln!(
                s,
                r#"<meta http-equiv="refresh" content="{};url={}">"#,
                ctx.interval.as_secs_f64(),
                frame_file(ctx.next())
            );
        }
        PageKind::Live => {
            let _ = writeln!(
                s,
                r#"<meta http-equiv="refresh" content="{}">"#,
                ctx.interval.as_secs_f64()
            );
        }
        PageKind::Index | PageKind::Manual => {}
    }
    let _ = writeln!(s, "<title>{}</title>", escape_markup(&cfg.page_title));
    let _ = writeln!(s, "<style>{STYLE}</style>\n</head>\n<body>");

    let _ = writeln!(
        s,
        r#"<header class="main-header"><h1>{}</h1></header>"#,
        escape_markup(&cfg.heading)
    );
    let _ = writeln!(
        s,
        r#"<div class="timestamp"><strong>{}</strong></div>"#,
        escape_markup(&format_time(timestamp, &cfg.time_format))
    );

    s.push_str(&controls_html(ctx));
    s.push_str(&metric_cards_html(ctx.stats));
    s.push_str(&service_breakdown_html(ctx));

    s.push_str("<h3>Parking Map</h3>\n<div class=\"map-row\">\n<div class=\"map-col\">");
    s.push_str(ctx.map_svg);
    s.push_str("</div>\n<div class=\"panel-col\">");
    s.push_str(&panel_html(ctx.panel, |service| {
        ctx.href(&ImageKey::PanelLogo(service))
    }));
    s.push_str("</div>\n</div>\n");

    let _ = writeln!(
        s,
        r#"<footer>Position {} of {} &middot; {} to {}</footer>"#,
        ctx.position + 1,
        ctx.total,
        ctx.timestamps
            .first()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
        ctx.timestamps
            .last()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    );
    s.push_str("</body>\n</html>\n");
    s
}

/// Slider, prev/next links and the auto-refresh toggle.
fn controls_html(ctx: &PageContext<'_>) -> String {
    let (dir, toggle_href, toggle_label) = match ctx.kind {
        PageKind::Index => (
            "manual/",
            Some(format!("auto/{}", frame_file(ctx.position))),
            "Auto-refresh: off".to_owned(),
        ),
        PageKind::Manual => (
            "",
            Some(format!("../auto/{}", frame_file(ctx.position))),
            "Auto-refresh: off".to_owned(),
        ),
        PageKind::Auto => (
            "",
            Some(format!("../manual/{}", frame_file(ctx.position))),
            format!("Auto-refresh: on ({})", ctx.interval),
        ),
        PageKind::Live => ("", None, format!("Live: every {}", ctx.interval)),
    };

    let mut s = String::from("<nav class=\"controls\">");
    if ctx.kind == PageKind::Live {
        let _ = write!(
            s,
            r#"<input type="range" min="0" max="{}" value="{}" disabled>"#,
            ctx.total - 1,
            ctx.position
        );
    } else {
        let _ = write!(
            s,
            r#"<a class="step" href="{dir}{}">&larr; Prev</a>"#,
            frame_file(ctx.prev())
        );
        let _ = write!(
            s,
            r#"<input type="range" min="0" max="{}" value="{}" onchange="location.href='{dir}frame_'+String(this.value).padStart(4,'0')+'.html'">"#,
            ctx.total - 1,
            ctx.position
        );
        let _ = write!(
            s,
            r#"<a class="step" href="{dir}{}">Next &rarr;</a>"#,
            frame_file(ctx.next())
        );
    }
    match toggle_href {
        Some(href) => {
            let _ = write!(
                s,
                r#"<a class="toggle" href="{href}">{}</a>"#,
                escape_markup(&toggle_label)
            );
        }
        None => {
            let _ = write!(
                s,
                r#"<span class="toggle">{}</span>"#,
                escape_markup(&toggle_label)
            );
        }
    }
    s.push_str("</nav>\n");
    s
}

pub fn metric_cards_html(stats: &FrameStats) -> String {
    let cards = [
        ("Occupancy Rate", format!("{:.1}%", stats.occupancy_rate)),
        ("Available Spots", stats.vacant_count.to_string()),
        ("Total Vehicles", stats.occupied_count.to_string()),
    ];
    let mut s = String::from("<section class=\"metrics\">");
    for (label, value) in cards {
        let _ = write!(
            s,
            r#"<div class="metric"><div class="metric-label">{label}</div><div class="metric-value">{value}</div></div>"#
        );
    }
    s.push_str("</section>\n");
    s
}

fn service_breakdown_html(ctx: &PageContext<'_>) -> String {
    let mut s = String::from("<h3>Service Breakdown</h3>\n<section class=\"services\">");
    for (service, count) in ctx.stats.per_service.iter() {
        let color = ctx.config.style.services.color(service).to_hex();
        let pct = ctx.stats.share_of_vehicles(service);
        let icon = logo_or_initial(
            ctx.href(&ImageKey::Badge(service)),
            service,
            &color,
            60,
            "24px",
        );
        let _ = write!(
            s,
            r#"<div class="service">{icon}<h2 style="color:{color}">{count}</h2><div class="track"><div class="fill" style="background:{color};width:{pct:.1}%"></div></div><p>{pct:.1}% of vehicles</p></div>"#
        );
    }
    s.push_str("</section>\n");
    s
}

fn logo_or_initial(
    href: Option<String>,
    service: Service,
    color: &str,
    width_px: u32,
    initial_size: &str,
) -> String {
    match href {
        Some(h) => format!(
            r#"<img src="{}" alt="{}" width="{width_px}">"#,
            escape_markup(&h),
            service.label()
        ),
        None => format!(
            r#"<span style="font-size:{initial_size};font-weight:bold;color:{color}">{}</span>"#,
            service.initial()
        ),
    }
}

/// HTML rendition of the "LIVE STATUS" panel.
pub fn panel_html(view: &PanelView, logo_href: impl Fn(Service) -> Option<String>) -> String {
    let mut rows = String::new();
    for row in &view.rows {
        let color = row.color.to_hex();
        let icon = logo_or_initial(logo_href(row.service), row.service, &color, 28, "12px");
        let width = if row.count > 0 {
            (row.bar_fraction * 100.0).max(4.0)
        } else {
            0.0
        };
        let _ = write!(
            rows,
            r#"<div class="prow"><div class="picon">{icon}</div><div class="ptrack"><div class="pfill" style="background:{color};width:{width:.1}%"></div></div><div class="pcount" style="color:{color}">{}</div></div>"#,
            row.count
        );
    }

    format!(
        r#"<div class="panel"><div class="panel-head">LIVE STATUS</div><div class="panel-body"><div class="pstat"><div class="big" style="color:{rate_color}">{rate}</div><div class="caption">OCCUPANCY</div></div><div class="pstat"><div class="bigger" style="color:{available}">{vacant}</div><div class="caption">SPOTS AVAILABLE</div></div><div class="divider"></div><div class="by-service">BY SERVICE</div>{rows}</div></div>"#,
        rate_color = view.rate_color.to_hex(),
        rate = view.rate_text(),
        available = AVAILABLE.to_hex(),
        vacant = view.vacant,
    )
}

const STYLE: &str = concat!(
    "body{margin:0;padding:1.5rem;font-family:Arial,Helvetica,sans-serif;color:#e0e0e0;",
    "background:linear-gradient(135deg,#1e1e2e 0%,#2d2d44 100%);min-height:100vh}",
    ".main-header{background:linear-gradient(135deg,#0f3460 0%,#16213e 100%);padding:2rem;",
    "border-radius:20px;margin-bottom:1.5rem;box-shadow:0 8px 32px rgba(0,0,0,.4)}",
    ".main-header h1{color:#fff;font-size:2.2rem;margin:0;text-align:center}",
    ".timestamp{text-align:center;color:#b0b0b0;margin-bottom:1rem}",
    ".controls{display:flex;gap:1rem;align-items:center;justify-content:center;margin-bottom:1.5rem}",
    ".controls input{flex:1;max-width:600px}",
    ".controls a{color:#fff;text-decoration:none;padding:.4rem .8rem;border-radius:8px;",
    "background:rgba(255,255,255,.1)}",
    ".metrics{display:flex;gap:1rem}",
    ".metric{flex:1;background:rgba(255,255,255,.08);border:1px solid rgba(255,255,255,.15);",
    "border-radius:15px;padding:1.5rem}",
    ".metric-label{color:#b0b0b0}.metric-value{font-size:2.5rem;font-weight:700;color:#fff}",
    ".services{display:flex;justify-content:space-around}",
    ".service{text-align:center;width:22%}",
    ".track{background:#333;border-radius:10px;height:20px}.fill{height:100%;border-radius:10px}",
    ".service p{color:#888}",
    ".map-row{display:flex;gap:1rem}.map-col{flex:7}.panel-col{flex:3}",
    ".map{width:100%;height:auto}",
    ".panel{background:#f5f6fa;border-radius:15px;border:2px solid #2c3e50;overflow:hidden;",
    "box-shadow:4px 4px 8px rgba(0,0,0,.3)}",
    ".panel-head{background:#2c3e50;color:#fff;font-weight:bold;text-align:center;padding:12px 0;",
    "letter-spacing:1px;font-size:14px}",
    ".panel-body{padding:20px}.pstat{text-align:center;margin-bottom:20px}",
    ".big{font-size:32px;font-weight:bold}.bigger{font-size:40px;font-weight:bold}",
    ".caption{font-size:9px;color:#7f8c8d;font-weight:bold;letter-spacing:.5px}",
    ".divider{height:2px;background:#ecf0f1;margin:20px 0}",
    ".by-service{text-align:center;font-size:10px;font-weight:bold;color:#2c3e50;margin-bottom:15px}",
    ".prow{display:flex;align-items:center;margin-bottom:20px}",
    ".picon{width:35px;display:flex;justify-content:center}",
    ".ptrack{flex:1;margin-left:10px;background:#ecf0f1;border-radius:5px;height:10px;overflow:hidden}",
    ".pfill{height:100%;border-radius:5px}",
    ".pcount{width:30px;text-align:right;font-size:14px;font-weight:bold;margin-left:10px}",
    "footer{margin-top:1.5rem;text-align:center;color:#888;font-size:.85rem}",
);

#[cfg(test)]
#[path = "../../tests/unit/dashboard/page.rs"]
mod tests;
