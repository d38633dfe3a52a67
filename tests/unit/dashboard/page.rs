use super::*;
use crate::{
    data::table::ObservationTable,
    foundation::core::Rgba8,
    render::panel::ServiceRow,
    test_support::{occupied, ts, vacant},
};

fn stats() -> FrameStats {
    let table = ObservationTable::from_rows(vec![
        occupied(ts(9, 0), 1, Some(Service::Uber), None),
        occupied(ts(9, 0), 2, Some(Service::Uber), None),
        occupied(ts(9, 0), 3, Some(Service::Lyft), None),
        vacant(ts(9, 0), 4),
    ]);
    FrameStats::compute(&table.frame(ts(9, 0)), 24)
}

fn panel() -> PanelView {
    PanelView {
        rate_pct: 12.4,
        rate_color: Rgba8::rgb(0x27, 0xae, 0x60),
        vacant: 21,
        rows: vec![
            ServiceRow {
                service: Service::Uber,
                count: 2,
                color: Rgba8::BLACK,
                bar_fraction: 1.0,
                share_pct: 66.7,
                logo: Some((28.0, 28.0)),
            },
            ServiceRow {
                service: Service::Waymo,
                count: 0,
                color: Rgba8::rgb(0, 0xb4, 0xa2),
                bar_fraction: 0.0,
                share_pct: 0.0,
                logo: None,
            },
        ],
    }
}

fn page(kind: PageKind, position: usize) -> String {
    let stats = stats();
    let panel = panel();
    let config = VizConfig::default();
    let stamps = [ts(9, 0), ts(9, 5), ts(9, 10)];
    let href = |key: &ImageKey| match key {
        ImageKey::Badge(Service::Uber) | ImageKey::PanelLogo(Service::Uber) => {
            Some("assets/logos/uber.png".to_owned())
        }
        _ => None,
    };
    render_page(&PageContext {
        kind,
        position,
        total: 3,
        timestamps: &stamps,
        stats: &stats,
        panel: &panel,
        map_svg: "<svg id=\"map\"></svg>",
        interval: RefreshInterval::new(1.5).unwrap(),
        config: &config,
        asset_href: &href,
    })
}

#[test]
fn frame_files_are_zero_padded() {
    assert_eq!(frame_file(0), "frame_0000.html");
    assert_eq!(frame_file(123), "frame_0123.html");
}

#[test]
fn metric_cards_show_rate_available_and_vehicles() {
    let html = metric_cards_html(&stats());
    assert!(html.contains("Occupancy Rate</div><div class=\"metric-value\">12.5%"));
    assert!(html.contains("Available Spots</div><div class=\"metric-value\">1<"));
    assert!(html.contains("Total Vehicles</div><div class=\"metric-value\">3<"));
}

#[test]
fn auto_page_refreshes_to_next_position_wrapping() {
    let html = page(PageKind::Auto, 2);
    assert!(html.contains(r#"<meta http-equiv="refresh" content="1.5;url=frame_0000.html">"#));
    assert!(html.contains(r#"href="../manual/frame_0002.html">Auto-refresh: on (1.5s)"#));
}

#[test]
fn manual_page_links_neighbors_and_auto_toggle() {
    let html = page(PageKind::Manual, 0);
    assert!(!html.contains("http-equiv"));
    assert!(html.contains(r#"href="frame_0002.html">&larr; Prev"#));
    assert!(html.contains(r#"href="frame_0001.html">Next &rarr;"#));
    assert!(html.contains(r#"href="../auto/frame_0000.html">Auto-refresh: off"#));
    assert!(html.contains(r#"src="../assets/logos/uber.png""#));
    assert!(html.contains(r#"<svg id="map"></svg>"#));
}

#[test]
fn index_page_points_into_manual_pages() {
    let html = page(PageKind::Index, 0);
    assert!(html.contains(r#"href="manual/frame_0001.html""#));
    assert!(html.contains(r#"href="auto/frame_0000.html""#));
    assert!(html.contains(r#"src="assets/logos/uber.png""#));
    assert!(html.contains("March 14, 2025 at 09:00 AM"));
    assert!(html.contains("Position 1 of 3"));
}

#[test]
fn live_page_reloads_itself_without_links() {
    let html = page(PageKind::Live, 1);
    assert!(html.contains(r#"<meta http-equiv="refresh" content="1.5">"#));
    assert!(!html.contains("Prev"));
    assert!(html.contains("disabled"));
}

#[test]
fn breakdown_lists_share_of_vehicles() {
    let html = page(PageKind::Index, 0);
    assert!(html.contains("66.7% of vehicles"));
    assert!(html.contains("33.3% of vehicles"));
    assert!(html.contains("0.0% of vehicles"));
}

#[test]
fn panel_shows_rate_available_and_initial_fallback() {
    let html = panel_html(&panel(), |s| {
        (s == Service::Uber).then(|| "logos/uber.png".to_owned())
    });
    assert!(html.contains("LIVE STATUS"));
    assert!(html.contains(">12%<"));
    assert!(html.contains(">21<"));
    assert!(html.contains(r#"<img src="logos/uber.png" alt="Uber" width="28">"#));
    assert!(html.contains(">W</span>"));
    assert!(html.contains("width:100.0%"));
    assert!(html.contains("width:0.0%"));
}
