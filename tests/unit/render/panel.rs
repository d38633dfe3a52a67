use super::*;
use crate::{
    data::table::ObservationTable,
    test_support::{occupied, temp_dir, ts, vacant, write_solid_png},
};

fn row(service: Service, count: usize, bar_fraction: f64, logo: Option<(f64, f64)>) -> ServiceRow {
    ServiceRow {
        service,
        count,
        color: Rgba8::rgb(10, 20, 30),
        bar_fraction,
        share_pct: 0.0,
        logo,
    }
}

fn view(rows: Vec<ServiceRow>) -> PanelView {
    PanelView {
        rate_pct: 41.6,
        rate_color: Rgba8::rgb(0x27, 0xae, 0x60),
        vacant: 14,
        rows,
    }
}

fn bars(items: &[DrawItem]) -> Vec<Rect> {
    items
        .iter()
        .filter_map(|i| match i {
            DrawItem::RoundedRect { rect, radius, .. } if *radius == BAR_H / 2.0 => Some(*rect),
            _ => None,
        })
        .collect()
}

#[test]
fn view_collects_counts_shares_and_logos() {
    let root = temp_dir("panel_view");
    write_solid_png(&root.join("map.png"), 100, 100, [0, 0, 0, 255]);
    write_solid_png(&root.join("logos/waymo.png"), 56, 28, [0, 180, 162, 255]);

    let table = ObservationTable::from_rows(vec![
        occupied(ts(9, 0), 1, Some(Service::Waymo), None),
        occupied(ts(9, 0), 2, Some(Service::Waymo), None),
        occupied(ts(9, 0), 3, Some(Service::Uber), None),
        occupied(ts(9, 0), 5, Some(Service::Taxi), None),
        vacant(ts(9, 0), 4),
    ]);
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let stats = FrameStats::compute(&table.frame(ts(9, 0)), 24);

    let view = PanelView::new(&stats, &assets, &config);
    assert_eq!(view.rate_text(), "17%");
    assert_eq!(view.rate_color, Rgba8::rgb(0x27, 0xae, 0x60));

    let services: Vec<Service> = view.rows.iter().map(|r| r.service).collect();
    assert_eq!(services, Service::CONCRETE.to_vec());
    let waymo = &view.rows[2];
    assert_eq!(waymo.count, 2);
    assert_eq!(waymo.bar_fraction, 1.0);
    assert_eq!(waymo.logo, Some((28.0, 14.0)));
    assert!((view.rows[0].share_pct - 25.0).abs() < 1e-9);
    assert!(view.rows[0].logo.is_none());
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn rate_text_rounds_to_whole_percent() {
    assert_eq!(view(Vec::new()).rate_text(), "42%");
}

#[test]
fn bars_have_minimum_width_and_skip_empty_services() {
    let v = view(vec![
        row(Service::Uber, 10, 1.0, None),
        row(Service::Lyft, 1, 0.01, None),
        row(Service::Waymo, 0, 0.0, None),
    ]);
    let style = PanelStyle::default();
    let (items, _) = compose_panel(&v, Point::new(100.0, 50.0), &style);

    let bars = bars(&items);
    // three tracks plus two filled bars
    assert_eq!(bars.len(), 5);
    assert_eq!(bars[0], Rect::new(160.0, 340.0, 290.0, 350.0));
    assert_eq!(bars[1].width(), BAR_W);
    assert_eq!(bars[3].width(), MIN_BAR_W);
    assert_eq!(bars[4].y0, 50.0 + FIRST_ROW + 2.0 * ROW_STEP + 20.0);
}

#[test]
fn missing_logo_falls_back_to_service_initial() {
    let v = view(vec![
        row(Service::Uber, 1, 1.0, Some((28.0, 28.0))),
        row(Service::Taxi, 1, 1.0, None),
    ]);
    let (items, labels) = compose_panel(&v, Point::new(0.0, 0.0), &PanelStyle::default());

    assert!(items.iter().any(|i| matches!(
        i,
        DrawItem::Image { key: ImageKey::PanelLogo(Service::Uber), rect, .. }
            if *rect == Rect::new(21.0, 264.0, 49.0, 292.0)
    )));
    let initial = labels.iter().find(|l| l.text == "T").unwrap();
    assert_eq!(initial.pos, Point::new(35.0, 326.0));
}

#[test]
fn headline_labels_follow_view() {
    let v = view(Vec::new());
    let (_, labels) = compose_panel(&v, Point::new(0.0, 0.0), &PanelStyle::default());
    let texts: Vec<&str> = labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "LIVE STATUS",
            "42%",
            "OCCUPANCY",
            "14",
            "SPOTS AVAILABLE",
            "BY SERVICE"
        ]
    );
    assert_eq!(labels[1].color, v.rate_color);
    assert!(labels.iter().all(|l| l.pos.x == 135.0));
}
