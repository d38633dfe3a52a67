use super::*;
use crate::{
    data::{observation::Service, table::ObservationTable},
    test_support::{occupied, temp_dir, ts, vacant, write_solid_png},
};

fn fixture(name: &str) -> (std::path::PathBuf, ObservationTable) {
    let root = temp_dir(name);
    write_solid_png(&root.join("map.png"), 400, 300, [200, 200, 200, 255]);
    write_solid_png(&root.join("plates/ABC123.png"), 160, 80, [255, 255, 255, 255]);
    let table = ObservationTable::from_rows(vec![
        occupied(ts(9, 0), 1, Some(Service::Uber), Some("ABC123")),
        occupied(ts(9, 0), 2, Some(Service::Waymo), None),
        vacant(ts(9, 0), 3),
    ]);
    (root, table)
}

#[test]
fn plot_points_convert_back_to_screen_space() {
    let plot = PlotFrame {
        width: 400.0,
        height: 300.0,
    };
    assert_eq!(plot.to_svg_point(Point::new(10.0, 30.0)), Point::new(10.0, 270.0));
    assert_eq!(
        plot.to_svg_rect(Rect::new(70.0, 10.0, 150.0, 50.0)),
        Rect::new(70.0, 250.0, 150.0, 290.0)
    );
}

#[test]
fn plot_layer_uses_bottom_left_origin() {
    let (root, table) = fixture("map_svg_layer");
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let (plot, layer) = plot_layer(&table.frame(ts(9, 0)), &assets, &config);

    let plate = layer.spots.iter().find(|s| s.slot_id == 1).unwrap();
    let SpotMark::Plate { rect, .. } = &plate.mark else {
        panic!("expected plate");
    };
    // source y 300 with offset 30 sits 30 px above the bottom edge
    assert_eq!(rect.center(), Point::new(110.0, 30.0));
    // and lands at the same screen position as the raster output
    assert_eq!(plot.to_svg_rect(*rect).center(), Point::new(110.0, 270.0));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn svg_contains_images_markers_titles_and_legend() {
    let (root, table) = fixture("map_svg_full");
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let (plot, layer) = plot_layer(&table.frame(ts(9, 0)), &assets, &config);

    let svg = map_svg(plot, &layer, &config, |key| match key {
        ImageKey::Background => Some("assets/map.png".to_owned()),
        ImageKey::Plate(p) => Some(format!("assets/plates/{p}.png")),
        _ => None,
    });

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"viewBox="0 0 400 300""#));
    assert!(svg.contains(r#"href="assets/map.png""#));
    assert!(svg.contains(r#"opacity="0.85""#));
    assert!(svg.contains(r#"<image href="assets/plates/ABC123.png" x="70.00" y="250.00" width="80.00" height="40.00""#));
    assert!(svg.contains("<title>Slot 1: Uber (ABC123)</title>"));
    assert!(svg.contains("<title>Slot 2: Waymo</title>"));
    assert!(svg.contains("<title>Slot 3: vacant</title>"));
    assert!(svg.contains(">Service Legend</text>"));
    assert!(svg.contains(">Waymo</text>"));
    assert!(!svg.contains(">Lyft</text>"));
    assert!(svg.ends_with("</svg>"));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn unresolved_images_are_skipped() {
    let (root, table) = fixture("map_svg_nolinks");
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let (plot, layer) = plot_layer(&table.frame(ts(9, 0)), &assets, &config);
    let svg = map_svg(plot, &layer, &config, |_| None);
    assert!(!svg.contains("<image"));
    assert!(svg.contains("<circle"));
    std::fs::remove_dir_all(&root).ok();
}
