use image::AnimationDecoder as _;

use super::*;
use crate::{
    data::observation::Service,
    test_support::{occupied, temp_dir, ts, vacant, write_solid_png},
};

fn fixture(name: &str) -> (std::path::PathBuf, ObservationTable) {
    let root = temp_dir(name);
    write_solid_png(&root.join("map.png"), 60, 40, [90, 90, 90, 255]);
    let table = ObservationTable::from_rows(vec![
        vacant(ts(9, 0), 1),
        occupied(ts(9, 5), 1, Some(Service::Uber), Some("NOPLATE")),
        vacant(ts(9, 10), 1),
    ]);
    (root, table)
}

#[test]
fn renderer_rejects_empty_table() {
    let (root, _) = fixture("batch_empty");
    let table = ObservationTable::default();
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let err = FrameRenderer::new(&table, &assets, &config).err().unwrap();
    assert!(err.to_string().contains("no timestamps found in data"));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn positions_follow_sorted_timestamps() {
    let (root, table) = fixture("batch_positions");
    let config = VizConfig::default();
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let mut renderer = FrameRenderer::new(&table, &assets, &config).unwrap();

    assert_eq!(renderer.len(), 3);
    assert_eq!(renderer.stats(1).unwrap().occupied_count, 1);
    assert!(renderer.stats(3).is_err());

    let frame = renderer.render_position(1).unwrap();
    assert_eq!((frame.width, frame.height), (60, 120));
    assert!(renderer.render_position(5).is_err());
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn preview_and_animation_are_written() {
    let (root, table) = fixture("batch_outputs");
    let config = VizConfig {
        frame_duration_ms: 500,
        ..VizConfig::default()
    };
    let assets = AssetStore::prepare(&root, &table, &config).unwrap();
    let mut renderer = FrameRenderer::new(&table, &assets, &config).unwrap();

    let preview = root.join("out/preview.png");
    render_preview(&mut renderer, &preview).unwrap();
    assert_eq!(image::open(&preview).unwrap().width(), 60);

    let gif = root.join("out/animation.gif");
    assert_eq!(render_animation(&mut renderer, &gif).unwrap(), 3);
    let file = std::io::BufReader::new(std::fs::File::open(&gif).unwrap());
    let frames = image::codecs::gif::GifDecoder::new(file)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(frames.len(), 3);
    std::fs::remove_dir_all(&root).ok();
}
