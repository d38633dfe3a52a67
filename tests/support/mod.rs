//! On-disk fixture: a 3 x 24 observation grid plus synthetic map, logo and plate images.

#![allow(dead_code)]

use std::{
    fmt::Write as _,
    path::{Path, PathBuf},
};

pub const TIMESTAMPS: [&str; 3] = [
    "2025-03-14 09:00:00",
    "2025-03-14 09:05:00",
    "2025-03-14 09:10:00",
];

pub struct Fixture {
    pub root: PathBuf,
    pub data: PathBuf,
}

impl Fixture {
    /// Slot 5 is reserved (`R100`, Uber, plate `ABC123`) at the first timestamp. The second
    /// timestamp has two "Other" rows and a Lyft row without a plate image.
    pub fn new(name: &str) -> Self {
        let root = PathBuf::from("target").join("it").join(format!(
            "{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&root).unwrap();

        write_png(&root.join("map.png"), 400, 300, [200, 210, 220, 255]);
        write_png(&root.join("logos/uber.png"), 48, 48, [0, 0, 0, 255]);
        write_png(&root.join("logos/lyft.png"), 48, 48, [255, 0, 191, 255]);
        write_png(&root.join("plates/ABC123.png"), 160, 80, [250, 250, 250, 255]);

        let data = root.join("observations.csv");
        std::fs::write(&data, grid_csv()).unwrap();
        Self { root, data }
    }

    pub fn data_arg(&self) -> String {
        self.data.to_string_lossy().into_owned()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub fn grid_csv() -> String {
    let mut s = String::from("current_time,slot_id,x,y,reservation_id,service,plate_number\n");
    for (t, ts) in TIMESTAMPS.iter().enumerate() {
        for slot in 1..=24u32 {
            let (x, y) = slot_xy(slot);
            let (res, service, plate) = match (t, slot) {
                (0, 5) => ("R100", "Uber", "ABC123"),
                (1, 3) => ("R200", "Other", ""),
                (1, 7) => ("R201", "Other", ""),
                (1, 10) => ("R202", "Lyft", "NOIMAGE"),
                _ => ("", "", ""),
            };
            let _ = writeln!(s, "{ts},{slot},{x},{y},{res},{service},{plate}");
        }
    }
    s
}

/// Two columns of twelve spots.
pub fn slot_xy(slot: u32) -> (u32, u32) {
    let (col_x, row) = if slot <= 12 { (100, slot) } else { (300, slot - 12) };
    (col_x, 60 + row * 20)
}

pub fn write_png(path: &Path, width: u32, height: u32, rgba: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbaImage::from_pixel(width, height, image::Rgba(rgba))
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Route library logs through the test harness; repeated calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
