//! Frame composition and rasterization.
//!
//! [`scene`] turns a frame plus its statistics into a backend-agnostic [`Scene`](scene::Scene);
//! [`cpu`] rasterizes that scene into a [`FrameRGBA`].

pub mod composite;
pub mod cpu;
pub mod panel;
pub mod scene;
pub mod svg_text;

/// Rendered frame pixels, row-major RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}
