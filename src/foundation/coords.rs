//! Source-data to render-target coordinate mapping.
//!
//! Spot coordinates in the spreadsheet are pixel positions on the background map with the origin
//! at the top-left corner. Raster output keeps that convention; plot-style widgets put the origin
//! at the bottom-left and need a vertical flip. Both apply the same vertical offset correction.

use crate::foundation::core::Point;

/// Where `(0, 0)` sits in the render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Origin {
    TopLeft,
    BottomLeft,
}

/// Map a source point into target space.
///
/// - `TopLeft`: `(x, y - vertical_offset)`
/// - `BottomLeft`: `(x, image_height - (y - vertical_offset))`
pub fn map_point(x: f64, y: f64, image_height: f64, vertical_offset: f64, origin: Origin) -> Point {
    let shifted = y - vertical_offset;
    match origin {
        Origin::TopLeft => Point::new(x, shifted),
        Origin::BottomLeft => Point::new(x, image_height - shifted),
    }
}

/// [`map_point`] with its parameters bound for one render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordMapper {
    pub image_height: f64,
    pub vertical_offset: f64,
    pub origin: Origin,
}

impl CoordMapper {
    pub fn new(image_height: f64, vertical_offset: f64, origin: Origin) -> Self {
        Self {
            image_height,
            vertical_offset,
            origin,
        }
    }

    pub fn map(&self, x: f64, y: f64) -> Point {
        map_point(x, y, self.image_height, self.vertical_offset, self.origin)
    }

    /// Map a point `dy` source pixels below `(x, y)` (positive `dy` is further down the map).
    pub fn map_below(&self, x: f64, y: f64, dy: f64) -> Point {
        self.map(x, y + dy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/coords.rs"]
mod tests;
