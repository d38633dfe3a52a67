//! Coordinate sanity report for calibrating the vertical offset against a background map.

use std::{collections::BTreeMap, fmt};

use crate::{
    data::table::ObservationTable,
    foundation::error::{VizError, VizResult},
};

const MIN_SIDE_SEPARATION_PX: f64 = 50.0;
const MIN_SPREAD_PX: f64 = 100.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    fn of(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Span { min: v, max: v }),
            Some(s) => Some(Span {
                min: s.min.min(v),
                max: s.max.max(v),
            }),
        })
    }

    pub fn spread(self) -> f64 {
        self.max - self.min
    }

    pub fn center(self) -> f64 {
        (self.min + self.max) / 2.0
    }

    fn shifted(self, dy: f64) -> Self {
        Span {
            min: self.min - dy,
            max: self.max - dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// First-seen position of one slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotPosition {
    pub slot_id: u32,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub adjusted_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SideSeparation {
    pub left_x: Span,
    pub right_x: Span,
    /// `right.min - left.max`; negative when the sides overlap.
    pub gap: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageFit {
    pub width: u32,
    pub height: u32,
    pub data_center_y: f64,
    pub adjusted_center_y: f64,
    pub image_center_y: f64,
    /// Offset that would center the data vertically on the map.
    pub suggested_offset: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CoordWarning {
    SidesTooClose(f64),
    SidesOverlap,
    XOutOfBounds,
    YOutOfBounds,
    NarrowXSpread(f64),
    NarrowYSpread(f64),
}

impl fmt::Display for CoordWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SidesTooClose(gap) => {
                write!(f, "left and right sides are only {gap:.1} px apart")
            }
            Self::SidesOverlap => f.write_str("left and right x ranges overlap"),
            Self::XOutOfBounds => f.write_str("x coordinates fall outside the map"),
            Self::YOutOfBounds => f.write_str("adjusted y coordinates fall outside the map"),
            Self::NarrowXSpread(s) => write!(f, "x coordinates span only {s:.1} px"),
            Self::NarrowYSpread(s) => write!(f, "y coordinates span only {s:.1} px"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateReport {
    pub rows: usize,
    pub vertical_offset: f64,
    pub slots: Vec<SlotPosition>,
    pub x: Span,
    pub y: Span,
    pub y_adjusted: Span,
    pub separation: Option<SideSeparation>,
    pub image: Option<ImageFit>,
    pub warnings: Vec<CoordWarning>,
}

impl CoordinateReport {
    /// Slots numbered `<= capacity / 2` are expected on the left side of the map.
    pub fn build(
        table: &ObservationTable,
        image_size: Option<(u32, u32)>,
        vertical_offset: f64,
        capacity: u32,
    ) -> VizResult<Self> {
        let rows = table.rows();
        let (Some(x), Some(y)) = (
            Span::of(rows.iter().map(|r| r.x)),
            Span::of(rows.iter().map(|r| r.y)),
        ) else {
            return Err(VizError::load("no timestamps found in data"));
        };
        let y_adjusted = y.shifted(vertical_offset);
        let half = capacity / 2;
        let side_of = |slot: u32| if slot <= half { Side::Left } else { Side::Right };

        let mut first_seen = BTreeMap::new();
        for r in rows {
            first_seen.entry(r.slot_id).or_insert((r.x, r.y));
        }
        let slots: Vec<SlotPosition> = first_seen
            .into_iter()
            .map(|(slot_id, (x, y))| SlotPosition {
                slot_id,
                side: side_of(slot_id),
                x,
                y,
                adjusted_y: y - vertical_offset,
            })
            .collect();

        let mut warnings = Vec::new();

        let left_x = Span::of(
            rows.iter()
                .filter(|r| side_of(r.slot_id) == Side::Left)
                .map(|r| r.x),
        );
        let right_x = Span::of(
            rows.iter()
                .filter(|r| side_of(r.slot_id) == Side::Right)
                .map(|r| r.x),
        );
        let separation = match (left_x, right_x) {
            (Some(left_x), Some(right_x)) => {
                let gap = right_x.min - left_x.max;
                if gap.abs() < MIN_SIDE_SEPARATION_PX {
                    warnings.push(CoordWarning::SidesTooClose(gap));
                }
                if left_x.max > right_x.min {
                    warnings.push(CoordWarning::SidesOverlap);
                }
                Some(SideSeparation {
                    left_x,
                    right_x,
                    gap,
                })
            }
            _ => None,
        };

        let image = image_size.map(|(width, height)| {
            let h = f64::from(height);
            if x.min < 0.0 || x.max > f64::from(width) {
                warnings.push(CoordWarning::XOutOfBounds);
            }
            if y_adjusted.min < 0.0 || y_adjusted.max > h {
                warnings.push(CoordWarning::YOutOfBounds);
            }
            ImageFit {
                width,
                height,
                data_center_y: y.center(),
                adjusted_center_y: y_adjusted.center(),
                image_center_y: h / 2.0,
                suggested_offset: y.center() - h / 2.0,
            }
        });

        if y.spread() < MIN_SPREAD_PX {
            warnings.push(CoordWarning::NarrowYSpread(y.spread()));
        }
        if x.spread() < MIN_SPREAD_PX {
            warnings.push(CoordWarning::NarrowXSpread(x.spread()));
        }

        Ok(Self {
            rows: rows.len(),
            vertical_offset,
            slots,
            x,
            y,
            y_adjusted,
            separation,
            image,
            warnings,
        })
    }
}

impl fmt::Display for CoordinateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows: {}", self.rows)?;
        writeln!(f, "x range: {:.1} to {:.1}", self.x.min, self.x.max)?;
        writeln!(
            f,
            "y range: {:.1} to {:.1} (after offset {}: {:.1} to {:.1})",
            self.y.min, self.y.max, self.vertical_offset, self.y_adjusted.min, self.y_adjusted.max
        )?;
        writeln!(f, "slots:")?;
        for s in &self.slots {
            let side = match s.side {
                Side::Left => "left",
                Side::Right => "right",
            };
            writeln!(
                f,
                "  slot {:>3} ({side:<5}) x={:7.1} y={:7.1} adjusted y={:7.1}",
                s.slot_id, s.x, s.y, s.adjusted_y
            )?;
        }
        if let Some(sep) = &self.separation {
            writeln!(
                f,
                "left x: {:.1} to {:.1}, right x: {:.1} to {:.1}, gap {:.1} px",
                sep.left_x.min, sep.left_x.max, sep.right_x.min, sep.right_x.max, sep.gap
            )?;
        }
        if let Some(img) = &self.image {
            writeln!(f, "map: {}x{}", img.width, img.height)?;
            writeln!(
                f,
                "data center y {:.1} (adjusted {:.1}), map center y {:.1}",
                img.data_center_y, img.adjusted_center_y, img.image_center_y
            )?;
            writeln!(f, "suggested vertical offset: {:.1}", img.suggested_offset)?;
        }
        for w in &self.warnings {
            writeln!(f, "warning: {w}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/diagnostics.rs"]
mod tests;
