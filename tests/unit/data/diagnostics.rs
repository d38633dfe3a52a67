use super::*;
use crate::{
    data::observation::SpotObservation,
    test_support::{ts, vacant},
};

fn at(slot_id: u32, x: f64, y: f64) -> SpotObservation {
    SpotObservation {
        x,
        y,
        ..vacant(ts(9, 0), slot_id)
    }
}

#[test]
fn well_separated_sides_produce_no_warnings() {
    let table = ObservationTable::from_rows(vec![
        at(1, 100.0, 200.0),
        at(2, 120.0, 500.0),
        at(3, 500.0, 200.0),
        at(4, 520.0, 500.0),
    ]);
    let r = CoordinateReport::build(&table, Some((800, 800)), 30.0, 4).unwrap();
    assert!(r.warnings.is_empty(), "{:?}", r.warnings);

    let sep = r.separation.unwrap();
    assert_eq!(sep.gap, 380.0);
    assert_eq!(r.y_adjusted.min, 170.0);

    let img = r.image.unwrap();
    assert_eq!(img.data_center_y, 350.0);
    assert_eq!(img.suggested_offset, -50.0);
    assert_eq!(r.slots.len(), 4);
    assert_eq!(r.slots[2].side, Side::Right);
}

#[test]
fn overlap_and_bounds_are_flagged() {
    let table = ObservationTable::from_rows(vec![
        at(1, 300.0, 10.0),
        at(2, 310.0, 20.0),
        at(3, 290.0, 15.0),
        at(4, 900.0, 15.0),
    ]);
    let r = CoordinateReport::build(&table, Some((800, 600)), 30.0, 4).unwrap();
    assert!(r.warnings.contains(&CoordWarning::SidesOverlap));
    assert!(r.warnings.contains(&CoordWarning::XOutOfBounds));
    assert!(r.warnings.contains(&CoordWarning::YOutOfBounds));
    assert!(
        r.warnings
            .iter()
            .any(|w| matches!(w, CoordWarning::NarrowYSpread(_)))
    );
}

#[test]
fn report_renders_as_text() {
    let table = ObservationTable::from_rows(vec![at(1, 100.0, 200.0), at(13, 600.0, 500.0)]);
    let r = CoordinateReport::build(&table, None, 0.0, 24).unwrap();
    let text = r.to_string();
    assert!(text.contains("slot   1 (left"));
    assert!(text.contains("slot  13 (right"));
    assert!(!text.contains("suggested"));
}

#[test]
fn empty_table_is_rejected() {
    let table = ObservationTable::default();
    assert!(CoordinateReport::build(&table, None, 0.0, 24).is_err());
}
