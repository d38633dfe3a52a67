use super::*;

#[test]
fn top_left_only_applies_offset() {
    let p = map_point(100.0, 400.0, 960.0, 30.0, Origin::TopLeft);
    assert_eq!(p, Point::new(100.0, 370.0));
}

#[test]
fn bottom_left_flips_after_offset() {
    let p = map_point(100.0, 400.0, 960.0, 30.0, Origin::BottomLeft);
    assert_eq!(p, Point::new(100.0, 590.0));
}

#[test]
fn zero_offset_flip_is_mirror() {
    let p = map_point(5.0, 0.0, 200.0, 0.0, Origin::BottomLeft);
    assert_eq!(p.y, 200.0);
    let p = map_point(5.0, 200.0, 200.0, 0.0, Origin::BottomLeft);
    assert_eq!(p.y, 0.0);
}

#[test]
fn below_moves_down_the_map_in_both_origins() {
    let tl = CoordMapper::new(960.0, 30.0, Origin::TopLeft);
    let bl = CoordMapper::new(960.0, 30.0, Origin::BottomLeft);

    let a = tl.map(50.0, 300.0);
    let b = tl.map_below(50.0, 300.0, 20.0);
    assert!(b.y > a.y);

    let a = bl.map(50.0, 300.0);
    let b = bl.map_below(50.0, 300.0, 20.0);
    assert!(b.y < a.y);
    assert_eq!(a.y - b.y, 20.0);
}
