use super::*;
use crate::{
    data::{loader::read_table, observation::Service, reclassify::SplitPolicy},
    test_support::{occupied, ts, vacant},
};

#[test]
fn round_trip_preserves_the_table() {
    let mut table = ObservationTable::from_rows(vec![
        occupied(ts(9, 0), 1, Some(Service::Uber), Some("ABC123")),
        vacant(ts(9, 0), 2),
        occupied(ts(9, 5), 1, None, None),
        occupied(ts(9, 5), 2, Some(Service::Taxi), Some("TX 9")),
    ]);
    table.normalize_services(SplitPolicy::default());

    let mut buf = Vec::new();
    write_table_to(&table, &mut buf).unwrap();
    let back = read_table(buf.as_slice()).unwrap();
    assert_eq!(back, table);
}

#[test]
fn header_and_empty_cells() {
    let table = ObservationTable::from_rows(vec![vacant(ts(9, 0), 7)]);
    let mut buf = Vec::new();
    write_table_to(&table, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("current_time,slot_id,x,y,reservation_id,service,plate_number")
    );
    assert_eq!(lines.next(), Some("2025-03-14 09:00:00,7,170,300,,,"));
}

#[test]
fn fractional_seconds_only_when_present() {
    assert_eq!(format_timestamp(ts(9, 0)), "2025-03-14 09:00:00");
    let t = ts(9, 0) + chrono::Duration::milliseconds(500);
    assert_eq!(format_timestamp(t), "2025-03-14 09:00:00.500");
}

#[test]
fn write_table_creates_parent_dirs() {
    let dir = crate::test_support::temp_dir("writer_parent");
    let path = dir.join("nested").join("out.csv");
    let table = ObservationTable::from_rows(vec![vacant(ts(9, 0), 1)]);
    write_table(&table, &path).unwrap();
    assert!(path.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn lossy_load_is_not_written_back() {
    let dir = crate::test_support::temp_dir("writer_lossy");
    let path = dir.join("data.csv");
    let original = "current_time,slot_id,x,y,reservation_id,service,plate_number\n\
                    2025-03-14 09:00:00,1,1,1,R1,Bolt,B1\n\
                    2025-03-14 09:00:00,2,1,1,R2,Uber,U2\n\
                    2025-03-14 09:00:00,2,5,5,R3,Lyft,L3\n";
    std::fs::write(&path, original).unwrap();

    let table = crate::data::loader::load_table(&path).unwrap();
    let err = write_table(&table, &path).unwrap_err();
    assert!(matches!(err, VizError::Validation(_)));
    let msg = err.to_string();
    assert!(msg.contains("1 unknown service label"), "{msg}");
    assert!(msg.contains("1 duplicate row"), "{msg}");
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn normalizing_keeps_a_clean_load_writable() {
    let dir = crate::test_support::temp_dir("writer_clean");
    let path = dir.join("data.csv");
    std::fs::write(
        &path,
        "current_time,slot_id,x,y,reservation_id,service,plate_number\n\
         2025-03-14 09:00:00,1,1,1,R1,Other,\n",
    )
    .unwrap();
    let table = crate::data::loader::load_normalized(&path, &crate::VizConfig::default()).unwrap();
    write_table(&table, &path).unwrap();
    let back = crate::data::loader::load_table(&path).unwrap();
    assert_eq!(back.rows()[0].service, Some(Service::Taxi));
    std::fs::remove_dir_all(&dir).ok();
}
