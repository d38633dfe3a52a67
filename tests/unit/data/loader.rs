use super::*;

const HEADER: &str = "current_time,slot_id,x,y,reservation_id,service,plate_number\n";

fn parse(body: &str) -> VizResult<ObservationTable> {
    read_table(format!("{HEADER}{body}").as_bytes())
}

#[test]
fn parses_rows_and_derives_status() {
    let t = parse(
        "2025-03-14 09:00:00,1,120.5,300,,,\n\
         2025-03-14 09:00:00,2,140,300,R100,uber,ABC123\n",
    )
    .unwrap();
    assert_eq!(t.len(), 2);
    let rows = t.rows();
    assert!(!rows[0].is_occupied());
    assert_eq!(rows[0].x, 120.5);
    assert!(rows[1].is_occupied());
    assert_eq!(rows[1].service, Some(Service::Uber));
    assert_eq!(rows[1].plate_number.as_deref(), Some("ABC123"));
}

#[test]
fn column_order_is_free_and_extras_ignored() {
    let csv = "plate_number,service,notes,reservation_id,y,x,slot_id,current_time\n\
               XYZ,Lyft,hello,R1,10,20,3,2025-03-14T09:00:00\n";
    let t = read_table(csv.as_bytes()).unwrap();
    let r = &t.rows()[0];
    assert_eq!(r.slot_id, 3);
    assert_eq!((r.x, r.y), (20.0, 10.0));
    assert_eq!(r.service, Some(Service::Lyft));
}

#[test]
fn missing_column_is_named() {
    let csv = "current_time,slot_id,x,y,reservation_id,service\n";
    let err = read_table(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, VizError::Load(_)));
    assert!(err.to_string().contains("plate_number"));
}

#[test]
fn bad_timestamp_names_the_row() {
    let err = parse(
        "2025-03-14 09:00:00,1,1,1,,,\n\
         yesterday,2,1,1,,,\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("row 2"));
    assert!(err.to_string().contains("yesterday"));
}

#[test]
fn bad_coordinate_is_fatal() {
    let err = parse("2025-03-14 09:00:00,1,left,1,,,\n").unwrap_err();
    assert!(err.to_string().contains("invalid x"));
}

#[test]
fn float_slot_ids_are_accepted() {
    let t = parse("2025-03-14 09:00:00,5.0,1,1,,,\n").unwrap();
    assert_eq!(t.rows()[0].slot_id, 5);
    assert!(parse("2025-03-14 09:00:00,5.5,1,1,,,\n").is_err());
}

#[test]
fn unknown_service_becomes_none() {
    let t = parse("2025-03-14 09:00:00,1,1,1,R9,Bicycle,\n").unwrap();
    assert_eq!(t.rows()[0].service, None);
    assert!(t.rows()[0].is_occupied());
    assert_eq!(t.issues().unknown_labels, 1);
}

#[test]
fn other_label_is_unclassified_before_normalizing() {
    let t = parse("2025-03-14 09:00:00,1,1,1,R9,Other,\n").unwrap();
    assert_eq!(t.rows()[0].service, Some(Service::Unclassified));
}

#[test]
fn duplicate_pairs_keep_the_first_row() {
    let t = parse(
        "2025-03-14 09:00:00,1,1,1,R1,Uber,\n\
         2025-03-14 09:00:00,1,9,9,R2,Lyft,\n\
         2025-03-14 09:05:00,1,1,1,,,\n",
    )
    .unwrap();
    assert_eq!(t.len(), 2);
    assert_eq!(t.rows()[0].reservation_id.as_deref(), Some("R1"));
    assert_eq!(
        t.issues(),
        LoadIssues {
            unknown_labels: 0,
            duplicate_rows: 1
        }
    );
}

#[test]
fn clean_input_reports_no_issues() {
    let t = parse("2025-03-14 09:00:00,1,1,1,R1,Other,
2025-03-14 09:00:00,2,1,1,,,
").unwrap();
    assert!(t.issues().is_clean());
}

#[test]
fn timestamp_formats() {
    let expect = parse_timestamp("2025-03-14 09:30:00").unwrap();
    for s in [
        "2025-03-14T09:30:00",
        "2025-03-14 09:30",
        "2025-03-14T09:30",
        "03/14/2025 09:30:00",
        "03/14/2025 09:30",
        " 2025-03-14 09:30:00 ",
    ] {
        assert_eq!(parse_timestamp(s), Some(expect), "{s}");
    }
    let frac = parse_timestamp("2025-03-14 09:30:00.250").unwrap();
    assert_eq!(frac - expect, chrono::Duration::milliseconds(250));
    assert_eq!(parse_timestamp("14.03.2025"), None);
}

#[test]
fn missing_file_is_a_load_error() {
    let err = load_table(Path::new("definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, VizError::Load(_)));
}

#[test]
fn load_normalized_splits_and_checks_capacity() {
    let dir = crate::test_support::temp_dir("loader_normalized");
    let path = dir.join("data.csv");
    std::fs::write(
        &path,
        format!(
            "{HEADER}2025-03-14 09:00:00,1,1,1,R1,Other,\n\
             2025-03-14 09:00:00,2,1,1,R2,Other,\n\
             2025-03-14 09:00:00,3,1,1,,,\n"
        ),
    )
    .unwrap();

    let cfg = VizConfig::default();
    let t = load_normalized(&path, &cfg).unwrap();
    let services: Vec<_> = t.rows().iter().map(|r| r.service).collect();
    assert_eq!(
        services,
        vec![Some(Service::Waymo), Some(Service::Taxi), None]
    );

    let tight = VizConfig {
        capacity: 2,
        ..VizConfig::default()
    };
    assert!(matches!(
        load_normalized(&path, &tight),
        Err(VizError::Validation(_))
    ));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn header_only_file_has_no_timestamps() {
    let dir = crate::test_support::temp_dir("loader_empty");
    let path = dir.join("data.csv");
    std::fs::write(&path, HEADER).unwrap();
    let err = load_normalized(&path, &VizConfig::default()).unwrap_err();
    assert!(err.to_string().contains("no timestamps found in data"));
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn format_follows_the_extension() {
    assert_eq!(DataFormat::of(Path::new("a/data.csv")), DataFormat::Csv);
    assert_eq!(DataFormat::of(Path::new("data.XLSX")), DataFormat::Workbook);
    assert_eq!(DataFormat::of(Path::new("data.ods")), DataFormat::Workbook);
    assert_eq!(DataFormat::of(Path::new("data")), DataFormat::Csv);
}

#[test]
fn excel_serials_convert_from_the_1900_system() {
    assert_eq!(excel_serial_to_datetime(45730.375), Some(crate::test_support::ts(9, 0)));
    assert_eq!(
        excel_serial_to_datetime(45730.378_472_222_22),
        Some(crate::test_support::ts(9, 5))
    );
    assert_eq!(excel_serial_to_datetime(-1.0), None);
    assert_eq!(excel_serial_to_datetime(f64::NAN), None);
}

#[test]
fn workbook_input_reads_the_first_sheet() {
    use rust_xlsxwriter::{Format, Workbook};

    let dir = crate::test_support::temp_dir("loader_xlsx");
    let path = dir.join("data.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");

    // Date-formatted serial, occupied.
    sheet.write_number_with_format(1, 0, 45730.375, &date).unwrap();
    sheet.write_number(1, 1, 1).unwrap();
    sheet.write_number(1, 2, 120.5).unwrap();
    sheet.write_number(1, 3, 300).unwrap();
    sheet.write_string(1, 4, "R1").unwrap();
    sheet.write_string(1, 5, "Uber").unwrap();
    sheet.write_string(1, 6, "ABC123").unwrap();
    // Timestamp typed as text, vacant.
    sheet.write_string(2, 0, "2025-03-14 09:00:00").unwrap();
    sheet.write_number(2, 1, 2).unwrap();
    sheet.write_number(2, 2, 140).unwrap();
    sheet.write_number(2, 3, 300).unwrap();
    // Unformatted serial in the time column.
    sheet.write_number(3, 0, 45730.378_472_222_22).unwrap();
    sheet.write_number(3, 1, 1).unwrap();
    sheet.write_number(3, 2, 120.5).unwrap();
    sheet.write_number(3, 3, 300).unwrap();
    workbook.save(&path).unwrap();

    let t = load_table(&path).unwrap();
    assert_eq!(t.len(), 3);
    assert_eq!(
        t.timestamps(),
        vec![crate::test_support::ts(9, 0), crate::test_support::ts(9, 5)]
    );
    let rows = t.rows();
    assert_eq!((rows[0].slot_id, rows[0].x, rows[0].y), (1, 120.5, 300.0));
    assert_eq!(rows[0].service, Some(Service::Uber));
    assert_eq!(rows[0].plate_number.as_deref(), Some("ABC123"));
    assert!(!rows[1].is_occupied());
    assert_eq!(rows[1].slot_id, 2);
    assert!(!rows[2].is_occupied());
    assert!(t.issues().is_clean());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unreadable_workbook_is_a_load_error() {
    let dir = crate::test_support::temp_dir("loader_bad_xlsx");
    let path = dir.join("data.xlsx");
    std::fs::write(&path, "current_time,slot_id\n").unwrap();
    assert!(matches!(load_table(&path), Err(VizError::Load(_))));
    std::fs::remove_dir_all(&dir).ok();
}
