use std::{collections::HashSet, io::Read, path::Path};

use anyhow::Context;
use calamine::{Data, Reader as _};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::{
    config::VizConfig,
    data::{
        observation::{Service, SpotObservation},
        table::{LoadIssues, ObservationTable},
        writer::format_timestamp,
    },
    foundation::error::{VizError, VizResult},
};

/// Column names every data file must carry. Order in the file is free.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "current_time",
    "slot_id",
    "x",
    "y",
    "reservation_id",
    "service",
    "plate_number",
];

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Parse a timestamp cell in any of the accepted spreadsheet formats.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Spreadsheet flavor, chosen by file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataFormat {
    Csv,
    /// Any workbook `calamine` opens: xlsx, xlsm, xlsb, xls, ods. Only the first sheet is read.
    Workbook,
}

impl DataFormat {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::Workbook,
            _ => Self::Csv,
        }
    }
}

#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_table(path: &Path) -> VizResult<ObservationTable> {
    if !path.is_file() {
        return Err(VizError::load(format!(
            "data file not found: {}",
            path.display()
        )));
    }
    match DataFormat::of(path) {
        DataFormat::Csv => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("open data file '{}'", path.display()))?;
            read_table(file)
        }
        DataFormat::Workbook => read_workbook(path),
    }
}

/// Parse a table from any CSV source.
pub fn read_table<R: Read>(reader: R) -> VizResult<ObservationTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().context("read CSV header")?.clone();
    let idx = ColumnIndex::resolve(&headers.iter().collect::<Vec<_>>())?;

    let mut rows = RowCollector::default();
    for (i, record) in rdr.records().enumerate() {
        let line = i + 1;
        let record = record.with_context(|| format!("read CSV row {line}"))?;
        let cells: Vec<&str> = record.iter().collect();
        let obs = idx.parse_row(&cells, line, &mut rows.issues)?;
        rows.push(obs, line);
    }
    Ok(rows.finish())
}

/// Parse the first sheet of a workbook. Date cells in `current_time` may be Excel serials.
pub fn read_workbook(path: &Path) -> VizResult<ObservationTable> {
    let mut workbook = calamine::open_workbook_auto(path).map_err(|e| {
        VizError::load(format!("open workbook '{}': {e}", path.display()))
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| VizError::load(format!("workbook '{}' has no sheets", path.display())))?
        .map_err(|e| VizError::load(format!("read first sheet of '{}': {e}", path.display())))?;

    let mut sheet = range.rows();
    let header: Vec<String> = sheet
        .next()
        .map(|cells| cells.iter().map(|c| cell_text(c, false)).collect())
        .unwrap_or_default();
    let idx = ColumnIndex::resolve(&header.iter().map(String::as_str).collect::<Vec<_>>())?;

    let mut rows = RowCollector::default();
    for (i, cells) in sheet.enumerate() {
        let line = i + 1;
        if cells.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let text: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(col, c)| cell_text(c, col == idx.current_time))
            .collect();
        let cells: Vec<&str> = text.iter().map(String::as_str).collect();
        let obs = idx.parse_row(&cells, line, &mut rows.issues)?;
        rows.push(obs, line);
    }
    Ok(rows.finish())
}

fn cell_text(cell: &Data, time_column: bool) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::DateTime(dt) => serial_text(dt.as_f64()),
        Data::Float(v) if time_column => serial_text(*v),
        Data::Int(v) if time_column => serial_text(*v as f64),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(e) => e.to_string(),
    }
}

fn serial_text(serial: f64) -> String {
    excel_serial_to_datetime(serial).map_or_else(|| serial.to_string(), format_timestamp)
}

/// Excel serial day number (1900 date system) to a naive timestamp, rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let ms = (serial * 86_400_000.0).round();
    if ms > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(TimeDelta::try_milliseconds(ms as i64)?)
}

/// Accumulates parsed rows, dropping repeated `(timestamp, slot_id)` pairs.
#[derive(Default)]
struct RowCollector {
    rows: Vec<SpotObservation>,
    seen: HashSet<(NaiveDateTime, u32)>,
    issues: LoadIssues,
}

impl RowCollector {
    fn push(&mut self, obs: SpotObservation, line: usize) {
        if !self.seen.insert((obs.timestamp, obs.slot_id)) {
            tracing::warn!(
                row = line,
                slot_id = obs.slot_id,
                timestamp = %obs.timestamp,
                "duplicate (timestamp, slot_id) row dropped"
            );
            self.issues.duplicate_rows += 1;
            return;
        }
        self.rows.push(obs);
    }

    fn finish(self) -> ObservationTable {
        ObservationTable::from_rows(self.rows).with_issues(self.issues)
    }
}

/// Load, normalize and validate a data file in one go.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_normalized(path: &Path, config: &VizConfig) -> VizResult<ObservationTable> {
    let mut table = load_table(path)?;
    let split = table.normalize_services(config.split);
    if split.unclassified > 0 {
        tracing::info!(
            unclassified = split.unclassified,
            first = %config.split.first,
            to_first = split.to_first,
            second = %config.split.second,
            to_second = split.to_second,
            "reclassified unclassified service rows"
        );
    }
    table.validate_capacity(config.capacity)?;
    if table.is_empty() {
        return Err(VizError::load("no timestamps found in data"));
    }

    let s = table.summary();
    tracing::info!(
        rows = s.rows,
        timestamps = s.timestamps,
        first = ?s.first,
        last = ?s.last,
        occupied = s.occupied,
        vacant = s.vacant,
        "loaded observations"
    );
    for (service, n) in &s.occupied_by_service {
        tracing::info!(%service, occupied = n, "service distribution");
    }
    Ok(table)
}

struct ColumnIndex {
    current_time: usize,
    slot_id: usize,
    x: usize,
    y: usize,
    reservation_id: usize,
    service: usize,
    plate_number: usize,
}

impl ColumnIndex {
    fn resolve(headers: &[&str]) -> VizResult<Self> {
        let find = |name: &str| -> VizResult<usize> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| VizError::load(format!("missing required column '{name}'")))
        };
        Ok(Self {
            current_time: find("current_time")?,
            slot_id: find("slot_id")?,
            x: find("x")?,
            y: find("y")?,
            reservation_id: find("reservation_id")?,
            service: find("service")?,
            plate_number: find("plate_number")?,
        })
    }

    fn parse_row(
        &self,
        cells: &[&str],
        line: usize,
        issues: &mut LoadIssues,
    ) -> VizResult<SpotObservation> {
        let cell = |i: usize| cells.get(i).copied().unwrap_or("");

        let raw_ts = cell(self.current_time);
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| {
            VizError::load(format!("row {line}: unparseable timestamp '{raw_ts}'"))
        })?;

        let service = optional(cell(self.service)).and_then(|label| {
            let parsed = Service::from_label(&label);
            if parsed.is_none() {
                tracing::warn!(row = line, label = %label, "unknown service label ignored");
                issues.unknown_labels += 1;
            }
            parsed
        });

        Ok(SpotObservation {
            timestamp,
            slot_id: parse_slot_id(cell(self.slot_id), line)?,
            x: parse_coord(cell(self.x), "x", line)?,
            y: parse_coord(cell(self.y), "y", line)?,
            reservation_id: optional(cell(self.reservation_id)),
            service,
            plate_number: optional(cell(self.plate_number)),
        })
    }
}

fn optional(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}

// Spreadsheet exports often write integer columns as "5.0".
fn parse_slot_id(s: &str, line: usize) -> VizResult<u32> {
    let s = s.trim();
    if let Ok(v) = s.parse::<u32>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.fract() == 0.0 && v >= 0.0 && v <= f64::from(u32::MAX) => Ok(v as u32),
        _ => Err(VizError::load(format!("row {line}: invalid slot_id '{s}'"))),
    }
}

fn parse_coord(s: &str, column: &str, line: usize) -> VizResult<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| VizError::load(format!("row {line}: invalid {column} '{s}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/data/loader.rs"]
mod tests;
