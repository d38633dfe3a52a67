use std::{io::Write, path::Path};

use anyhow::Context;
use chrono::{NaiveDateTime, Timelike};

use crate::{
    data::{loader::REQUIRED_COLUMNS, table::ObservationTable},
    foundation::error::{VizError, VizResult},
};

/// Write the (normalized) table back to `path` as CSV with the standard seven columns.
///
/// Refuses tables whose load dropped rows or service labels, since writing them would lose data.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn write_table(table: &ObservationTable, path: &Path) -> VizResult<()> {
    let issues = table.issues();
    if !issues.is_clean() {
        return Err(VizError::validation(format!(
            "refusing to write '{}': {} unknown service label(s) and {} duplicate row(s) from the \
             input would be lost",
            path.display(),
            issues.unknown_labels,
            issues.duplicate_rows
        )));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("create data file '{}'", path.display()))?;
    write_table_to(table, std::io::BufWriter::new(file))?;
    tracing::info!(rows = table.len(), "wrote normalized table");
    Ok(())
}

pub fn write_table_to<W: Write>(table: &ObservationTable, writer: W) -> VizResult<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(REQUIRED_COLUMNS)
        .context("write CSV header")?;

    for r in table.rows() {
        wtr.write_record([
            format_timestamp(r.timestamp),
            r.slot_id.to_string(),
            r.x.to_string(),
            r.y.to_string(),
            r.reservation_id.clone().unwrap_or_default(),
            r.service.map(|s| s.label().to_owned()).unwrap_or_default(),
            r.plate_number.clone().unwrap_or_default(),
        ])
        .context("write CSV row")?;
    }
    wtr.flush().context("flush CSV writer")?;
    Ok(())
}

/// `%Y-%m-%d %H:%M:%S`, with fractional seconds only when present.
pub fn format_timestamp(ts: NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/writer.rs"]
mod tests;
