use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::{
    data::observation::{Service, SpotObservation, SpotStatus},
    foundation::error::{VizError, VizResult},
};

/// All spot observations of one run, in file order.
///
/// Loaded once and treated as read-only afterwards; the only mutation is the one-time service
/// normalization done by the loader.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<SpotObservation>,
    issues: LoadIssues,
}

/// Input the loader could not carry into the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadIssues {
    /// Service labels that matched no known service and were read as empty.
    pub unknown_labels: usize,
    /// Rows dropped because their `(timestamp, slot_id)` pair was already seen.
    pub duplicate_rows: usize,
}

impl LoadIssues {
    pub fn is_clean(&self) -> bool {
        self.unknown_labels == 0 && self.duplicate_rows == 0
    }
}

impl ObservationTable {
    pub fn from_rows(rows: Vec<SpotObservation>) -> Self {
        Self {
            rows,
            issues: LoadIssues::default(),
        }
    }

    pub fn with_issues(mut self, issues: LoadIssues) -> Self {
        self.issues = issues;
        self
    }

    pub fn issues(&self) -> LoadIssues {
        self.issues
    }

    pub fn rows(&self) -> &[SpotObservation] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [SpotObservation] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, distinct timestamps.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.rows
            .iter()
            .map(|r| r.timestamp)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Rows sharing `timestamp`, in file order. Recomputed on every call.
    pub fn frame(&self, timestamp: NaiveDateTime) -> Frame<'_> {
        Frame {
            timestamp,
            rows: self
                .rows
                .iter()
                .filter(|r| r.timestamp == timestamp)
                .collect(),
        }
    }

    /// Distinct, non-blank plate numbers referenced anywhere in the table.
    pub fn plate_numbers(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .filter_map(|r| r.plate_number.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Reject timestamps holding more distinct slots than the configured capacity.
    pub fn validate_capacity(&self, capacity: u32) -> VizResult<()> {
        let mut slots: BTreeMap<NaiveDateTime, BTreeSet<u32>> = BTreeMap::new();
        for r in &self.rows {
            slots.entry(r.timestamp).or_default().insert(r.slot_id);
        }
        for (ts, s) in slots {
            if s.len() > capacity as usize {
                return Err(VizError::validation(format!(
                    "timestamp {ts} has {} distinct slots but capacity is {capacity}",
                    s.len()
                )));
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> TableSummary {
        let mut out = TableSummary {
            rows: self.rows.len(),
            ..TableSummary::default()
        };
        let mut stamps = BTreeSet::new();
        for r in &self.rows {
            stamps.insert(r.timestamp);
            match r.status() {
                SpotStatus::Occupied => {
                    out.occupied += 1;
                    if let Some(s) = r.service {
                        *out.occupied_by_service.entry(s).or_default() += 1;
                    }
                }
                SpotStatus::Vacant => out.vacant += 1,
            }
        }
        out.first = stamps.first().copied();
        out.last = stamps.last().copied();
        out.timestamps = stamps.len();
        out
    }
}

/// Borrowed view of one timestamp's rows.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
    pub timestamp: NaiveDateTime,
    rows: Vec<&'a SpotObservation>,
}

impl<'a> Frame<'a> {
    pub fn from_rows(timestamp: NaiveDateTime, rows: Vec<&'a SpotObservation>) -> Self {
        Self { timestamp, rows }
    }

    pub fn rows(&self) -> &[&'a SpotObservation] {
        &self.rows
    }

    pub fn occupied(&self) -> impl Iterator<Item = &'a SpotObservation> + '_ {
        self.rows.iter().copied().filter(|r| r.is_occupied())
    }

    pub fn vacant(&self) -> impl Iterator<Item = &'a SpotObservation> + '_ {
        self.rows.iter().copied().filter(|r| !r.is_occupied())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load-time overview logged after parsing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSummary {
    pub rows: usize,
    pub timestamps: usize,
    pub first: Option<NaiveDateTime>,
    pub last: Option<NaiveDateTime>,
    pub occupied: usize,
    pub vacant: usize,
    pub occupied_by_service: BTreeMap<Service, usize>,
}

#[cfg(test)]
#[path = "../../tests/unit/data/table.rs"]
mod tests;
