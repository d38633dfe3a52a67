use crate::{
    data::{
        observation::{Service, SpotObservation},
        table::ObservationTable,
    },
    foundation::error::{VizError, VizResult},
};

/// Where unclassified ("Other") rows go.
///
/// The first `floor(n / 2)` unclassified rows in file order become `first`, the rest `second`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SplitPolicy {
    pub first: Service,
    pub second: Service,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            first: Service::Waymo,
            second: Service::Taxi,
        }
    }
}

impl SplitPolicy {
    pub fn validate(&self) -> VizResult<()> {
        if !self.first.is_concrete() || !self.second.is_concrete() {
            return Err(VizError::validation(
                "split targets must be concrete services",
            ));
        }
        if self.first == self.second {
            return Err(VizError::validation("split targets must differ"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReclassifySummary {
    pub unclassified: usize,
    pub to_first: usize,
    pub to_second: usize,
}

/// Reassign every unclassified row to a concrete service. Idempotent.
pub fn split_unclassified(rows: &mut [SpotObservation], policy: SplitPolicy) -> ReclassifySummary {
    let total = rows
        .iter()
        .filter(|r| r.service == Some(Service::Unclassified))
        .count();
    let half = total / 2;

    let mut seen = 0usize;
    for r in rows
        .iter_mut()
        .filter(|r| r.service == Some(Service::Unclassified))
    {
        r.service = Some(if seen < half {
            policy.first
        } else {
            policy.second
        });
        seen += 1;
    }

    ReclassifySummary {
        unclassified: total,
        to_first: half,
        to_second: total - half,
    }
}

impl ObservationTable {
    pub fn normalize_services(&mut self, policy: SplitPolicy) -> ReclassifySummary {
        split_unclassified(self.rows_mut(), policy)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/data/reclassify.rs"]
mod tests;
