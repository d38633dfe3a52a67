use chrono::NaiveDateTime;

use crate::{
    data::{
        observation::Service,
        table::{Frame, ObservationTable},
    },
    foundation::core::Rgba8,
};

/// Occupied-row counts per concrete service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ServiceCounts {
    pub uber: usize,
    pub lyft: usize,
    pub waymo: usize,
    pub taxi: usize,
}

impl ServiceCounts {
    pub fn get(&self, service: Service) -> usize {
        match service {
            Service::Uber => self.uber,
            Service::Lyft => self.lyft,
            Service::Waymo => self.waymo,
            Service::Taxi => self.taxi,
            Service::Unclassified => 0,
        }
    }

    fn bump(&mut self, service: Service) {
        match service {
            Service::Uber => self.uber += 1,
            Service::Lyft => self.lyft += 1,
            Service::Waymo => self.waymo += 1,
            Service::Taxi => self.taxi += 1,
            Service::Unclassified => {}
        }
    }

    /// Largest count, or 1 when all are zero (safe bar denominator).
    pub fn max_or_one(&self) -> usize {
        Service::CONCRETE
            .iter()
            .map(|&s| self.get(s))
            .max()
            .unwrap_or(0)
            .max(1)
    }

    /// Bar length relative to the busiest service, in `[0, 1]`.
    pub fn bar_fraction(&self, service: Service) -> f64 {
        self.get(service) as f64 / self.max_or_one() as f64
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, usize)> + '_ {
        Service::CONCRETE.into_iter().map(|s| (s, self.get(s)))
    }
}

/// Occupancy rate color band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RateBand {
    Low,
    Medium,
    High,
}

impl RateBand {
    pub fn of(rate: f64) -> Self {
        if rate < 50.0 {
            Self::Low
        } else if rate < 80.0 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn color(self) -> Rgba8 {
        match self {
            Self::Low => Rgba8::rgb(0x27, 0xae, 0x60),
            Self::Medium => Rgba8::rgb(0xf3, 0x9c, 0x12),
            Self::High => Rgba8::rgb(0xe7, 0x4c, 0x3c),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameStats {
    pub timestamp: NaiveDateTime,
    pub capacity: u32,
    pub occupied_count: usize,
    pub vacant_count: usize,
    /// Percent of `capacity`, not of the rows present in the frame.
    pub occupancy_rate: f64,
    pub per_service: ServiceCounts,
}

impl FrameStats {
    pub fn compute(frame: &Frame<'_>, capacity: u32) -> Self {
        let mut per_service = ServiceCounts::default();
        let mut occupied_count = 0usize;
        for r in frame.occupied() {
            occupied_count += 1;
            if let Some(s) = r.service {
                per_service.bump(s);
            }
        }
        let vacant_count = frame.len() - occupied_count;
        let occupancy_rate = if capacity == 0 {
            0.0
        } else {
            occupied_count as f64 / f64::from(capacity) * 100.0
        };

        Self {
            timestamp: frame.timestamp,
            capacity,
            occupied_count,
            vacant_count,
            occupancy_rate,
            per_service,
        }
    }

    /// Statistics for every timestamp in `table`, in time order.
    pub fn series(table: &ObservationTable, capacity: u32) -> Vec<Self> {
        table
            .timestamps()
            .into_iter()
            .map(|ts| Self::compute(&table.frame(ts), capacity))
            .collect()
    }

    pub fn rate_band(&self) -> RateBand {
        RateBand::of(self.occupancy_rate)
    }

    /// Share of occupied vehicles using `service`, in percent.
    pub fn share_of_vehicles(&self, service: Service) -> f64 {
        if self.occupied_count == 0 {
            return 0.0;
        }
        self.per_service.get(service) as f64 / self.occupied_count as f64 * 100.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stats/aggregate.rs"]
mod tests;
