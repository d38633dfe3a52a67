use chrono::NaiveDateTime;

/// Ride-hailing service attached to a spot observation.
///
/// `Unclassified` is the spreadsheet's catch-all "Other" label. It only exists between parsing and
/// [`split_unclassified`](crate::split_unclassified); nothing downstream of the loader sees it.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Service {
    Uber,
    Lyft,
    Waymo,
    Taxi,
    Unclassified,
}

impl Service {
    /// Concrete services in display order.
    pub const CONCRETE: [Service; 4] = [Service::Uber, Service::Lyft, Service::Waymo, Service::Taxi];

    /// Parse a spreadsheet label (case-insensitive). Returns `None` for unknown labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "uber" => Some(Self::Uber),
            "lyft" => Some(Self::Lyft),
            "waymo" => Some(Self::Waymo),
            "taxi" => Some(Self::Taxi),
            "other" => Some(Self::Unclassified),
            _ => None,
        }
    }

    /// Label as written to the spreadsheet.
    pub fn label(self) -> &'static str {
        match self {
            Self::Uber => "Uber",
            Self::Lyft => "Lyft",
            Self::Waymo => "Waymo",
            Self::Taxi => "Taxi",
            Self::Unclassified => "Other",
        }
    }

    /// File stem used for logo lookup (`logos/<stem>.png`).
    pub fn asset_stem(self) -> &'static str {
        match self {
            Self::Uber => "uber",
            Self::Lyft => "lyft",
            Self::Waymo => "waymo",
            Self::Taxi => "taxi",
            Self::Unclassified => "other",
        }
    }

    pub fn is_concrete(self) -> bool {
        self != Self::Unclassified
    }

    /// Single-letter stand-in when a logo is unavailable.
    pub fn initial(self) -> char {
        self.label().chars().next().unwrap_or('?')
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum SpotStatus {
    Occupied,
    Vacant,
}

impl SpotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Occupied => "occupied",
            Self::Vacant => "vacant",
        }
    }
}

/// One spreadsheet row: a single parking spot at a single timestamp.
#[derive(Clone, Debug, PartialEq)]
pub struct SpotObservation {
    pub timestamp: NaiveDateTime,
    pub slot_id: u32,
    /// Map pixel position, top-left origin.
    pub x: f64,
    pub y: f64,
    pub reservation_id: Option<String>,
    pub service: Option<Service>,
    pub plate_number: Option<String>,
}

impl SpotObservation {
    /// Occupied iff the reservation id is present and non-blank.
    pub fn status(&self) -> SpotStatus {
        match self.reservation_id.as_deref() {
            Some(r) if !r.trim().is_empty() => SpotStatus::Occupied,
            _ => SpotStatus::Vacant,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.status() == SpotStatus::Occupied
    }
}
