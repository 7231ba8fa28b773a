//! Reservation Model
//!
//! One reservation row is the unit of calendar truth. A combined booking
//! over two tables is still ONE row: `table_ids` carries the full ordered
//! set, never one row per table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown reservation status: {other}")),
        }
    }
}

/// Confirmed or cancelled booking over one or more tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    /// Ascending table ids jointly allocated to this booking (1 = single
    /// table, 2 = combined). Only ever replaced wholesale, never edited.
    pub table_ids: Vec<i64>,
    pub date: NaiveDate,
    /// Unix millis, half-open interval `[start_time, end_time)`
    pub start_time: i64,
    pub end_time: i64,
    pub party_size: i32,
    pub status: ReservationStatus,
    pub created_at: i64,
}

impl Reservation {
    /// Whether this reservation blocks availability
    pub fn blocks(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

/// Structured booking request consumed by the coordinator.
///
/// Instants are absolute Unix millis; the HTTP layer is responsible for
/// resolving local date + clock time in the business timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: NaiveDate,
    pub start_time: i64,
    pub end_time: i64,
    pub party_size: i32,
}

/// One scan candidate: an instant plus whether an assignment exists for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    /// Unix millis of the candidate start instant
    pub time: i64,
    /// Local clock label, e.g. "20:30"
    pub label: String,
    pub bookable: bool,
}
