//! Domain data structures for households, discharge records, and monitored conditions.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifies one household towards the discharge service.
pub struct QueryIdentity {
    /// RFID tag code printed on the household's waste card (`tagprintcd`).
    pub tag_code: String,
    /// Building section number (`aptdong`).
    pub dong: u32,
    /// Unit number within the building (`apthono`).
    pub ho: u32,
}

impl QueryIdentity {
    /// Construct a new query identity.
    #[must_use]
    pub fn new<S: Into<String>>(tag_code: S, dong: u32, ho: u32) -> Self {
        Self {
            tag_code: tag_code.into(),
            dong,
            ho,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Metrics a deployment can choose to expose as sensors.
pub enum Condition {
    /// Number of discharges reported for the month.
    TotalCount,
    /// Weight of the most recent discharge.
    LastKg,
    /// Timestamp of the most recent discharge.
    LastDate,
    /// Accumulated weight over all pages.
    TotalKg,
    /// Household address as reported by the service.
    Address,
}

impl Condition {
    /// Conditions monitored when the configuration names none.
    #[must_use]
    pub fn default_set() -> Vec<Condition> {
        vec![Condition::TotalKg, Condition::TotalCount, Condition::LastKg]
    }

    /// Human-readable label appended to the sensor name.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Condition::TotalCount => "Total count",
            Condition::LastKg => "Last kg",
            Condition::LastDate => "Last date",
            Condition::TotalKg => "Total kg",
            Condition::Address => "Address",
        }
    }

    /// Unit of measurement; non-weight conditions use a blank unit.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Condition::LastKg | Condition::TotalKg => "kg",
            Condition::TotalCount | Condition::LastDate | Condition::Address => " ",
        }
    }

    /// Material design icon identifier.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Condition::TotalCount => "mdi:counter",
            Condition::LastKg | Condition::TotalKg => "mdi:scale",
            Condition::LastDate => "mdi:calendar-clock",
            Condition::Address => "mdi:home",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Condition::TotalCount => "total_count",
            Condition::LastKg => "last_kg",
            Condition::LastDate => "last_date",
            Condition::TotalKg => "total_kg",
            Condition::Address => "address",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Single weighed discharge.
pub struct DischargeRecord {
    /// Discharged weight in kilograms.
    pub kg: f64,
    /// Service-formatted timestamp of the discharge.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// First page of a discharge query, carrying the summary fields.
pub struct FirstPage {
    /// Total number of discharges across all pages.
    pub total_count: i64,
    /// Number of pages the service splits the result into.
    pub total_pages: u32,
    /// Household address.
    pub address: String,
    /// Records on this page, most recent first.
    pub records: Vec<DischargeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Aggregated result of one successful fetch cycle.
pub struct Snapshot {
    /// `totalCnt` as reported by the service.
    pub total_count: i64,
    /// Weight of the first record on page 1, unset when the month has none.
    pub last_kg: Option<f64>,
    /// Timestamp of the first record on page 1, unset when the month has none.
    pub last_date: Option<String>,
    /// Sum of every record's weight over all pages.
    pub total_kg: f64,
    /// Household address.
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive start/end range for requested discharges.
pub struct DateRange {
    /// Start date (inclusive).
    pub start: NaiveDate,
    /// End date (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Range from the first day of `today`'s month through `today`.
    #[must_use]
    pub fn month_to_date(today: NaiveDate) -> Self {
        let start = today.with_day(1).unwrap_or(today);
        Self { start, end: today }
    }
}
