//! Calendar conversions for display labels.
//!
//! All conversions are in UTC so labels do not depend on the host's time zone.
//! Timestamps outside chrono's representable range yield `None`.

use chrono::{DateTime, Datelike, Months, Utc};
use serde::Serialize;

use crate::time::Timestamp;

/// Month name and year of a timestamp, e.g. `March 1831`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthYear {
    pub month: String,
    pub year: i32,
}

impl std::fmt::Display for MonthYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

pub fn to_datetime(ts: Timestamp) -> Option<DateTime<Utc>> {
    if !ts.is_finite() {
        return None;
    }
    let secs = ts.0.floor();
    let nanos = ((ts.0 - secs) * 1e9).clamp(0.0, 999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

pub fn from_datetime(dt: DateTime<Utc>) -> Timestamp {
    Timestamp(dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_nanos()) / 1e9)
}

pub fn year_of(ts: Timestamp) -> Option<i32> {
    to_datetime(ts).map(|dt| dt.year())
}

pub fn month_year(ts: Timestamp) -> Option<MonthYear> {
    let dt = to_datetime(ts)?;
    Some(MonthYear {
        month: dt.format("%B").to_string(),
        year: dt.year(),
    })
}

/// Long date with an ordinal day, e.g. `1st January 1800`.
pub fn ordinal_date(ts: Timestamp) -> Option<String> {
    let dt = to_datetime(ts)?;
    let day = dt.day();
    Some(format!(
        "{day}{} {} {}",
        ordinal_suffix(day),
        dt.format("%B"),
        dt.year()
    ))
}

pub fn ordinal_suffix(n: u32) -> &'static str {
    if (4..=20).contains(&n) {
        return "th";
    }
    match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Moves `ts` by whole calendar months, clamping the day to the target month.
pub fn shift_months(ts: Timestamp, months: i32) -> Option<Timestamp> {
    let dt = to_datetime(ts)?;
    let shifted = if months >= 0 {
        dt.checked_add_months(Months::new(months.unsigned_abs()))?
    } else {
        dt.checked_sub_months(Months::new(months.unsigned_abs()))?
    };
    Some(from_datetime(shifted))
}
