//! services/client/src/app/forms.rs
//!
//! Client-side validation that runs before any request is issued, and the
//! time-zone-safe construction of schedule instants.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use regex::Regex;
use ridetribe_core::ports::{PortError, PortResult};
use std::sync::LazyLock;

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

pub const MIN_PASSWORD_LEN: usize = 8;

/// Strips formatting from a phone number and checks what is left.
///
/// Mirrors the backend's normalization: every non-digit is removed.
pub fn normalize_phone(raw: &str) -> PortResult<String> {
    let digits = NON_DIGIT.replace_all(raw, "").into_owned();
    if digits.is_empty() {
        return Err(PortError::Validation("Phone number is required".to_string()));
    }
    if !(10..=15).contains(&digits.len()) {
        return Err(PortError::Validation(format!(
            "'{}' is not a valid phone number",
            raw.trim()
        )));
    }
    Ok(digits)
}

/// Returns the trimmed value, or a validation error naming the field.
pub fn required<'a>(value: &'a str, field: &str) -> PortResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PortError::Validation(format!("{} is required", field)))
    } else {
        Ok(trimmed)
    }
}

pub fn parse_date(raw: &str) -> PortResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| PortError::Validation(format!("'{}' is not a valid date", raw.trim())))
}

/// Accepts both 24-hour (`14:30`) and 12-hour (`2:30 PM`) input.
pub fn parse_time(raw: &str) -> PortResult<NaiveTime> {
    let raw = raw.trim();
    ["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| PortError::Validation(format!("'{}' is not a valid time", raw)))
}

/// The zone in which picked dates and times are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The machine's local zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    /// Combines a picked date and time into one instant at that wall-clock
    /// time in this zone. The result keeps its offset, so nothing shifts.
    pub fn compose(&self, date: NaiveDate, time: NaiveTime) -> PortResult<DateTime<FixedOffset>> {
        match self {
            Zone::Local => compose_in(&Local, date, time),
            Zone::Fixed(offset) => compose_in(offset, date, time),
        }
    }

    /// The wall-clock time an instant shows in this zone, whatever offset it
    /// was stored with.
    pub fn localize(&self, instant: &DateTime<FixedOffset>) -> NaiveDateTime {
        match self {
            Zone::Local => instant.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }
}

fn compose_in<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> PortResult<DateTime<FixedOffset>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|dt| dt.fixed_offset())
        .ok_or_else(|| {
            PortError::Validation(format!(
                "{} {} does not exist in the local time zone",
                date,
                time.format("%H:%M")
            ))
        })
}
