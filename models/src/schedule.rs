// models/src/schedule.rs

//! Date and time-of-day handling for appointment documents.
//!
//! Stored documents use `YYYY-MM-DD` dates and `HH:MM` times. Older records
//! also carry a combined `"HH:MM - HH:MM"` slot string, or full timestamps
//! where a plain date is expected; both are accepted on read.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer};

use crate::errors::{ValidationError, ValidationResult};

pub const TIME_FORMAT: &str = "%H:%M";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `HH:MM` (or `HH:MM:SS`) into a time of day.
pub fn parse_time(value: &str) -> ValidationResult<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%Hh%M"))
        .map_err(|_| ValidationError::InvalidTimeFormat(value.to_string()))
}

/// Parses a calendar date, accepting RFC 3339 timestamps and `DD/MM/YYYY`.
pub fn parse_date(value: &str) -> ValidationResult<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    NaiveDate::parse_from_str(trimmed, "%d/%m/%Y")
        .map_err(|_| ValidationError::InvalidDateFormat(value.to_string()))
}

pub fn format_time(time: &NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// A start/end pair parsed from a legacy slot string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Parses `"HH:MM - HH:MM"`. Spaces around the dash are optional.
    pub fn parse(value: &str) -> ValidationResult<Self> {
        let (start, end) = value
            .split_once('-')
            .ok_or_else(|| ValidationError::InvalidTimeSlot(value.to_string()))?;
        let start = parse_time(start).map_err(|_| ValidationError::InvalidTimeSlot(value.to_string()))?;
        let end = parse_time(end).map_err(|_| ValidationError::InvalidTimeSlot(value.to_string()))?;
        if end <= start {
            return Err(ValidationError::InvalidTimeSlot(value.to_string()));
        }
        Ok(TimeSlot { start, end })
    }
}

/// Serde adapter for `NaiveDate` written as `YYYY-MM-DD`.
pub mod date {
    use super::*;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<NaiveTime>` written as `HH:MM`.
pub mod optional_time {
    use super::*;

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(time) => serializer.serialize_str(&format_time(time)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            Some(value) if !value.trim().is_empty() => {
                parse_time(&value).map(Some).map_err(serde::de::Error::custom)
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn should_parse_slot_with_spaces() {
        let slot = TimeSlot::parse("09:00 - 09:30").unwrap();
        assert_eq!(slot.start, hm(9, 0));
        assert_eq!(slot.end, hm(9, 30));
    }

    #[test]
    fn should_parse_slot_without_spaces() {
        let slot = TimeSlot::parse("14:15-15:00").unwrap();
        assert_eq!(slot, TimeSlot { start: hm(14, 15), end: hm(15, 0) });
    }

    #[test]
    fn should_reject_malformed_slots() {
        assert!(TimeSlot::parse("morning").is_err());
        assert!(TimeSlot::parse("10:00 - ").is_err());
        assert!(TimeSlot::parse("11:00 - 10:00").is_err());
    }

    #[test]
    fn should_parse_legacy_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 18).unwrap();
        assert_eq!(parse_date("2024-03-18").unwrap(), expected);
        assert_eq!(parse_date("2024-03-18T08:00:00Z").unwrap(), expected);
        assert_eq!(parse_date("18/03/2024").unwrap(), expected);
        assert!(parse_date("next monday").is_err());
    }

    #[test]
    fn should_accept_seconds_in_times() {
        assert_eq!(parse_time("08:45:00").unwrap(), hm(8, 45));
        assert_eq!(format_time(&hm(8, 5)), "08:05");
    }
}
