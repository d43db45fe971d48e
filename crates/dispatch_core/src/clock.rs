//! Wall-clock time of day, stored as whole minutes since midnight.
//!
//! Ride windows are expressed as zero-padded 24-hour `"HH:mm"` strings in the
//! input records. [`parse_time_of_day`] and [`format_time_of_day`] convert
//! between that text form and [`TimeOfDay`]; rides never cross midnight.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time-of-day string that is not a valid `"HH:mm"` clock value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed time of day {text:?}: {reason}")]
pub struct MalformedTimeError {
    pub text: String,
    pub reason: &'static str,
}

/// Minutes since midnight, always in `0..MINUTES_PER_DAY`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Returns `None` when `minutes` falls outside a single day.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Whole minutes from `self` until `later`, or `None` if `later` is earlier.
    pub fn minutes_until(self, later: TimeOfDay) -> Option<u32> {
        later.0.checked_sub(self.0)
    }
}

/// Parse a zero-padded 24-hour `"HH:mm"` clock string.
pub fn parse_time_of_day(text: &str) -> Result<TimeOfDay, MalformedTimeError> {
    let malformed = |reason: &'static str| MalformedTimeError {
        text: text.to_string(),
        reason,
    };

    let mut fields = text.split(':');
    let (hours, minutes) = match (fields.next(), fields.next(), fields.next()) {
        (Some(hours), Some(minutes), None) => (hours, minutes),
        _ => return Err(malformed("expected two colon-separated fields")),
    };

    let hours = parse_clock_field(hours).ok_or_else(|| malformed("hours must be two digits"))?;
    let minutes =
        parse_clock_field(minutes).ok_or_else(|| malformed("minutes must be two digits"))?;

    if hours > 23 {
        return Err(malformed("hours must be within 00-23"));
    }
    if minutes > 59 {
        return Err(malformed("minutes must be within 00-59"));
    }

    Ok(TimeOfDay(hours * 60 + minutes))
}

/// Format a time of day as `"HH:mm"`.
pub fn format_time_of_day(time: TimeOfDay) -> String {
    format!("{:02}:{:02}", time.0 / 60, time.0 % 60)
}

fn parse_clock_field(field: &str) -> Option<u32> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time_of_day(*self))
    }
}

impl FromStr for TimeOfDay {
    type Err = MalformedTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&format_time_of_day(*self))
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        let text = String::deserialize(de)?;
        parse_time_of_day(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_minute_of_the_day_round_trips() {
        for minutes in 0..MINUTES_PER_DAY {
            let time = TimeOfDay::from_minutes(minutes).expect("in range");
            let text = format_time_of_day(time);
            assert_eq!(parse_time_of_day(&text), Ok(time), "round trip of {text}");
        }
    }

    #[test]
    fn parses_boundaries() {
        assert_eq!(parse_time_of_day("00:00").map(TimeOfDay::minutes), Ok(0));
        assert_eq!(parse_time_of_day("23:59").map(TimeOfDay::minutes), Ok(1439));
        assert_eq!(parse_time_of_day("08:20").map(TimeOfDay::minutes), Ok(500));
    }

    #[test]
    fn rejects_malformed_text() {
        for text in [
            "", "7:30", "07:3", "0730", "07:30:00", "24:00", "12:60", "ab:cd", "+1:30", "07:-1",
        ] {
            let err = parse_time_of_day(text).expect_err(text);
            assert_eq!(err.text, text);
        }
    }

    #[test]
    fn out_of_range_reports_the_field() {
        let err = parse_time_of_day("24:00").unwrap_err();
        assert_eq!(err.reason, "hours must be within 00-23");
        let err = parse_time_of_day("10:75").unwrap_err();
        assert_eq!(err.reason, "minutes must be within 00-59");
    }

    #[test]
    fn from_minutes_rejects_next_day() {
        assert!(TimeOfDay::from_minutes(MINUTES_PER_DAY).is_none());
        assert_eq!(TimeOfDay::MIDNIGHT.minutes_until(TimeOfDay(30)), Some(30));
        assert_eq!(TimeOfDay(30).minutes_until(TimeOfDay::MIDNIGHT), None);
    }

    #[test]
    fn serde_uses_clock_text() {
        let time: TimeOfDay = serde_json::from_str("\"09:05\"").expect("deserialize");
        assert_eq!(time.minutes(), 545);
        assert_eq!(serde_json::to_string(&time).expect("serialize"), "\"09:05\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"9:05\"").is_err());
    }
}
