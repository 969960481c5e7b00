//! Unit guessing for loosely structured usage numbers.
//!
//! Save and config files store play time and last-played markers without
//! saying what unit they use. These functions guess from magnitude (and from
//! the key name, when it spells the unit out). The results are approximations:
//! a 50-minute session stored in seconds (3000) reads as 50 minutes, stored in
//! minutes (50) reads as 50 hours.
//!
//! The 3600 and 60 cutoffs are picked so that 7200 reads as 2.0 hours, 90 as
//! 1.5 hours and 5 as 5.0 hours.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Raw values above this are taken to be seconds.
pub const SECONDS_THRESHOLD: f64 = 3600.0;
/// Raw values above this (and not above [`SECONDS_THRESHOLD`]) are minutes.
pub const MINUTES_THRESHOLD: f64 = 60.0;
/// Integer timestamps with more digits than this are milliseconds.
pub const MAX_SECONDS_DIGITS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
}

impl TimeUnit {
    pub fn to_hours(self, raw: f64) -> f64 {
        match self {
            TimeUnit::Seconds => raw / 3600.0,
            TimeUnit::Minutes => raw / 60.0,
            TimeUnit::Hours => raw,
        }
    }
}

/// Guesses the unit of a bare duration from its magnitude.
pub fn guess_unit(raw: f64) -> TimeUnit {
    if raw > SECONDS_THRESHOLD {
        TimeUnit::Seconds
    } else if raw > MINUTES_THRESHOLD {
        TimeUnit::Minutes
    } else {
        TimeUnit::Hours
    }
}

/// The unit spelled out in a key such as `playtime_seconds` or `MinutesPlayed`.
pub fn unit_from_key(key: &str) -> Option<TimeUnit> {
    let key = key.to_lowercase();
    if key.contains("sec") {
        Some(TimeUnit::Seconds)
    } else if key.contains("min") {
        Some(TimeUnit::Minutes)
    } else if key.contains("hour") || key.contains("hrs") {
        Some(TimeUnit::Hours)
    } else {
        None
    }
}

/// Converts a bare duration to hours using [`guess_unit`].
pub fn normalize_hours(raw: f64) -> f64 {
    guess_unit(raw).to_hours(raw)
}

/// Converts a labeled duration to hours, trusting the key's unit when present.
pub fn normalize_labeled_hours(key: &str, raw: f64) -> f64 {
    unit_from_key(key)
        .unwrap_or_else(|| guess_unit(raw))
        .to_hours(raw)
}

/// Parses a last-played marker: an ISO date/datetime, or a Unix timestamp in
/// seconds or (beyond ten digits) milliseconds.
///
/// Values that land before 2000 are treated as noise.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    if raw.is_empty() {
        return None;
    }

    let parsed = if raw.chars().all(|c| c.is_ascii_digit()) {
        parse_unix(raw)
    } else {
        parse_iso(raw)
    }?;

    let floor = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).single()?;
    (parsed >= floor).then_some(parsed)
}

fn parse_unix(digits: &str) -> Option<DateTime<Utc>> {
    let value: i64 = digits.parse().ok()?;
    if value <= 0 {
        return None;
    }
    if digits.trim_start_matches('0').len() > MAX_SECONDS_DIGITS {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_seconds_branch() {
        assert_eq!(guess_unit(7200.0), TimeUnit::Seconds);
        assert!(approx(normalize_hours(7200.0), 2.0));
    }

    #[test]
    fn test_minutes_branch() {
        assert_eq!(guess_unit(90.0), TimeUnit::Minutes);
        assert!(approx(normalize_hours(90.0), 1.5));
    }

    #[test]
    fn test_hours_branch() {
        assert_eq!(guess_unit(5.0), TimeUnit::Hours);
        assert!(approx(normalize_hours(5.0), 5.0));
    }

    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(guess_unit(60.0), TimeUnit::Hours);
        assert_eq!(guess_unit(61.0), TimeUnit::Minutes);
        assert_eq!(guess_unit(3600.0), TimeUnit::Minutes);
        assert_eq!(guess_unit(3601.0), TimeUnit::Seconds);
    }

    #[test]
    fn test_key_unit_overrides_magnitude() {
        assert!(approx(normalize_labeled_hours("playtime_seconds", 90.0), 0.025));
        assert!(approx(normalize_labeled_hours("MinutesPlayed", 7200.0), 120.0));
        assert!(approx(normalize_labeled_hours("hours_played", 120.0), 120.0));
        assert!(approx(normalize_labeled_hours("time_played", 90.0), 1.5));
    }

    #[test]
    fn test_parse_iso_dates() {
        let date = parse_timestamp("2024-03-15").unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-03-15");

        let dt = parse_timestamp("\"2023-12-01T18:30:00Z\"").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2023-12-01 18:30");

        let naive = parse_timestamp("2022-07-04 10:00:00").unwrap();
        assert_eq!(naive.format("%Y-%m-%d").to_string(), "2022-07-04");
    }

    #[test]
    fn test_parse_unix_seconds_and_millis() {
        let secs = parse_timestamp("1700000000").unwrap();
        let millis = parse_timestamp("1700000000000").unwrap();
        assert_eq!(secs, millis);
        assert_eq!(secs.format("%Y-%m-%d").to_string(), "2023-11-14");
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("0"), None);
        assert_eq!(parse_timestamp("12345"), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
