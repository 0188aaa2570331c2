//! Timestamp parsing and trim-bound resolution.
//!
//! Trim bounds are accepted either as raw seconds or as `H:MM:SS`
//! clock strings, so both forms share one parsing path here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when parsing a clock-style timestamp.
#[derive(Debug, Error, PartialEq)]
pub enum TimestampError {
    #[error("empty timestamp")]
    Empty,

    #[error("invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("invalid timestamp format: {0}")]
    InvalidFormat(String),
}

/// Parse a clock timestamp string to total seconds.
///
/// Supports `HH:MM:SS`, `MM:SS` and bare `SS`, each with an optional
/// fractional part (`seconds = 3600 * h + 60 * m + s`).
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    match parts.len() {
        1 => {
            let seconds: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[0].to_string()))?;
            Ok(seconds)
        }
        2 => {
            let minutes: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("minutes", parts[0].to_string()))?;
            let seconds: f64 = parts[1]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[1].to_string()))?;
            Ok(minutes * 60.0 + seconds)
        }
        3 => {
            let hours: f64 = parts[0]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("hours", parts[0].to_string()))?;
            let minutes: f64 = parts[1]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("minutes", parts[1].to_string()))?;
            let seconds: f64 = parts[2]
                .parse()
                .map_err(|_| TimestampError::InvalidValue("seconds", parts[2].to_string()))?;
            Ok(hours * 3600.0 + minutes * 60.0 + seconds)
        }
        _ => Err(TimestampError::InvalidFormat(ts.to_string())),
    }
}

/// Format seconds into an `HH:MM:SS` or `HH:MM:SS.mmm` string.
pub fn format_seconds(total_secs: f64) -> String {
    let hours = (total_secs / 3600.0).floor() as u32;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u32;
    let secs = total_secs % 60.0;

    if (secs - secs.floor()).abs() > 0.0001 {
        format!("{:02}:{:02}:{:06.3}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs.floor() as u32)
    }
}

/// A trim bound: either a seconds offset or a clock string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSpec {
    Seconds(f64),
    Clock(String),
}

impl TimeSpec {
    /// Resolve the bound to seconds.
    pub fn to_seconds(&self) -> Result<f64, TimestampError> {
        match self {
            TimeSpec::Seconds(s) => Ok(*s),
            TimeSpec::Clock(s) => parse_timestamp(s),
        }
    }
}

impl From<f64> for TimeSpec {
    fn from(s: f64) -> Self {
        TimeSpec::Seconds(s)
    }
}

impl From<&str> for TimeSpec {
    fn from(s: &str) -> Self {
        TimeSpec::Clock(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_hms() {
        assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
        assert!((parse_timestamp("00:00:30.5").unwrap() - 30.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_timestamp_short_forms() {
        assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
        assert_eq!(parse_timestamp("90").unwrap(), 90.0);
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("aa:00:00"),
            Err(TimestampError::InvalidValue("hours", _))
        ));
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(5400.0), "01:30:00");
        assert_eq!(format_seconds(30.5), "00:00:30.500");
    }

    #[test]
    fn test_timespec_resolution() {
        assert_eq!(TimeSpec::from(4.5).to_seconds().unwrap(), 4.5);
        assert_eq!(TimeSpec::from("0:01:30").to_seconds().unwrap(), 90.0);
    }
}
