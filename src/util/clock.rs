//! Countdown formatting and duration helpers
//!
//! Formats the category countdown the way the game displays it and parses
//! the human-readable durations used in the configuration file.

use std::time::Duration;

/// Format milliseconds as `MM:SS.cc`
///
/// # Examples
/// ```
/// use ttal::util::clock::format_timer;
///
/// assert_eq!(format_timer(60_000), "01:00.00");
/// assert_eq!(format_timer(9_870), "00:09.87");
/// assert_eq!(format_timer(0), "00:00.00");
/// ```
pub fn format_timer(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    let centiseconds = (ms % 1000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, centiseconds)
}

/// Format a penalty as the short indicator shown next to the timer
///
/// # Examples
/// ```
/// use ttal::util::clock::format_penalty;
///
/// assert_eq!(format_penalty(3_000), "-3s");
/// assert_eq!(format_penalty(1_500), "-1.5s");
/// ```
pub fn format_penalty(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("-{}s", ms / 1000)
    } else {
        format!("-{:.1}s", ms as f64 / 1000.0)
    }
}

/// Parse a duration like `60s`, `1500ms`, or `1m 30s`
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    humantime::parse_duration(input.trim())
        .map_err(|e| format!("Invalid duration '{}': {}", input, e))
}

/// Format a duration in the same notation [`parse_duration`] accepts
pub fn format_duration(duration: Duration) -> String {
    humantime::format_duration(duration).to_string()
}

/// Serde adapter storing a `Duration` as a human-readable string
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_duration(*duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(60_000), "01:00.00");
        assert_eq!(format_timer(59_990), "00:59.99");
        assert_eq!(format_timer(61_005), "01:01.00");
        assert_eq!(format_timer(125_430), "02:05.43");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("60s").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("1500ms").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(" 1m 30s ").unwrap(), Duration::from_secs(90));
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn test_format_parse_agree() {
        for ms in [10, 1_000, 1_500, 60_000] {
            let d = Duration::from_millis(ms);
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }
}
