//! UTC timestamps and human readable relative times.

use chrono::{DateTime, SecondsFormat, Utc};

/// Returned when a timestamp string cannot be parsed.
pub const INVALID_DATE: &str = "Invalid date";

/// Current UTC time as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn utc_now() -> String {
    format_utc(Utc::now())
}

pub fn format_utc(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Relative description of `timestamp` against the current time, e.g.
/// `"5 minutes ago"` or `"in 2 days"`.
pub fn humanize_since(timestamp: &str) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(t) => humanize_between(t.with_timezone(&Utc), Utc::now()),
        Err(_) => INVALID_DATE.to_string(),
    }
}

/// Relative description of `t` as seen from `now`.
pub fn humanize_between(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (t - now).num_milliseconds();
    let phrase = relative_phrase(diff_ms.unsigned_abs() as f64);
    if diff_ms > 0 {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}

// Same bucket boundaries as moment.js `fromNow`.
fn relative_phrase(ms: f64) -> String {
    let seconds = (ms / 1_000.0).round();
    let minutes = (ms / 60_000.0).round();
    let hours = (ms / 3_600_000.0).round();
    let days_exact = ms / 86_400_000.0;
    let days = days_exact.round();
    let months = (days_exact * 12.0 / 146_097.0 * 400.0).round();
    let years = (days_exact / 365.2425).round();

    if seconds <= 44.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{minutes} minutes")
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{hours} hours")
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{days} days")
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{months} months")
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn utc_format_has_seconds_and_z() {
        assert_eq!(format_utc(now()), "2024-03-01T12:00:00Z");
        assert!(utc_now().ends_with('Z'));
    }

    #[test]
    fn past_buckets() {
        let n = now();
        assert_eq!(humanize_between(n, n), "a few seconds ago");
        assert_eq!(humanize_between(n - Duration::seconds(30), n), "a few seconds ago");
        assert_eq!(humanize_between(n - Duration::seconds(60), n), "a minute ago");
        assert_eq!(humanize_between(n - Duration::minutes(5), n), "5 minutes ago");
        assert_eq!(humanize_between(n - Duration::minutes(50), n), "an hour ago");
        assert_eq!(humanize_between(n - Duration::hours(3), n), "3 hours ago");
        assert_eq!(humanize_between(n - Duration::hours(30), n), "a day ago");
        assert_eq!(humanize_between(n - Duration::days(4), n), "4 days ago");
        assert_eq!(humanize_between(n - Duration::days(30), n), "a month ago");
        assert_eq!(humanize_between(n - Duration::days(95), n), "3 months ago");
        assert_eq!(humanize_between(n - Duration::days(365), n), "a year ago");
        assert_eq!(humanize_between(n - Duration::days(3 * 365), n), "3 years ago");
    }

    #[test]
    fn future_uses_in_prefix() {
        let n = now();
        assert_eq!(humanize_between(n + Duration::days(2), n), "in 2 days");
    }

    #[test]
    fn invalid_timestamp() {
        assert_eq!(humanize_since("yesterday-ish"), INVALID_DATE);
    }
}
