//! Content-derived note timestamps.
//!
//! A note's activity time is taken from what the note says about itself
//! before falling back to filesystem metadata. Sources, in order:
//!
//! 1. frontmatter keys [`FRONTMATTER_DATE_KEYS`]
//! 2. an ISO date in the file path (`journal/2024-05-01.md`)
//! 3. the latest ISO date used as a heading
//! 4. the first ISO date within the top [`TOP_LINES`] lines
//!
//! Dates before 1900 or more than a year ahead are rejected. Accepted dates in
//! the future are clamped to `now`.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Frontmatter keys consulted, event dates first, creation last
pub const FRONTMATTER_DATE_KEYS: &[&str] = &[
    "event_date",
    "meeting_date",
    "updated",
    "modified",
    "date",
    "created",
];

/// Lines scanned for a leading ISO date
pub const TOP_LINES: usize = 20;

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}(?:[T _]?\d{2}:?\d{2}(?::?\d{2})?)?").unwrap()
});

static HEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s{0,3}#*\s*(\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2})?)?)\b").unwrap()
});

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H%M%S",
    "%Y-%m-%dT%H%M",
];

/// Resolve the content time of a note, if it declares one
pub fn resolve_content_time(
    path: &str,
    frontmatter: Option<&Value>,
    body: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    frontmatter
        .and_then(|fm| from_frontmatter(fm, now))
        .or_else(|| from_path(path, now))
        .or_else(|| latest_heading_date(body, now))
        .or_else(|| from_top_lines(body, now))
        .map(|t| t.min(now))
}

fn from_frontmatter(frontmatter: &Value, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let map = frontmatter.as_object()?;
    FRONTMATTER_DATE_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find_map(|value| date_value(value, now))
}

fn date_value(value: &Value, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s, now),
        Value::Array(items) => items.iter().find_map(|item| date_value(item, now)),
        _ => None,
    }
}

fn from_path(path: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let found = ISO_DATE.find(path)?;
    parse_timestamp(found.as_str(), now)
}

fn latest_heading_date(body: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    HEADING_DATE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| parse_timestamp(m.as_str(), now))
        .max()
}

fn from_top_lines(body: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    body.lines()
        .take(TOP_LINES)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| ISO_DATE.find(line))
        .find_map(|m| parse_timestamp(m.as_str(), now))
}

/// Parse an ISO-8601 style timestamp, accepting only plausible values
pub fn parse_timestamp(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        let ts = ts.with_timezone(&Utc);
        return is_plausible(ts, now).then_some(ts);
    }

    let candidate = ISO_DATE.find(value)?.as_str();
    let parsed = DATETIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(candidate, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(candidate.get(..10)?, "%Y-%m-%d")
                .ok()?
                .and_hms_opt(0, 0, 0)
        })?
        .and_utc();

    is_plausible(parsed, now).then_some(parsed)
}

fn is_plausible(ts: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    use chrono::Datelike;
    ts.year() >= 1900 && ts <= now + Duration::days(365)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_timestamp_layouts() {
        assert_eq!(parse_timestamp("2024-03-05", now()), Some(day(2024, 3, 5)));
        assert_eq!(
            parse_timestamp("2024-03-05T14:30", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-05 14:30:15", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 15).unwrap())
        );
        assert_eq!(
            parse_timestamp("2024-03-05T10:00:00+02:00", now()),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("2024-03-05_1030", now()), Some(day(2024, 3, 5)));
    }

    #[test]
    fn test_implausible_dates_rejected() {
        assert_eq!(parse_timestamp("1850-01-01", now()), None);
        assert_eq!(parse_timestamp("2030-01-01", now()), None);
        assert_eq!(parse_timestamp("2024-13-45", now()), None);
        assert_eq!(parse_timestamp("yesterday", now()), None);
    }

    #[test]
    fn test_frontmatter_key_priority() {
        let fm = json!({"created": "2020-01-01", "updated": "2024-02-02", "title": "x"});
        let resolved = resolve_content_time("note.md", Some(&fm), "", now());
        assert_eq!(resolved, Some(day(2024, 2, 2)));

        let fm = json!({"date": ["not a date", "2023-07-07"]});
        let resolved = resolve_content_time("note.md", Some(&fm), "", now());
        assert_eq!(resolved, Some(day(2023, 7, 7)));
    }

    #[test]
    fn test_path_then_heading_then_top_lines() {
        assert_eq!(
            resolve_content_time("journal/2024-04-01.md", None, "# 2024-05-05", now()),
            Some(day(2024, 4, 1))
        );

        let body = "intro\n## 2024-01-10\nstuff\n## 2024-03-02\nmore\n## 2023-12-31\n";
        assert_eq!(
            resolve_content_time("log.md", None, body, now()),
            Some(day(2024, 3, 2))
        );

        let body = "Status report\nwritten 2022-09-09 after review\n";
        assert_eq!(
            resolve_content_time("report.md", None, body, now()),
            Some(day(2022, 9, 9))
        );
    }

    #[test]
    fn test_top_lines_limit() {
        let mut body = "filler\n".repeat(TOP_LINES);
        body.push_str("2022-09-09\n");
        assert_eq!(resolve_content_time("x.md", None, &body, now()), None);
    }

    #[test]
    fn test_future_dates_clamped() {
        let fm = json!({"event_date": "2025-09-01"});
        assert_eq!(resolve_content_time("x.md", Some(&fm), "", now()), Some(now()));
    }
}
