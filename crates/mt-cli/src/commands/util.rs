//! Shared utilities for CLI commands.

use std::io::{self, Write};
use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use mt_core::period::shift;
use mt_core::{Calendar, Period, Session, SinkError};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").expect("valid relative time regex")
});

/// Conservative bounds for relative time parsing (~1000 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 1000 * 365 * 24 * 60;

/// Parse a reference date as a calendar day, RFC 3339 instant or relative time.
///
/// Supports:
/// - Keywords: "today", "yesterday"
/// - Calendar day: "2026-01-15" (start of that day in the calendar's zone)
/// - RFC 3339: "2026-01-15T10:30:00Z"
/// - Relative: "2 hours ago", "30 minutes ago", "1 day ago", "1 week ago"
pub fn parse_date<Tz: TimeZone>(
    s: &str,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> anyhow::Result<DateTime<Utc>> {
    let s = s.trim();
    match s.to_ascii_lowercase().as_str() {
        "today" | "now" => return Ok(now),
        "yesterday" => return Ok(now - Duration::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(calendar.start_of_day(date));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try relative time: "N hours/minutes/days/weeks ago"
    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD, RFC 3339 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Reference instant for a period view: `date` (or `now`) moved by `offset` periods.
pub fn resolve_reference<Tz: TimeZone>(
    date: Option<&str>,
    period: Period,
    offset: i32,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> anyhow::Result<DateTime<Utc>> {
    let base = match date {
        Some(date) => parse_date(date, calendar, now)?,
        None => now,
    };
    Ok(shift(period, base, calendar, offset))
}

/// Finds a session by full ID or unique ID prefix.
pub fn resolve_session<'a>(sessions: &'a [Session], query: &str) -> anyhow::Result<&'a Session> {
    let query = query.trim();
    if query.is_empty() {
        anyhow::bail!("session ID must not be empty");
    }
    if let Some(exact) = sessions.iter().find(|s| s.id().as_str() == query) {
        return Ok(exact);
    }

    let mut matches = sessions
        .iter()
        .filter(|s| s.id().as_str().starts_with(query));
    match (matches.next(), matches.next()) {
        (Some(found), None) => Ok(found),
        (None, _) => anyhow::bail!("no session matches '{query}'"),
        (Some(_), Some(_)) => {
            anyhow::bail!("'{query}' matches several sessions; use a longer prefix")
        }
    }
}

/// Tells the user a live update could not be shown. The command itself succeeded.
pub fn print_sink_warning<W: Write>(writer: &mut W, warning: Option<&SinkError>) -> io::Result<()> {
    if let Some(err) = warning {
        writeln!(writer, "Note: live update failed: {err}")?;
    }
    Ok(())
}

/// Local time zone name for report headers.
pub fn timezone_name() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: Duration, max: Duration) -> String {
    let value = value.num_seconds().max(0);
    let max = max.num_seconds();
    if max <= 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
