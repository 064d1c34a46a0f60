//! History command: completed sessions, newest first.

use std::fmt::Display;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use mt_core::{ActivityType, Calendar, HistoryRange, Session, Totals, format_duration, history};
use serde::Serialize;

use super::report::write_totals;

pub fn format_history<Tz>(
    sessions: &[&Session],
    range: HistoryRange,
    activity_type: Option<ActivityType>,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut output = String::new();
    let local = |instant: DateTime<Utc>| instant.with_timezone(calendar.time_zone());

    write!(output, "HISTORY: {}", range.label()).unwrap();
    if let Some(activity_type) = activity_type {
        write!(output, " ({})", activity_type.label()).unwrap();
    }
    writeln!(output).unwrap();
    writeln!(output).unwrap();

    if sessions.is_empty() {
        writeln!(output, "No sessions found.").unwrap();
        return output;
    }

    for session in sessions {
        let start = local(session.start_time());
        let end = session.end_time().map_or_else(
            || "now".to_string(),
            |end| local(end).format("%H:%M").to_string(),
        );
        let mut line = format!(
            "{}  {}-{:<5}  {:<9}  {:>7}",
            start.format("%a %b %d"),
            start.format("%H:%M"),
            end,
            session.activity_type().label(),
            format_duration(session.duration(now))
        );
        if !session.description().is_empty() {
            write!(line, "  {}", session.description()).unwrap();
        }
        writeln!(output, "{line}").unwrap();
    }

    writeln!(output).unwrap();
    let totals = Totals::from_sessions(sessions.iter().copied(), now);
    write_totals(&mut output, &totals);
    writeln!(output, "Sessions:  {}", sessions.len()).unwrap();

    output
}

#[derive(Debug, Serialize)]
pub struct JsonHistoryEntry {
    pub id: String,
    pub activity_type: ActivityType,
    pub description: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub duration_secs: i64,
}

pub fn format_history_json(sessions: &[&Session], now: DateTime<Utc>) -> Result<String> {
    let entries: Vec<JsonHistoryEntry> = sessions
        .iter()
        .map(|session| JsonHistoryEntry {
            id: session.id().to_string(),
            activity_type: session.activity_type(),
            description: session.description().to_string(),
            start_time: session.start_time().to_rfc3339(),
            end_time: session.end_time().map(|end| end.to_rfc3339()),
            duration_secs: session.duration(now).num_seconds(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn run<W, Tz>(
    writer: &mut W,
    sessions: &[Session],
    range: HistoryRange,
    activity_type: Option<ActivityType>,
    calendar: &Calendar<Tz>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let matching = history(sessions, activity_type, range, now, calendar);
    tracing::debug!(
        range = %range,
        matched = matching.len(),
        "filtered history"
    );

    if json {
        writeln!(writer, "{}", format_history_json(&matching, now)?)?;
    } else {
        write!(
            writer,
            "{}",
            format_history(&matching, range, activity_type, calendar, now)
        )?;
    }
    Ok(())
}
