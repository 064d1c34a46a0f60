//! Status command: running sessions, today's totals and recent history.

use std::fmt::Display;
use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use mt_core::aggregate::{filter_by_activeness, filter_by_period};
use mt_core::period::describe;
use mt_core::{
    Calendar, HistoryRange, Period, Session, Totals, format_duration, format_running_time, history,
};

use super::report::write_totals;

const RECENT_LIMIT: usize = 5;

/// Formats the status screen for `sessions` as seen at `now`.
pub fn format_status<Tz>(
    sessions: &[Session],
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut output = String::new();
    let local_time = |instant: DateTime<Utc>, fmt: &str| {
        instant
            .with_timezone(calendar.time_zone())
            .format(fmt)
            .to_string()
    };

    writeln!(output, "RUNNING").unwrap();
    writeln!(output, "───────").unwrap();
    let running = filter_by_activeness(sessions, true);
    if running.is_empty() {
        writeln!(output, "No session running.").unwrap();
    }
    for session in running {
        write!(
            output,
            "● {} {}  (since {}, id {})",
            session.activity_type().label(),
            format_running_time(session.duration(now)),
            local_time(session.start_time(), "%H:%M"),
            session.id().short(8)
        )
        .unwrap();
        if !session.description().is_empty() {
            write!(output, ": {}", session.description()).unwrap();
        }
        writeln!(output).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "TODAY ({})", describe(Period::Day, now, calendar)).unwrap();
    let completed = filter_by_activeness(sessions, false);
    let today = filter_by_period(completed, Period::Day, now, calendar);
    let totals = Totals::from_sessions(today, now);
    if totals.is_empty() {
        writeln!(output, "Nothing tracked today.").unwrap();
    } else {
        write_totals(&mut output, &totals);
    }

    let recent = history(sessions, None, HistoryRange::AllTime, now, calendar);
    if !recent.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "RECENT").unwrap();
        for session in recent.into_iter().take(RECENT_LIMIT) {
            writeln!(
                output,
                "{}  {:<9}  {:>7}  {}",
                local_time(session.start_time(), "%b %d %H:%M"),
                session.activity_type().label(),
                format_duration(session.duration(now)),
                session.description()
            )
            .unwrap();
        }
    }

    output
}

pub fn run<W, Tz>(
    writer: &mut W,
    sessions: &[Session],
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let output = format_status(sessions, calendar, now);
    // Recent lines may end with an empty description.
    for line in output.lines() {
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}
