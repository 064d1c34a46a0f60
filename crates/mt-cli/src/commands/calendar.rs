//! Calendar command: a month grid marked with each day's dominant activity.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use mt_core::aggregate::{filter_by_activeness, totals_by_day};
use mt_core::period::is_selected;
use mt_core::{ActivityType, Calendar, MonthGrid, Period, Session, Totals};
use mt_db::Database;
use serde::Serialize;

use super::report::write_totals;

/// One grid cell with its day's totals.
#[derive(Debug, Clone, Copy)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub selected: bool,
    pub totals: Totals,
}

#[derive(Debug)]
pub struct CalendarData {
    pub month: NaiveDate,
    pub weekdays: [Weekday; 7],
    pub days: Vec<CalendarDay>,
    /// Totals over in-month days only.
    pub totals: Totals,
}

/// Builds the grid for the month containing `reference`.
///
/// Days in the `selection` period around `reference` are marked selected.
pub fn generate_calendar_data<Tz: TimeZone>(
    sessions: &[Session],
    reference: DateTime<Utc>,
    selection: Period,
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> CalendarData {
    let grid = MonthGrid::new(reference, calendar);
    let completed = filter_by_activeness(sessions, false);
    let days: Vec<CalendarDay> = totals_by_day(&completed, grid.days(), calendar, now)
        .into_iter()
        .map(|(date, totals)| CalendarDay {
            date,
            in_month: grid.is_in_month(date),
            selected: is_selected(date, selection, reference, calendar),
            totals,
        })
        .collect();

    let totals = days
        .iter()
        .filter(|day| day.in_month)
        .fold(Totals::default(), |acc, day| Totals {
            consuming: acc.consuming + day.totals.consuming,
            creating: acc.creating + day.totals.creating,
        });

    CalendarData {
        month: grid.month(),
        weekdays: calendar.weekdays(),
        days,
        totals,
    }
}

const fn mark(dominant: Option<ActivityType>) -> char {
    match dominant {
        Some(ActivityType::Creating) => '+',
        Some(ActivityType::Consuming) => '-',
        None => ' ',
    }
}

const fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mo",
        Weekday::Tue => "Tu",
        Weekday::Wed => "We",
        Weekday::Thu => "Th",
        Weekday::Fri => "Fr",
        Weekday::Sat => "Sa",
        Weekday::Sun => "Su",
    }
}

pub fn format_calendar(data: &CalendarData) -> String {
    let mut output = String::new();

    writeln!(output, "{}", data.month.format("%B %Y")).unwrap();
    let mut header = String::new();
    for weekday in data.weekdays {
        write!(header, " {:<3} ", weekday_abbrev(weekday)).unwrap();
    }
    writeln!(output, "{}", header.trim_end()).unwrap();

    for week in data.days.chunks(7) {
        if !week.iter().any(|day| day.in_month) {
            continue;
        }
        let mut line = String::new();
        for day in week {
            if !day.in_month {
                line.push_str("     ");
                continue;
            }
            let number = day.date.day();
            let marker = mark(day.totals.day_intensity().dominant);
            if day.selected {
                write!(line, "[{number:>2}{marker}]").unwrap();
            } else {
                write!(line, " {number:>2}{marker} ").unwrap();
            }
        }
        writeln!(output, "{}", line.trim_end()).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "+ creating   - consuming   [ ] selected").unwrap();

    writeln!(output).unwrap();
    if data.totals.is_empty() {
        writeln!(output, "No sessions recorded this month.").unwrap();
    } else {
        write_totals(&mut output, &data.totals);
    }

    output
}

#[derive(Debug, Serialize)]
pub struct JsonCalendar {
    pub month: String,
    pub first_weekday: String,
    pub consuming_secs: i64,
    pub creating_secs: i64,
    pub days: Vec<JsonCalendarDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonCalendarDay {
    pub date: String,
    pub in_month: bool,
    pub selected: bool,
    pub consuming_secs: i64,
    pub creating_secs: i64,
    pub dominant: Option<ActivityType>,
    pub intensity: f64,
}

pub fn format_calendar_json(data: &CalendarData) -> Result<String> {
    let calendar = JsonCalendar {
        month: data.month.format("%Y-%m").to_string(),
        first_weekday: data.weekdays[0].to_string(),
        consuming_secs: data.totals.consuming.num_seconds(),
        creating_secs: data.totals.creating.num_seconds(),
        days: data
            .days
            .iter()
            .map(|day| {
                let intensity = day.totals.day_intensity();
                JsonCalendarDay {
                    date: day.date.format("%Y-%m-%d").to_string(),
                    in_month: day.in_month,
                    selected: day.selected,
                    consuming_secs: day.totals.consuming.num_seconds(),
                    creating_secs: day.totals.creating.num_seconds(),
                    dominant: intensity.dominant,
                    intensity: intensity.intensity,
                }
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&calendar)?)
}

pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    calendar: &Calendar<Tz>,
    reference: DateTime<Utc>,
    selection: Period,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let grid = MonthGrid::new(reference, calendar);
    let (start, end) = match (grid.days().first(), grid.days().last()) {
        (Some(&first), Some(&last)) => (
            calendar.start_of_day(first),
            calendar.day_interval(last).end,
        ),
        _ => return Ok(()),
    };
    let sessions = db.list_sessions_in_range(start, end)?;
    tracing::debug!(
        session_count = sessions.len(),
        month = %grid.month(),
        "loaded sessions for calendar"
    );

    let data = generate_calendar_data(&sessions, reference, selection, calendar, now);
    let output = if json {
        format_calendar_json(&data)?
    } else {
        format_calendar(&data)
    };
    write!(writer, "{output}")?;
    if json {
        writeln!(writer)?;
    }
    Ok(())
}
