//! Report command for period totals and balance.
//!
//! This module implements `mt report` for day, week, month and year periods
//! with human-readable and JSON output. Only completed sessions count.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mt_core::aggregate::{filter_by_activeness, filter_by_period, totals_by_day};
use mt_core::period::{describe, period_dates, period_interval};
use mt_core::{
    ActivityType, Balance, Calendar, Percentages, Period, Session, Totals, format_duration,
};
use mt_db::Database;
use serde::Serialize;

use super::util::progress_bar;

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    pub label: String,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    pub timezone: String,
    pub totals: Totals,
    pub session_count: usize,
    /// Per-day breakdown, filled for week reports only.
    pub days: Vec<(NaiveDate, Totals)>,
}

// ========== Report Generation ==========

/// Builds report data for the period containing `reference`.
pub fn generate_report_data<Tz: TimeZone>(
    sessions: &[Session],
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
    generated_at: DateTime<Utc>,
    timezone: String,
) -> ReportData {
    let completed = filter_by_activeness(sessions, false);
    let in_period = filter_by_period(completed, period, reference, calendar);
    let totals = Totals::from_sessions(in_period.iter().copied(), generated_at);

    let (first_day, end) = period_dates(period, calendar.local_date(reference), calendar);
    let last_day = end.pred_opt().unwrap_or(end);

    let days = if period == Period::Week {
        let week: Vec<NaiveDate> = first_day.iter_days().take(7).collect();
        totals_by_day(&in_period, &week, calendar, generated_at)
    } else {
        Vec::new()
    };

    ReportData {
        generated_at,
        period,
        label: describe(period, reference, calendar),
        first_day,
        last_day,
        timezone,
        totals,
        session_count: in_period.len(),
        days,
    }
}

/// Writes per-type durations with bars and shares, then the balance line.
pub fn write_totals(output: &mut String, totals: &Totals) {
    let percentages = totals.percentages();
    let shares = [
        (ActivityType::Consuming, percentages.consuming),
        (ActivityType::Creating, percentages.creating),
    ];
    for (activity_type, share) in shares {
        let duration = totals.get(activity_type);
        writeln!(
            output,
            "{:<10} {:>7}  {}  {share:>5.1}%",
            activity_type.label(),
            format_duration(duration),
            progress_bar(duration, totals.total())
        )
        .unwrap();
    }

    let balance = totals.balance();
    writeln!(
        output,
        "{:<10} {:>+7.1}  {}",
        "Balance",
        balance.score,
        balance.classification.label()
    )
    .unwrap();
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "MEDIA TIME: {}", data.label).unwrap();

    if data.totals.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No sessions recorded this {}.", data.period).unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'mt start creating' to begin tracking.").unwrap();
        return output;
    }

    writeln!(output).unwrap();
    write_totals(&mut output, &data.totals);

    if !data.days.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "BY DAY").unwrap();
        writeln!(output, "──────").unwrap();
        writeln!(
            output,
            "{:<10}  {:>9}  {:>9}  Balance",
            "", "Consuming", "Creating"
        )
        .unwrap();
        for (day, totals) in &data.days {
            let lean = if totals.is_empty() {
                "-"
            } else {
                totals.balance().classification.label()
            };
            writeln!(
                output,
                "{:<10}  {:>9}  {:>9}  {lean}",
                day.format("%a %b %-d").to_string(),
                format_duration(totals.consuming),
                format_duration(totals.creating)
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(
        output,
        "Total tracked:  {}",
        format_duration(data.totals.total())
    )
    .unwrap();
    writeln!(output, "Sessions:       {}", data.session_count).unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub generated_at: String,
    pub timezone: String,
    pub period: JsonPeriod,
    pub totals: JsonTotals,
    pub percentages: Percentages,
    pub balance: Balance,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<JsonDay>,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    #[serde(rename = "type")]
    pub period_type: Period,
    pub label: String,
    pub start: String,
    /// Inclusive last day of the period.
    pub last_day: String,
}

#[derive(Debug, Serialize)]
pub struct JsonTotals {
    pub consuming_secs: i64,
    pub creating_secs: i64,
    pub total_secs: i64,
    pub session_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDay {
    pub date: String,
    pub consuming_secs: i64,
    pub creating_secs: i64,
}

/// Formats report data as JSON.
pub fn format_report_json(data: &ReportData) -> Result<String> {
    let report = JsonReport {
        generated_at: data.generated_at.to_rfc3339(),
        timezone: data.timezone.clone(),
        period: JsonPeriod {
            period_type: data.period,
            label: data.label.clone(),
            start: data.first_day.format("%Y-%m-%d").to_string(),
            last_day: data.last_day.format("%Y-%m-%d").to_string(),
        },
        totals: JsonTotals {
            consuming_secs: data.totals.consuming.num_seconds(),
            creating_secs: data.totals.creating.num_seconds(),
            total_secs: data.totals.total().num_seconds(),
            session_count: data.session_count,
        },
        percentages: data.totals.percentages(),
        balance: data.totals.balance(),
        days: data
            .days
            .iter()
            .map(|(day, totals)| JsonDay {
                date: day.format("%Y-%m-%d").to_string(),
                consuming_secs: totals.consuming.num_seconds(),
                creating_secs: totals.creating.num_seconds(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    calendar: &Calendar<Tz>,
    period: Period,
    reference: DateTime<Utc>,
    json: bool,
    now: DateTime<Utc>,
) -> Result<()> {
    let interval = period_interval(period, reference, calendar);
    let sessions = db.list_sessions_in_range(interval.start, interval.end)?;
    tracing::debug!(
        session_count = sessions.len(),
        %period,
        start = %interval.start,
        end = %interval.end,
        "loaded sessions for report"
    );

    let data = generate_report_data(
        &sessions,
        period,
        reference,
        calendar,
        now,
        super::util::timezone_name(),
    );

    if json {
        writeln!(writer, "{}", format_report_json(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::util::testing::{at, completed};
    use chrono::Weekday;
    use insta::assert_snapshot;
    use mt_core::SessionStore;

    fn utc() -> Calendar {
        Calendar::new(Utc, Weekday::Mon)
    }

    fn week_sessions() -> Vec<Session> {
        vec![
            completed(
                ActivityType::Consuming,
                "Watch Youtube",
                "2025-01-27T20:00:00Z",
                "2025-01-27T21:00:00Z",
            ),
            completed(
                ActivityType::Creating,
                "Code",
                "2025-01-28T09:00:00Z",
                "2025-01-28T11:00:00Z",
            ),
            completed(
                ActivityType::Creating,
                "Write",
                "2025-01-29T09:00:00Z",
                "2025-01-29T10:00:00Z",
            ),
            completed(
                ActivityType::Consuming,
                "Games",
                "2025-01-20T20:00:00Z",
                "2025-01-20T23:00:00Z",
            ),
            Session::starting_at(ActivityType::Creating, "", at("2025-01-29T15:30:00Z")),
        ]
    }

    #[test]
    fn test_week_report_counts_completed_sessions_in_period() {
        let data = generate_report_data(
            &week_sessions(),
            Period::Week,
            at("2025-01-29T16:00:00Z"),
            &utc(),
            at("2025-01-29T16:00:00Z"),
            "UTC".to_string(),
        );

        assert_eq!(data.session_count, 3);
        assert_eq!(data.totals.consuming, chrono::Duration::hours(1));
        assert_eq!(data.totals.creating, chrono::Duration::hours(3));
        assert_eq!(data.first_day.to_string(), "2025-01-27");
        assert_eq!(data.last_day, NaiveDate::from_ymd_opt(2025, 2, 2).unwrap());
        assert_eq!(data.days.len(), 7);
    }

    #[test]
    fn test_week_report_output() {
        let data = generate_report_data(
            &week_sessions(),
            Period::Week,
            at("2025-01-29T16:00:00Z"),
            &utc(),
            at("2025-01-29T16:00:00Z"),
            "UTC".to_string(),
        );

        assert_snapshot!(format_report(&data), @r"
        MEDIA TIME: Week: Jan 27 - Feb 2

        Consuming    1h 0m  ███░░░░░░░   25.0%
        Creating     3h 0m  ████████░░   75.0%
        Balance      +50.0  Creating Focus

        BY DAY
        ──────
                    Consuming   Creating  Balance
        Mon Jan 27      1h 0m         0m  Consuming Focus
        Tue Jan 28         0m      2h 0m  Creating Focus
        Wed Jan 29         0m      1h 0m  Creating Focus
        Thu Jan 30         0m         0m  -
        Fri Jan 31         0m         0m  -
        Sat Feb 1          0m         0m  -
        Sun Feb 2          0m         0m  -

        SUMMARY
        ───────
        Total tracked:  4h 0m
        Sessions:       3
        ");
    }

    #[test]
    fn test_empty_period_output() {
        let data = generate_report_data(
            &[],
            Period::Month,
            at("2025-01-29T16:00:00Z"),
            &utc(),
            at("2025-01-29T16:00:00Z"),
            "UTC".to_string(),
        );

        assert_snapshot!(format_report(&data), @r"
        MEDIA TIME: January 2025

        No sessions recorded this month.

        Hint: Run 'mt start creating' to begin tracking.
        ");
    }

    #[test]
    fn test_day_report_json_output() {
        let data = generate_report_data(
            &week_sessions(),
            Period::Day,
            at("2025-01-28T12:00:00Z"),
            &utc(),
            at("2025-01-29T16:00:00Z"),
            "UTC".to_string(),
        );

        assert_snapshot!(format_report_json(&data).unwrap(), @r#"
        {
          "generated_at": "2025-01-29T16:00:00+00:00",
          "timezone": "UTC",
          "period": {
            "type": "day",
            "label": "Tuesday, Jan 28, 2025",
            "start": "2025-01-28",
            "last_day": "2025-01-28"
          },
          "totals": {
            "consuming_secs": 0,
            "creating_secs": 7200,
            "total_secs": 7200,
            "session_count": 1
          },
          "percentages": {
            "consuming": 0.0,
            "creating": 100.0
          },
          "balance": {
            "score": 100.0,
            "classification": "creating_focus"
          }
        }
        "#);
    }

    #[test]
    fn test_run_reads_period_from_database() {
        let mut db = Database::open_in_memory().unwrap();
        for session in week_sessions() {
            db.insert(&session).unwrap();
        }
        let mut out = Vec::new();

        run(
            &mut out,
            &db,
            &utc(),
            Period::Week,
            at("2025-01-21T12:00:00Z"),
            false,
            at("2025-01-29T16:00:00Z"),
        )
        .unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.starts_with("MEDIA TIME: Week: Jan 20 - Jan 26\n"));
        assert!(output.contains("Consuming    3h 0m  ██████████  100.0%"));
        assert!(output.contains("Sessions:       1"));
    }

    #[test]
    fn test_json_period_names_its_inclusive_last_day() {
        let data = generate_report_data(
            &week_sessions(),
            Period::Week,
            at("2025-01-21T12:00:00Z"),
            &utc(),
            at("2025-01-29T16:00:00Z"),
            "UTC".to_string(),
        );

        let json: serde_json::Value =
            serde_json::from_str(&format_report_json(&data).unwrap()).unwrap();
        assert_eq!(json["period"]["start"], "2025-01-20");
        assert_eq!(json["period"]["last_day"], "2025-01-26");
        assert!(json["period"].get("end").is_none());
        assert_eq!(json["days"].as_array().unwrap().len(), 7);
    }
}
