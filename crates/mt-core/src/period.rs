//! Calendar periods: boundaries, navigation and the month grid.
//!
//! Every computation takes an explicit [`Calendar`] (time zone plus first
//! weekday). Instants are stored in UTC; calendar days are resolved in the
//! calendar's zone.
//!
//! # DST
//!
//! Local midnight is resolved to the earlier instant when ambiguous (fall
//! back). When midnight does not exist (spring forward) the first valid
//! local hour after it is used.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of cells in the month grid (6 rows of 7 days).
pub const GRID_CELLS: usize = 42;

/// Calendar granularity used to bucket sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Self; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown period: {0} (expected day, week, month or year)")]
pub struct UnknownPeriod(String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(UnknownPeriod(s.to_string())),
        }
    }
}

/// Navigation direction between adjacent periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// Half-open instant range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateInterval {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// Time zone and week convention for all calendar math.
#[derive(Debug, Clone)]
pub struct Calendar<Tz: TimeZone = Utc> {
    tz: Tz,
    first_weekday: Weekday,
}

impl<Tz: TimeZone> Calendar<Tz> {
    pub const fn new(tz: Tz, first_weekday: Weekday) -> Self {
        Self { tz, first_weekday }
    }

    pub const fn time_zone(&self) -> &Tz {
        &self.tz
    }

    pub const fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// The calendar day an instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Resolves a local wall-clock time to an instant.
    ///
    /// Returns `None` only if no time within three hours after `local` exists
    /// in this zone.
    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        (0..=3).find_map(|hours| {
            let candidate = local.checked_add_signed(chrono::Duration::hours(hours))?;
            self.tz
                .from_local_datetime(&candidate)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
        })
    }

    /// First instant of a calendar day.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_time(NaiveTime::MIN);
        self.resolve_local(midnight)
            .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
    }

    /// Instant range covering one calendar day.
    pub fn day_interval(&self, date: NaiveDate) -> DateInterval {
        let next = date.succ_opt().unwrap_or(NaiveDate::MAX);
        DateInterval {
            start: self.start_of_day(date),
            end: self.start_of_day(next),
        }
    }

    /// First day of the week containing `date`.
    pub fn week_start(&self, date: NaiveDate) -> NaiveDate {
        let offset = (7 + date.weekday().num_days_from_monday()
            - self.first_weekday.num_days_from_monday())
            % 7;
        date.checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(date)
    }

    /// Weekdays in display order, starting at the first weekday.
    pub fn weekdays(&self) -> [Weekday; 7] {
        let mut day = self.first_weekday;
        std::array::from_fn(|_| {
            let current = day;
            day = day.succ();
            current
        })
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn year_start(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

/// Calendar days `[first, end)` of the period containing `date`.
pub fn period_dates<Tz: TimeZone>(
    period: Period,
    date: NaiveDate,
    calendar: &Calendar<Tz>,
) -> (NaiveDate, NaiveDate) {
    let (first, end) = match period {
        Period::Day => (date, date.succ_opt()),
        Period::Week => {
            let first = calendar.week_start(date);
            (first, first.checked_add_days(Days::new(7)))
        }
        Period::Month => {
            let first = month_start(date);
            (first, first.checked_add_months(Months::new(1)))
        }
        Period::Year => {
            let first = year_start(date);
            (first, first.checked_add_months(Months::new(12)))
        }
    };
    (first, end.unwrap_or(NaiveDate::MAX))
}

/// Instant range of the period containing `reference`.
pub fn period_interval<Tz: TimeZone>(
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> DateInterval {
    let (first, end) = period_dates(period, calendar.local_date(reference), calendar);
    DateInterval {
        start: calendar.start_of_day(first),
        end: calendar.start_of_day(end),
    }
}

/// Moves `reference` one period back or forward.
///
/// Uses wall-clock arithmetic in the calendar's zone, so a month step from
/// Jan 31 lands on the last day of February. Falls back to `reference` when
/// the result cannot be represented.
pub fn advance<Tz: TimeZone>(
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
    direction: Direction,
) -> DateTime<Utc> {
    let local = reference.with_timezone(&calendar.tz).naive_local();
    let moved = match (period, direction) {
        (Period::Day, Direction::Next) => local.checked_add_days(Days::new(1)),
        (Period::Day, Direction::Previous) => local.checked_sub_days(Days::new(1)),
        (Period::Week, Direction::Next) => local.checked_add_days(Days::new(7)),
        (Period::Week, Direction::Previous) => local.checked_sub_days(Days::new(7)),
        (Period::Month, Direction::Next) => local.checked_add_months(Months::new(1)),
        (Period::Month, Direction::Previous) => local.checked_sub_months(Months::new(1)),
        (Period::Year, Direction::Next) => local.checked_add_months(Months::new(12)),
        (Period::Year, Direction::Previous) => local.checked_sub_months(Months::new(12)),
    };
    moved
        .and_then(|local| calendar.resolve_local(local))
        .unwrap_or(reference)
}

/// Applies [`advance`] `offset` times; negative offsets go back.
pub fn shift<Tz: TimeZone>(
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
    offset: i32,
) -> DateTime<Utc> {
    let direction = if offset < 0 {
        Direction::Previous
    } else {
        Direction::Next
    };
    (0..offset.unsigned_abs()).fold(reference, |current, _| {
        advance(period, current, calendar, direction)
    })
}

/// The 42 consecutive days shown for the month containing `reference`.
///
/// Starts on the first weekday on or before the 1st of the month.
pub fn grid_days<Tz: TimeZone>(
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> Vec<NaiveDate> {
    let first = month_start(calendar.local_date(reference));
    calendar
        .week_start(first)
        .iter_days()
        .take(GRID_CELLS)
        .collect()
}

/// A month laid out as a fixed 6x7 grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    month: NaiveDate,
    days: Vec<NaiveDate>,
}

impl MonthGrid {
    pub fn new<Tz: TimeZone>(reference: DateTime<Utc>, calendar: &Calendar<Tz>) -> Self {
        Self {
            month: month_start(calendar.local_date(reference)),
            days: grid_days(reference, calendar),
        }
    }

    /// First day of the displayed month.
    pub const fn month(&self) -> NaiveDate {
        self.month
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Rows of seven days.
    pub fn weeks(&self) -> impl Iterator<Item = &[NaiveDate]> {
        self.days.chunks(7)
    }

    /// Whether `day` belongs to the displayed month rather than padding.
    pub fn is_in_month(&self, day: NaiveDate) -> bool {
        day.year() == self.month.year() && day.month() == self.month.month()
    }
}

/// Whether `day` falls in the period selected around `selected`.
pub fn is_selected<Tz: TimeZone>(
    day: NaiveDate,
    period: Period,
    selected: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> bool {
    let (first, end) = period_dates(period, calendar.local_date(selected), calendar);
    first <= day && day < end
}

/// Header text for the period containing `reference`.
pub fn describe<Tz: TimeZone>(
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> String {
    let date = calendar.local_date(reference);
    match period {
        Period::Day => date.format("%A, %b %-d, %Y").to_string(),
        Period::Week => {
            let (first, end) = period_dates(Period::Week, date, calendar);
            let last = end.pred_opt().unwrap_or(end);
            let (first, last) = (first.format("%b %-d"), last.format("%b %-d"));
            format!("Week: {first} - {last}")
        }
        Period::Month => date.format("%B %Y").to_string(),
        Period::Year => date.format("%Y").to_string(),
    }
}
