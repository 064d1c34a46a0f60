//! Completed-session history with range and type filters.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityType;
use crate::aggregate::{filter_by_activeness, filter_by_type};
use crate::period::{Calendar, DateInterval, Period, period_interval};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HistoryRange {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    #[default]
    AllTime,
}

impl HistoryRange {
    pub const ALL: [Self; 5] = [
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::AllTime,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::ThisWeek => "this-week",
            Self::ThisMonth => "this-month",
            Self::AllTime => "all-time",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::ThisMonth => "This Month",
            Self::AllTime => "All Time",
        }
    }

    /// Start-time window for this range as of `now`; `None` means unbounded.
    ///
    /// The current week and month end at `now`, not at the period boundary.
    pub fn interval<Tz: TimeZone>(
        self,
        now: DateTime<Utc>,
        calendar: &Calendar<Tz>,
    ) -> Option<DateInterval> {
        let today = calendar.local_date(now);
        match self {
            Self::Today => Some(calendar.day_interval(today)),
            Self::Yesterday => today.pred_opt().map(|day| calendar.day_interval(day)),
            Self::ThisWeek => Some(DateInterval {
                start: period_interval(Period::Week, now, calendar).start,
                end: now,
            }),
            Self::ThisMonth => Some(DateInterval {
                start: period_interval(Period::Month, now, calendar).start,
                end: now,
            }),
            Self::AllTime => None,
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error(
    "unknown history range: {0} (expected today, yesterday, this-week, this-month or all-time)"
)]
pub struct UnknownHistoryRange(String);

impl FromStr for HistoryRange {
    type Err = UnknownHistoryRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        Self::ALL
            .into_iter()
            .find(|range| range.as_str() == normalized)
            .ok_or_else(|| UnknownHistoryRange(s.to_string()))
    }
}

/// Completed sessions in `range`, optionally of one type, newest first.
pub fn history<'a, Tz: TimeZone>(
    sessions: impl IntoIterator<Item = &'a Session>,
    activity_type: Option<ActivityType>,
    range: HistoryRange,
    now: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> Vec<&'a Session> {
    let interval = range.interval(now, calendar);
    let completed = filter_by_activeness(sessions, false);
    let mut matching: Vec<&Session> = filter_by_type(completed, activity_type)
        .into_iter()
        .filter(|s| interval.is_none_or(|i| i.contains(s.start_time())))
        .collect();
    matching.sort_by_key(|session| Reverse(session.start_time()));
    matching
}
