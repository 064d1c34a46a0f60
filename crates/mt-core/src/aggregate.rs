//! Filtering and reduction of session collections.
//!
//! Every function here is pure and total: empty inputs and zero totals give
//! zero or neutral results rather than errors. Sessions are always bucketed
//! by their start time, so a session crossing midnight counts entirely
//! toward the day it started. Nothing assumes a single active session.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::activity::ActivityType;
use crate::period::{Calendar, Period, period_interval};
use crate::session::Session;

/// Score beyond which a period leans toward one activity type.
pub const BALANCE_THRESHOLD: f64 = 10.0;

/// Daily total at which day intensity saturates (4 hours).
pub const INTENSITY_SATURATION_SECS: f64 = 4.0 * 3600.0;

#[allow(clippy::cast_precision_loss)]
fn seconds(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// Sessions that are (or are not) still running.
pub fn filter_by_activeness<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    active: bool,
) -> Vec<&'a Session> {
    sessions
        .into_iter()
        .filter(|s| s.is_active() == active)
        .collect()
}

/// Sessions of the given type; `None` keeps everything.
pub fn filter_by_type<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    activity_type: Option<ActivityType>,
) -> Vec<&'a Session> {
    sessions
        .into_iter()
        .filter(|s| activity_type.is_none_or(|t| s.activity_type() == t))
        .collect()
}

/// Sessions that started on `day` in the calendar's zone.
pub fn filter_by_day<'a, Tz: TimeZone>(
    sessions: impl IntoIterator<Item = &'a Session>,
    day: NaiveDate,
    calendar: &Calendar<Tz>,
) -> Vec<&'a Session> {
    let interval = calendar.day_interval(day);
    sessions
        .into_iter()
        .filter(|s| interval.contains(s.start_time()))
        .collect()
}

/// Sessions that started within the period containing `reference`.
pub fn filter_by_period<'a, Tz: TimeZone>(
    sessions: impl IntoIterator<Item = &'a Session>,
    period: Period,
    reference: DateTime<Utc>,
    calendar: &Calendar<Tz>,
) -> Vec<&'a Session> {
    let interval = period_interval(period, reference, calendar);
    sessions
        .into_iter()
        .filter(|s| interval.contains(s.start_time()))
        .collect()
}

/// Total duration as of `now`, optionally restricted to one type.
pub fn sum_duration<'a>(
    sessions: impl IntoIterator<Item = &'a Session>,
    activity_type: Option<ActivityType>,
    now: DateTime<Utc>,
) -> Duration {
    sessions
        .into_iter()
        .filter(|s| activity_type.is_none_or(|t| s.activity_type() == t))
        .fold(Duration::zero(), |acc, s| acc + s.duration(now))
}

/// Share of the total spent on each type, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Percentages {
    pub consuming: f64,
    pub creating: f64,
}

pub fn percentages(consuming: Duration, creating: Duration) -> Percentages {
    let total = seconds(consuming + creating);
    if total <= 0.0 {
        return Percentages {
            consuming: 0.0,
            creating: 0.0,
        };
    }
    Percentages {
        consuming: seconds(consuming) / total * 100.0,
        creating: seconds(creating) / total * 100.0,
    }
}

/// Which way a period leans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    CreatingFocus,
    ConsumingFocus,
    Balanced,
}

impl Classification {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CreatingFocus => "Creating Focus",
            Self::ConsumingFocus => "Consuming Focus",
            Self::Balanced => "Balanced",
        }
    }
}

/// Creating-minus-consuming score in `[-100, 100]` with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Balance {
    pub score: f64,
    pub classification: Classification,
}

pub fn balance(consuming: Duration, creating: Duration) -> Balance {
    let total = seconds(consuming + creating);
    let score = if total > 0.0 {
        (seconds(creating) - seconds(consuming)) / total * 100.0
    } else {
        0.0
    };
    let classification = if score > BALANCE_THRESHOLD {
        Classification::CreatingFocus
    } else if score < -BALANCE_THRESHOLD {
        Classification::ConsumingFocus
    } else {
        Classification::Balanced
    };
    Balance {
        score,
        classification,
    }
}

/// Dominant type of a day and how full it was, normalized to `[0, 1]`.
///
/// Mapping intensity to a color or opacity is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayIntensity {
    pub dominant: Option<ActivityType>,
    pub intensity: f64,
}

pub fn day_color_intensity(consuming: Duration, creating: Duration) -> DayIntensity {
    let total = seconds(consuming + creating);
    if total <= 0.0 {
        return DayIntensity {
            dominant: None,
            intensity: 0.0,
        };
    }
    // Ties go to creating.
    let dominant = if creating >= consuming {
        ActivityType::Creating
    } else {
        ActivityType::Consuming
    };
    DayIntensity {
        dominant: Some(dominant),
        intensity: (total / INTENSITY_SATURATION_SECS).min(1.0),
    }
}

/// Consuming and creating durations reduced from a set of sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub consuming: Duration,
    pub creating: Duration,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            consuming: Duration::zero(),
            creating: Duration::zero(),
        }
    }
}

impl Totals {
    pub fn from_sessions<'a>(
        sessions: impl IntoIterator<Item = &'a Session>,
        now: DateTime<Utc>,
    ) -> Self {
        sessions.into_iter().fold(Self::default(), |mut totals, s| {
            match s.activity_type() {
                ActivityType::Consuming => totals.consuming += s.duration(now),
                ActivityType::Creating => totals.creating += s.duration(now),
            }
            totals
        })
    }

    pub const fn get(&self, activity_type: ActivityType) -> Duration {
        match activity_type {
            ActivityType::Consuming => self.consuming,
            ActivityType::Creating => self.creating,
        }
    }

    pub fn total(&self) -> Duration {
        self.consuming + self.creating
    }

    pub fn is_empty(&self) -> bool {
        self.total() <= Duration::zero()
    }

    pub fn percentages(&self) -> Percentages {
        percentages(self.consuming, self.creating)
    }

    pub fn balance(&self) -> Balance {
        balance(self.consuming, self.creating)
    }

    pub fn day_intensity(&self) -> DayIntensity {
        day_color_intensity(self.consuming, self.creating)
    }
}

/// Per-day totals for each of `days`, e.g. the cells of a month grid.
pub fn totals_by_day<Tz: TimeZone>(
    sessions: &[&Session],
    days: &[NaiveDate],
    calendar: &Calendar<Tz>,
    now: DateTime<Utc>,
) -> Vec<(NaiveDate, Totals)> {
    days.iter()
        .map(|&day| {
            let on_day = filter_by_day(sessions.iter().copied(), day, calendar);
            (day, Totals::from_sessions(on_day, now))
        })
        .collect()
}
