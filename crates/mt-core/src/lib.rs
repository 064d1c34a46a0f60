//! Core domain logic for media time.
//!
//! This crate contains the fundamental types and logic for:
//! - Sessions: timed intervals of consuming or creating activity
//! - Aggregation: totals, percentages, balance and per-day intensity
//! - Periods: calendar boundaries, navigation and the month grid
//! - Tracking: the start/stop/switch lifecycle and live-surface updates
//!
//! Nothing here performs I/O. Persistence sits behind [`SessionStore`] and
//! live surfaces behind [`LiveSink`].

pub mod activity;
pub mod aggregate;
pub mod format;
pub mod history;
pub mod live;
pub mod period;
pub mod quick;
pub mod session;
pub mod store;
pub mod tracker;
pub mod types;

#[cfg(test)]
mod testing;

pub use activity::{ActivityType, UnknownActivityType};
pub use aggregate::{Balance, Classification, DayIntensity, Percentages, Totals};
pub use format::{format_duration, format_running_time};
pub use history::{HistoryRange, UnknownHistoryRange, history};
pub use live::{LiveContent, LiveSink, NoopSink, SinkError};
pub use period::{Calendar, DateInterval, Direction, MonthGrid, Period, UnknownPeriod};
pub use session::{Session, SessionError};
pub use store::{MemoryStore, MemoryStoreError, SessionStore};
pub use tracker::{Outcome, SwitchPolicy, Tracker, TrackerError};
pub use types::{SessionId, ValidationError};
