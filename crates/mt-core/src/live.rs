//! Live-notification sink contract.
//!
//! A sink mirrors the running session on some external surface (a status
//! line, a lock-screen widget). The [`Tracker`](crate::Tracker) calls it on
//! every lifecycle event and on each one-second tick. Sink failures never
//! abort a lifecycle operation: the tracker logs them and hands them back as
//! warnings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::format::format_running_time;
use crate::session::Session;

/// Why a sink could not mirror an event.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The surface is unavailable or disabled (e.g. turned off in settings).
    #[error("live surface unavailable: {0}")]
    Unavailable(String),
    /// The surface refused the request.
    #[error("live surface rejected request: {0}")]
    Rejected(String),
    #[error("live surface I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receiver of session lifecycle events.
///
/// Implementations must tolerate `on_stop` for a session they never saw
/// started, and repeated `on_stop` calls for the same session.
pub trait LiveSink {
    fn on_start(&self, session: &Session) -> Result<(), SinkError>;

    fn on_stop(&self, session: &Session) -> Result<(), SinkError>;

    fn on_switch(&self, session: &Session) -> Result<(), SinkError>;

    /// Called once per second while exactly one session is active.
    fn on_tick(&self, session: &Session, running_time: &str) -> Result<(), SinkError>;
}

/// A sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LiveSink for NoopSink {
    fn on_start(&self, _session: &Session) -> Result<(), SinkError> {
        Ok(())
    }

    fn on_stop(&self, _session: &Session) -> Result<(), SinkError> {
        Ok(())
    }

    fn on_switch(&self, _session: &Session) -> Result<(), SinkError> {
        Ok(())
    }

    fn on_tick(&self, _session: &Session, _running_time: &str) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: LiveSink + ?Sized> LiveSink for &S {
    fn on_start(&self, session: &Session) -> Result<(), SinkError> {
        (**self).on_start(session)
    }

    fn on_stop(&self, session: &Session) -> Result<(), SinkError> {
        (**self).on_stop(session)
    }

    fn on_switch(&self, session: &Session) -> Result<(), SinkError> {
        (**self).on_switch(session)
    }

    fn on_tick(&self, session: &Session, running_time: &str) -> Result<(), SinkError> {
        (**self).on_tick(session, running_time)
    }
}

/// The state a live surface displays for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveContent {
    /// Stable key for the surface entry, `"<Label>-<unix seconds>"`.
    pub key: String,
    pub activity_type: String,
    pub running_time: String,
    pub start_time: DateTime<Utc>,
    pub description: String,
}

impl LiveContent {
    /// Content for `session` as of `now`.
    pub fn snapshot(session: &Session, now: DateTime<Utc>) -> Self {
        Self::with_running_time(session, format_running_time(session.duration(now)))
    }

    pub fn with_running_time(session: &Session, running_time: String) -> Self {
        let label = session.activity_type().label();
        Self {
            key: format!("{label}-{}", session.start_time().timestamp()),
            activity_type: label.to_string(),
            running_time,
            start_time: session.start_time(),
            description: session.description().to_string(),
        }
    }
}
