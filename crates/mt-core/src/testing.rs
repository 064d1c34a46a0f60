//! Fixtures shared by unit tests.

use std::cell::RefCell;

use chrono::{DateTime, Utc};

use crate::activity::ActivityType;
use crate::live::{LiveSink, SinkError};
use crate::session::Session;

pub fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC 3339 timestamp")
        .with_timezone(&Utc)
}

/// A session between two RFC 3339 timestamps; `end = None` leaves it active.
pub fn session(activity_type: ActivityType, start: &str, end: Option<&str>) -> Session {
    let mut session = Session::starting_at(activity_type, "", at(start));
    if let Some(end) = end {
        session.stop_at(at(end));
    }
    session
}

pub fn stopped(activity_type: ActivityType, start: &str, end: &str) -> Session {
    session(activity_type, start, Some(end))
}

/// Records every call as `"<event> <session id>[ <running time>]"`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: RefCell<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    fn record(&self, event: String) {
        self.events.borrow_mut().push(event);
    }
}

impl LiveSink for RecordingSink {
    fn on_start(&self, session: &Session) -> Result<(), SinkError> {
        self.record(format!("start {}", session.id()));
        Ok(())
    }

    fn on_stop(&self, session: &Session) -> Result<(), SinkError> {
        self.record(format!("stop {}", session.id()));
        Ok(())
    }

    fn on_switch(&self, session: &Session) -> Result<(), SinkError> {
        self.record(format!("switch {}", session.id()));
        Ok(())
    }

    fn on_tick(&self, session: &Session, running_time: &str) -> Result<(), SinkError> {
        self.record(format!("tick {} {running_time}", session.id()));
        Ok(())
    }
}

/// Fails every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

impl LiveSink for FailingSink {
    fn on_start(&self, _session: &Session) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("disabled".into()))
    }

    fn on_stop(&self, _session: &Session) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("disabled".into()))
    }

    fn on_switch(&self, _session: &Session) -> Result<(), SinkError> {
        Err(SinkError::Rejected("busy".into()))
    }

    fn on_tick(&self, _session: &Session, _running_time: &str) -> Result<(), SinkError> {
        Err(SinkError::Unavailable("disabled".into()))
    }
}
