//! The tracked session entity and its state transitions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::activity::ActivityType;
use crate::types::SessionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {id} ends at {end_time} before it starts at {start_time}")]
    EndBeforeStart {
        id: SessionId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    },
}

/// One timed interval of consuming or creating activity.
///
/// A session is active until [`Session::stop`] is called. Activeness is not
/// stored separately: it is derived from `end_time` being unset, so the two
/// can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    id: SessionId,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    activity_type: ActivityType,
    description: String,
}

impl Session {
    /// Starts a new active session now.
    pub fn new(activity_type: ActivityType, description: impl Into<String>) -> Self {
        Self::starting_at(activity_type, description, Utc::now())
    }

    /// Starts a new active session at an explicit time.
    pub fn starting_at(
        activity_type: ActivityType,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SessionId::generate(),
            start_time,
            end_time: None,
            activity_type,
            description: description.into(),
        }
    }

    /// Rebuilds a session from stored fields.
    pub fn restore(
        id: SessionId,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        activity_type: ActivityType,
        description: String,
    ) -> Result<Self, SessionError> {
        if let Some(end_time) = end_time.filter(|end| *end < start_time) {
            return Err(SessionError::EndBeforeStart {
                id,
                start_time,
                end_time,
            });
        }
        Ok(Self {
            id,
            start_time,
            end_time,
            activity_type,
            description,
        })
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub const fn activity_type(&self) -> ActivityType {
        self.activity_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub const fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// Stops the session now. See [`Session::stop_at`].
    pub fn stop(&mut self) -> bool {
        self.stop_at(Utc::now())
    }

    /// Stops the session at `now`.
    ///
    /// Only the first stop is recorded; later calls leave `end_time` alone and
    /// return `false`. A stop time earlier than the start is clamped to the
    /// start.
    pub fn stop_at(&mut self, now: DateTime<Utc>) -> bool {
        if self.end_time.is_some() {
            return false;
        }
        self.end_time = Some(now.max(self.start_time));
        true
    }

    /// Flips the activity type. Timestamps and activeness are untouched.
    pub const fn switch_activity_type(&mut self) {
        self.activity_type = self.activity_type.other();
    }

    /// Elapsed time as of `now`, or the recorded length once stopped.
    ///
    /// Never negative.
    pub fn duration(&self, now: DateTime<Utc>) -> Duration {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).max(Duration::zero())
    }
}
