//! Session lifecycle coordination.
//!
//! [`Tracker`] ties the entity, the store and the live sink together: every
//! start, stop and switch mutates a [`Session`], persists it, then informs
//! the sink. Sink failures come back as [`Outcome::warning`] and never fail
//! the operation.
//!
//! The surrounding application is expected to keep at most one session
//! active. The tracker does not enforce this; [`Tracker::tick_at`] simply
//! stays quiet unless exactly one session is running.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::ActivityType;
use crate::format::format_running_time;
use crate::live::{LiveSink, SinkError};
use crate::session::Session;
use crate::store::SessionStore;
use crate::types::SessionId;

/// Whether stopped sessions may change activity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchPolicy {
    /// Any session may be switched, running or not.
    #[default]
    Any,
    /// Only running sessions may be switched.
    ActiveOnly,
}

#[derive(Debug, Error)]
pub enum TrackerError<E> {
    #[error("session store error: {0}")]
    Store(#[source] E),
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("no active session")]
    NoActiveSession,
    #[error("session {0} is stopped and only active sessions can be switched")]
    SwitchStopped(SessionId),
}

/// Result of a lifecycle operation plus any non-fatal sink failure.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: T,
    pub warning: Option<SinkError>,
}

impl<T> Outcome<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

pub struct Tracker<S, K> {
    store: S,
    sink: K,
    switch_policy: SwitchPolicy,
}

impl<S, K> Tracker<S, K>
where
    S: SessionStore,
    K: LiveSink,
{
    pub const fn new(store: S, sink: K) -> Self {
        Self {
            store,
            sink,
            switch_policy: SwitchPolicy::Any,
        }
    }

    #[must_use]
    pub const fn with_switch_policy(mut self, switch_policy: SwitchPolicy) -> Self {
        self.switch_policy = switch_policy;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub const fn sink(&self) -> &K {
        &self.sink
    }

    /// All sessions in insertion order.
    pub fn sessions(&self) -> Result<Vec<Session>, TrackerError<S::Error>> {
        self.store.sessions().map_err(TrackerError::Store)
    }

    pub fn active_sessions(&self) -> Result<Vec<Session>, TrackerError<S::Error>> {
        self.store.active_sessions().map_err(TrackerError::Store)
    }

    pub fn start(
        &mut self,
        activity_type: ActivityType,
        description: &str,
    ) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        self.start_at(activity_type, description, Utc::now())
    }

    /// Creates an active session starting at `now` and stores it.
    pub fn start_at(
        &mut self,
        activity_type: ActivityType,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        let session = Session::starting_at(activity_type, description, now);
        self.store.insert(&session).map_err(TrackerError::Store)?;
        tracing::debug!(session_id = %session.id(), %activity_type, "session started");

        let warning = notify("start", &session, self.sink.on_start(&session));
        Ok(Outcome {
            value: session,
            warning,
        })
    }

    pub fn stop(&mut self, id: &SessionId) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        self.stop_at(id, Utc::now())
    }

    /// Stops a session at `now`.
    ///
    /// Stopping an already stopped session keeps its first end time. The
    /// sink is still told, since it must tolerate redundant stops.
    pub fn stop_at(
        &mut self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        let mut session = self.require(id)?;
        if session.stop_at(now) {
            self.store.update(&session).map_err(TrackerError::Store)?;
            tracing::debug!(
                session_id = %session.id(),
                duration_secs = session.duration(now).num_seconds(),
                "session stopped"
            );
        } else {
            tracing::warn!(
                session_id = %session.id(),
                "session already stopped; keeping first end time"
            );
        }

        let warning = notify("stop", &session, self.sink.on_stop(&session));
        Ok(Outcome {
            value: session,
            warning,
        })
    }

    pub fn stop_active(&mut self) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        self.stop_active_at(Utc::now())
    }

    /// Stops the earliest-inserted active session.
    pub fn stop_active_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        let id = self.first_active()?;
        self.stop_at(&id, now)
    }

    /// Flips a session's activity type.
    pub fn switch(&mut self, id: &SessionId) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        let mut session = self.require(id)?;
        if self.switch_policy == SwitchPolicy::ActiveOnly && !session.is_active() {
            return Err(TrackerError::SwitchStopped(session.id().clone()));
        }

        session.switch_activity_type();
        self.store.update(&session).map_err(TrackerError::Store)?;
        tracing::debug!(
            session_id = %session.id(),
            activity_type = %session.activity_type(),
            "session switched"
        );

        let warning = notify("switch", &session, self.sink.on_switch(&session));
        Ok(Outcome {
            value: session,
            warning,
        })
    }

    /// Flips the activity type of the earliest-inserted active session.
    pub fn switch_active(&mut self) -> Result<Outcome<Session>, TrackerError<S::Error>> {
        let id = self.first_active()?;
        self.switch(&id)
    }

    /// Sends the running time of the single active session to the sink.
    ///
    /// Returns the text sent, or `None` when zero or several sessions are
    /// active. Never mutates a session.
    pub fn tick_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Outcome<Option<String>>, TrackerError<S::Error>> {
        let active = self.active_sessions()?;
        let [session] = active.as_slice() else {
            tracing::trace!(active = active.len(), "tick skipped");
            return Ok(Outcome {
                value: None,
                warning: None,
            });
        };

        let running_time = format_running_time(session.duration(now));
        let warning = notify("tick", session, self.sink.on_tick(session, &running_time));
        Ok(Outcome {
            value: Some(running_time),
            warning,
        })
    }

    fn require(&self, id: &SessionId) -> Result<Session, TrackerError<S::Error>> {
        self.store
            .get(id)
            .map_err(TrackerError::Store)?
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }

    fn first_active(&self) -> Result<SessionId, TrackerError<S::Error>> {
        self.active_sessions()?
            .into_iter()
            .next()
            .map(|s| s.id().clone())
            .ok_or(TrackerError::NoActiveSession)
    }
}

fn notify(
    event: &'static str,
    session: &Session,
    result: Result<(), SinkError>,
) -> Option<SinkError> {
    match result {
        Ok(()) => None,
        Err(err) => {
            tracing::warn!(session_id = %session.id(), event, error = %err, "live sink failed");
            Some(err)
        }
    }
}
