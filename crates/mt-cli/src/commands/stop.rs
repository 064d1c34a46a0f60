//! Stop command.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use mt_core::{LiveSink, SessionStore, Tracker, format_duration};

use super::util::{print_sink_warning, resolve_session};

/// Stops the session matching `id`, or the running one when `id` is `None`.
pub fn run<W, S, K>(
    writer: &mut W,
    tracker: &mut Tracker<S, K>,
    id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    let (outcome, was_active) = match id {
        Some(query) => {
            let sessions = tracker.sessions()?;
            let target = resolve_session(&sessions, query)?;
            let was_active = target.is_active();
            (tracker.stop_at(target.id(), now)?, was_active)
        }
        None => (tracker.stop_active_at(now)?, true),
    };
    print_sink_warning(writer, outcome.warning.as_ref())?;
    let session = outcome.into_value();

    if !was_active {
        writeln!(
            writer,
            "Session {} was already stopped",
            session.id().short(8)
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "Stopped {} session {} after {}",
        session.activity_type(),
        session.id().short(8),
        format_duration(session.duration(now))
    )?;
    Ok(())
}
