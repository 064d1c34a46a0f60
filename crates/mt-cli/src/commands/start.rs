//! Start and quick-start commands.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use mt_core::{ActivityType, LiveSink, SessionStore, Tracker, quick};

use super::util::print_sink_warning;

/// Starts a session, stopping anything still running first.
pub fn run<W, S, K>(
    writer: &mut W,
    tracker: &mut Tracker<S, K>,
    activity_type: ActivityType,
    description: &str,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    for running in tracker.active_sessions()? {
        let stopped = tracker.stop_at(running.id(), now)?;
        print_sink_warning(writer, stopped.warning.as_ref())?;
        writeln!(
            writer,
            "Stopped {} session {}",
            running.activity_type(),
            running.id().short(8)
        )?;
    }

    let outcome = tracker.start_at(activity_type, description, now)?;
    print_sink_warning(writer, outcome.warning.as_ref())?;
    let session = outcome.into_value();

    if session.description().is_empty() {
        writeln!(
            writer,
            "Started {activity_type} session {}",
            session.id().short(8)
        )?;
    } else {
        writeln!(
            writer,
            "Started {activity_type} session {}: {}",
            session.id().short(8),
            session.description()
        )?;
    }
    Ok(())
}

/// Starts a preset session, or lists presets when `title` is `None`.
pub fn quick<W, S, K>(
    writer: &mut W,
    tracker: &mut Tracker<S, K>,
    title: Option<&str>,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    let Some(title) = title else {
        writeln!(writer, "Quick start presets:")?;
        for preset in &quick::PRESETS {
            writeln!(
                writer,
                "  {:<14} {:<10} {}",
                preset.title,
                preset.activity_type.as_str(),
                preset.description
            )?;
        }
        return Ok(());
    };

    let Some(preset) = quick::find(title) else {
        anyhow::bail!(
            "no quick start preset named '{title}'. Run 'mt quick' to list presets"
        );
    };
    run(
        writer,
        tracker,
        preset.activity_type,
        preset.description,
        now,
    )
}
