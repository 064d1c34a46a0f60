//! Switch command.

use std::io::Write;

use anyhow::Result;
use mt_core::{LiveSink, SessionStore, Tracker};

use super::util::{print_sink_warning, resolve_session};

/// Flips the activity type of the session matching `id`, or of the running one.
pub fn run<W, S, K>(writer: &mut W, tracker: &mut Tracker<S, K>, id: Option<&str>) -> Result<()>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    let outcome = match id {
        Some(query) => {
            let sessions = tracker.sessions()?;
            let target = resolve_session(&sessions, query)?.id().clone();
            tracker.switch(&target)?
        }
        None => tracker.switch_active()?,
    };
    print_sink_warning(writer, outcome.warning.as_ref())?;
    let session = outcome.into_value();

    writeln!(
        writer,
        "Switched session {} to {}",
        session.id().short(8),
        session.activity_type()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::util::testing::{at, completed};
    use mt_core::{ActivityType, MemoryStore, NoopSink, SwitchPolicy};

    #[test]
    fn switches_running_session() {
        let mut tracker = Tracker::new(MemoryStore::new(), NoopSink);
        let session = tracker
            .start_at(ActivityType::Consuming, "", at("2025-01-29T10:00:00Z"))
            .unwrap()
            .into_value();
        let mut out = Vec::new();

        run(&mut out, &mut tracker, None).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("Switched session {} to creating\n", session.id().short(8))
        );
    }

    #[test]
    fn active_only_policy_rejects_stopped_session() {
        let mut store = MemoryStore::new();
        let done = completed(
            ActivityType::Consuming,
            "",
            "2025-01-29T10:00:00Z",
            "2025-01-29T11:00:00Z",
        );
        store.insert(&done).unwrap();
        let mut tracker =
            Tracker::new(store, NoopSink).with_switch_policy(SwitchPolicy::ActiveOnly);

        let err = run(&mut Vec::new(), &mut tracker, Some(done.id().as_str())).unwrap_err();

        assert!(err.to_string().contains("only active sessions"));
        let stored = tracker.sessions().unwrap();
        assert_eq!(stored[0].activity_type(), ActivityType::Consuming);
    }
}
