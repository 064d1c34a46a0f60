//! Watch command: drives the live sink once per second.

use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use mt_core::{LiveSink, SessionStore, Tracker};
use tokio::time::MissedTickBehavior;

use super::util::print_sink_warning;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Why a watch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEnd {
    NoActiveSession,
    SeveralActive(usize),
    Interrupted,
    TickLimit,
}

/// Ticks the tracker every second until nothing is running, Ctrl-C, or
/// `max_ticks` ticks have been sent.
#[expect(
    clippy::future_not_send,
    reason = "driven by a current-thread runtime; sinks need not be Sync"
)]
pub async fn watch<W, S, K>(
    writer: &mut W,
    tracker: &Tracker<S, K>,
    max_ticks: Option<u64>,
) -> Result<WatchEnd>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    watch_until(writer, tracker, max_ticks, tokio::signal::ctrl_c()).await
}

/// Like [`watch`], but ends with [`WatchEnd::Interrupted`] once `shutdown`
/// completes instead of waiting for Ctrl-C.
#[expect(
    clippy::future_not_send,
    reason = "driven by a current-thread runtime; sinks need not be Sync"
)]
pub async fn watch_until<W, S, K, F>(
    writer: &mut W,
    tracker: &Tracker<S, K>,
    max_ticks: Option<u64>,
    shutdown: F,
) -> Result<WatchEnd>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
    F: Future<Output = io::Result<()>>,
{
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0_u64;
    let mut warned = false;
    // Polled across iterations so the listener is registered once.
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut shutdown => {
                result.context("failed to listen for Ctrl-C")?;
                tracing::debug!(ticks, "watch interrupted");
                return Ok(WatchEnd::Interrupted);
            }
        }

        let outcome = tracker.tick_at(Utc::now())?;
        if outcome.value.is_none() {
            let active = tracker.active_sessions()?.len();
            tracing::debug!(active, ticks, "watch finished");
            return Ok(if active == 0 {
                WatchEnd::NoActiveSession
            } else {
                WatchEnd::SeveralActive(active)
            });
        }
        // Only the first sink failure is reported.
        if outcome.warning.is_some() && !warned {
            print_sink_warning(writer, outcome.warning.as_ref())?;
            warned = true;
        }

        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            return Ok(WatchEnd::TickLimit);
        }
    }
}

pub fn run<W, S, K>(writer: &mut W, tracker: &Tracker<S, K>) -> Result<()>
where
    W: Write,
    S: SessionStore,
    K: LiveSink,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;

    match runtime.block_on(watch(writer, tracker, None))? {
        WatchEnd::NoActiveSession => writeln!(writer, "No session running.")?,
        WatchEnd::SeveralActive(count) => writeln!(
            writer,
            "{count} sessions are running. Stop all but one to watch."
        )?,
        WatchEnd::Interrupted => writeln!(writer, "Stopped watching.")?,
        WatchEnd::TickLimit => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use mt_core::{ActivityType, MemoryStore, NoopSink, Session, SinkError};

    #[derive(Default)]
    struct CountingSink {
        ticks: Cell<usize>,
        fail: bool,
    }

    impl LiveSink for CountingSink {
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
            self.ticks.set(self.ticks.get() + 1);
            if self.fail {
                return Err(SinkError::Unavailable("offline".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn ends_when_nothing_is_running() {
        let tracker = Tracker::new(MemoryStore::new(), NoopSink);
        let end = watch(&mut Vec::new(), &tracker, None).await.unwrap();
        assert_eq!(end, WatchEnd::NoActiveSession);
    }

    #[tokio::test]
    async fn ends_when_several_are_running() {
        let mut tracker = Tracker::new(MemoryStore::new(), NoopSink);
        tracker.start(ActivityType::Creating, "").unwrap();
        tracker.start(ActivityType::Consuming, "").unwrap();

        let end = watch(&mut Vec::new(), &tracker, None).await.unwrap();

        assert_eq!(end, WatchEnd::SeveralActive(2));
    }

    #[tokio::test]
    async fn ticks_the_single_running_session() {
        let mut tracker = Tracker::new(MemoryStore::new(), CountingSink::default());
        tracker.start(ActivityType::Creating, "Code").unwrap();

        let end = watch(&mut Vec::new(), &tracker, Some(2)).await.unwrap();

        assert_eq!(end, WatchEnd::TickLimit);
        assert_eq!(tracker.sink().ticks.get(), 2);
    }

    #[tokio::test]
    async fn shutdown_outlives_individual_ticks() {
        let mut tracker = Tracker::new(MemoryStore::new(), CountingSink::default());
        tracker.start(ActivityType::Creating, "Code").unwrap();
        // Longer than one tick, so it only fires if it survives the loop.
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            Ok(())
        };

        let end = watch_until(&mut Vec::new(), &tracker, None, shutdown)
            .await
            .unwrap();

        assert_eq!(end, WatchEnd::Interrupted);
        assert_eq!(tracker.sink().ticks.get(), 2);
    }

    #[tokio::test]
    async fn shutdown_error_is_propagated() {
        let mut tracker = Tracker::new(MemoryStore::new(), NoopSink);
        tracker.start(ActivityType::Creating, "").unwrap();
        let shutdown = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Err(io::Error::other("no signal handler"))
        };

        let err = watch_until(&mut Vec::new(), &tracker, None, shutdown)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Ctrl-C"), "{err}");
    }

    #[tokio::test]
    async fn sink_failure_is_reported_once() {
        let sink = CountingSink {
            fail: true,
            ..CountingSink::default()
        };
        let mut tracker = Tracker::new(MemoryStore::new(), sink);
        tracker.start(ActivityType::Creating, "").unwrap();
        let mut out = Vec::new();

        watch(&mut out, &tracker, Some(2)).await.unwrap();

        let output = String::from_utf8(out).unwrap();
        assert_eq!(output.matches("Note: live update failed").count(), 1);
    }
}
