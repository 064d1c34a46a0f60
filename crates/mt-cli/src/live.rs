//! Terminal rendering of live session updates.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use chrono::Utc;
use mt_core::{LiveContent, LiveSink, Session, SinkError, format_duration};

/// Mirrors session lifecycle events as lines on a terminal stream.
///
/// Ticks rewrite the current line with a carriage return, so a `watch`
/// loop shows one updating clock.
pub struct TerminalSink<W: Write> {
    out: RefCell<W>,
    enabled: bool,
    mid_line: Cell<bool>,
}

impl TerminalSink<io::Stderr> {
    pub fn stderr(enabled: bool) -> Self {
        Self::new(io::stderr(), enabled)
    }
}

impl<W: Write> TerminalSink<W> {
    pub const fn new(out: W, enabled: bool) -> Self {
        Self {
            out: RefCell::new(out),
            enabled,
            mid_line: Cell::new(false),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn emit(&self, line: &str, newline: bool) -> Result<(), SinkError> {
        if !self.enabled {
            return Ok(());
        }
        let mut out = self.out.borrow_mut();
        if newline {
            if self.mid_line.replace(false) {
                writeln!(out)?;
            }
            writeln!(out, "{line}")?;
        } else {
            write!(out, "\r{line}")?;
            self.mid_line.set(true);
        }
        out.flush()?;
        Ok(())
    }
}

fn with_description(text: String, session: &Session) -> String {
    if session.description().is_empty() {
        text
    } else {
        format!("{text}: {}", session.description())
    }
}

impl<W: Write> LiveSink for TerminalSink<W> {
    fn on_start(&self, session: &Session) -> Result<(), SinkError> {
        let line = format!("▶ {} started", session.activity_type().label());
        self.emit(&with_description(line, session), true)
    }

    fn on_stop(&self, session: &Session) -> Result<(), SinkError> {
        let end = session.end_time().unwrap_or_else(Utc::now);
        let line = format!(
            "■ {} stopped after {}",
            session.activity_type().label(),
            format_duration(session.duration(end))
        );
        self.emit(&with_description(line, session), true)
    }

    fn on_switch(&self, session: &Session) -> Result<(), SinkError> {
        let line = format!("⇄ switched to {}", session.activity_type().label());
        self.emit(&line, true)
    }

    fn on_tick(&self, session: &Session, running_time: &str) -> Result<(), SinkError> {
        let content = LiveContent::with_running_time(session, running_time.to_string());
        let line = format!("● {} {}", content.activity_type, content.running_time);
        self.emit(&with_description(line, session), false)
    }
}
