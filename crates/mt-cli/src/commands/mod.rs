//! CLI subcommand implementations.

pub mod calendar;
pub mod delete;
pub mod history;
pub mod report;
pub mod start;
pub mod status;
pub mod stop;
pub mod switch;
pub mod util;
pub mod watch;
