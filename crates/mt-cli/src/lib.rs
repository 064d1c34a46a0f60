//! Media time CLI library.
//!
//! This crate provides the `mt` command-line interface on top of
//! `mt-core` and the `SQLite` store in `mt-db`.

mod cli;
pub mod commands;
mod config;
pub mod live;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use live::TerminalSink;
