//! OnBeat studio shell.
//!
//! Hosts the studio store and the page models behind a line-oriented JSON
//! protocol: commands arrive on stdin, snapshots and events leave on stdout.

pub mod commands;
pub mod config;
pub mod dto;
pub mod fault;
pub mod poll;
pub mod state;

pub use commands::{Command, CommandResult, execute, execute_line};
pub use config::Config;
pub use dto::{Event, StudioSnapshot};
pub use state::AppState;
