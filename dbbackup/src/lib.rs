//! Library module for the dbbackup binary.
//!
//! Exposes argument parsing, interactive input and run control for
//! testing. The startup sequence itself lives in main.rs.

pub mod cli;
pub mod run;

pub use cli::{Cli, NoPrompter, Prompter, TerminalPrompter};
pub use run::{Interrupt, RunOutcome, export_until_interrupted, usage_exit_status};
