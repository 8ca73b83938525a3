//! CLI module - argument parsing, prompting and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod prompt;
pub mod report;
pub mod session;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
