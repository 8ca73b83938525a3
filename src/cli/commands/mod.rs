//! CLI command implementations

pub mod utils;

pub mod batch;
pub mod completions;
pub mod config;
pub mod decode;
pub mod log;
pub mod menu;
pub mod palette;
