//! RQC: Resistor batch quality control
//!
//! Decodes resistor color codes, judges measured samples against the
//! tolerance window, and keeps an append-only log of batch results.

pub mod cli;
pub mod core;
pub mod entities;
