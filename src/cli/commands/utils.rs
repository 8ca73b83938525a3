//! Shared utilities for CLI commands

use console::style;
use miette::{Report, Result};
use std::path::PathBuf;

use crate::cli::report::{render_records, render_summary};
use crate::cli::session::SessionOutcome;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::sample::{AnalysisOptions, FailureBasis};

/// Effective settings for one invocation: config layers plus global flags
pub struct Settings {
    pub config: Config,
    pub log_dir: PathBuf,
    pub options: AnalysisOptions,
    pub format: OutputFormat,
}

impl Settings {
    pub fn load(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let log_dir = global.log_dir.clone().unwrap_or_else(|| config.log_dir());
        let options = config.analysis_options().map_err(Report::new)?;
        let format = global.resolve_format(config.default_format.as_deref());

        Ok(Self {
            config,
            log_dir,
            options,
            format,
        })
    }
}

/// Print the result of an interactive session
pub fn show_outcome(
    outcome: SessionOutcome,
    basis: FailureBasis,
    format: OutputFormat,
    global: &GlobalOpts,
) -> Result<()> {
    match outcome {
        SessionOutcome::Exited => {
            if !global.quiet {
                println!("Exiting. Nothing was recorded.");
            }
        }
        SessionOutcome::Evaluated(record) => {
            print!("{}", render_summary(&record, basis, format)?);
        }
        SessionOutcome::Stored { record, store } => {
            print!("{}", render_summary(&record, basis, format)?);
            if !global.quiet {
                println!(
                    "{} Appended to {}",
                    style("✓").green(),
                    style(store.path().display()).cyan()
                );
            }
        }
        SessionOutcome::Listed {
            records,
            supplier,
            store,
        } => {
            if records.is_empty() {
                match supplier {
                    Some(s) => println!("No records from {} in log '{}'.", s, store.name()),
                    None => println!("No records in log '{}'.", store.name()),
                }
            } else {
                print!("{}", render_records(&records, format)?);
            }
        }
        SessionOutcome::StoreMissing { name } => {
            println!("Log '{}' not found. Exiting.", name);
        }
    }
    Ok(())
}
