//! `rqc batch` command - evaluate one batch
//!
//! All inputs can be given as flags for scripting, or collected with the
//! same prompts as the interactive menu.

use console::style;
use miette::{Report, Result};
use std::io::{self, IsTerminal};

use crate::cli::commands::utils::Settings;
use crate::cli::prompt::{LinePrompter, TerminalPrompter};
use crate::cli::report::render_summary;
use crate::cli::session::Session;
use crate::cli::GlobalOpts;
use crate::core::date::ShipmentDate;
use crate::core::selection::parse_measurement_list;
use crate::core::store::{ensure_storable_basis, select_store, OpenMode};
use crate::entities::batch::BatchRecord;
use crate::entities::resistor::BandSet;
use crate::entities::sample::{AnalysisOptions, FailureBasis, Sample, SampleError, SpreadConvention};

#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// Supplier the shipment came from
    #[arg(long, short = 's')]
    pub supplier: Option<String>,

    /// Shipment date (ddMMyyyy, e.g. 07062020)
    #[arg(long, short = 'd')]
    pub date: Option<String>,

    /// Band colors in order, comma-separated (4, 5 or 6 colors)
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub colors: Vec<String>,

    /// Measured resistances in ohms, comma-separated
    #[arg(long, short = 'm', allow_hyphen_values = true)]
    pub measurements: Option<String>,

    /// Append the result to this log
    #[arg(long)]
    pub store: Option<String>,

    /// Units per sample (overrides config)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Variance convention: population or sample (overrides config)
    #[arg(long)]
    pub spread: Option<SpreadConvention>,

    /// Failure rate basis: percent or count (overrides config)
    #[arg(long)]
    pub failure_basis: Option<FailureBasis>,

    /// Prompt for every input
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

impl BatchArgs {
    fn missing_flags(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.supplier.is_none() {
            missing.push("--supplier");
        }
        if self.date.is_none() {
            missing.push("--date");
        }
        if self.colors.is_empty() {
            missing.push("--colors");
        }
        if self.measurements.is_none() {
            missing.push("--measurements");
        }
        missing
    }
}

pub fn run(args: BatchArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;

    let mut options = settings.options;
    if let Some(n) = args.sample_size {
        if n == 0 {
            return Err(Report::new(SampleError::EmptySample));
        }
        options.sample_size = n;
    }
    if let Some(spread) = args.spread {
        options.spread = spread;
    }
    if let Some(basis) = args.failure_basis {
        options.failure_basis = basis;
    }

    if args.store.is_some() {
        ensure_storable_basis(options.failure_basis).map_err(Report::new)?;
    }

    // Resolve the log up front so a bad name fails before any prompting
    let store = args
        .store
        .as_deref()
        .map(|name| select_store(&settings.log_dir, name, OpenMode::Append))
        .transpose()
        .map_err(Report::new)?;

    let missing = args.missing_flags();
    let record = if args.interactive || missing.len() == 4 {
        match prompt_batch(&settings, options)? {
            Some(record) => record,
            None => {
                if !global.quiet {
                    println!("Exiting. Nothing was recorded.");
                }
                return Ok(());
            }
        }
    } else if !missing.is_empty() {
        return Err(miette::miette!(
            code = "rqc::batch::args",
            help = "give every input as a flag, or use --interactive",
            "missing {}",
            missing.join(", ")
        ));
    } else {
        from_flags(&args, &options)?
    };

    if let Some(store) = &store {
        store.append(&record).map_err(Report::new)?;
    }

    print!("{}", render_summary(&record, options.failure_basis, settings.format)?);

    if let Some(store) = &store {
        if !global.quiet {
            println!(
                "{} Appended to {}",
                style("✓").green(),
                style(store.path().display()).cyan()
            );
        }
    }

    Ok(())
}

fn from_flags(args: &BatchArgs, options: &AnalysisOptions) -> Result<BatchRecord> {
    let supplier = args.supplier.as_deref().unwrap_or_default().trim();
    if supplier.is_empty() {
        return Err(miette::miette!("supplier name cannot be empty"));
    }

    let date = ShipmentDate::parse(args.date.as_deref().unwrap_or_default()).map_err(Report::new)?;
    let bands = BandSet::from_names(&args.colors).map_err(Report::new)?;
    let values = parse_measurement_list(args.measurements.as_deref().unwrap_or_default())
        .map_err(Report::new)?;
    let sample = Sample::new(values, options.sample_size).map_err(Report::new)?;

    Ok(BatchRecord::evaluate(supplier, date, &bands, &sample, options))
}

fn prompt_batch(settings: &Settings, options: AnalysisOptions) -> Result<Option<BatchRecord>> {
    let suppliers = settings.config.suppliers();
    let log_dir = settings.log_dir.clone();

    if io::stdin().is_terminal() {
        let mut prompter = TerminalPrompter::new();
        Session::new(&mut prompter, suppliers, log_dir, options).enter_batch()
    } else {
        let mut prompter = LinePrompter::new(io::stdin().lock(), io::stderr());
        Session::new(&mut prompter, suppliers, log_dir, options).enter_batch()
    }
}
