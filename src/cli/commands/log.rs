//! `rqc log` command - Batch log review and conversion

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Report, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

use crate::cli::commands::utils::Settings;
use crate::cli::report::{render_records, write_csv};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::{list_stores, select_store, LogStore, OpenMode, StoreError, StoreFormat};
use crate::entities::batch::BatchRecord;

#[derive(Subcommand, Debug)]
pub enum LogCommands {
    /// List the records of a log
    List(ListArgs),

    /// List the logs in the log directory
    Stores,

    /// Export a log to CSV
    Export(ExportArgs),

    /// Convert a legacy eight-line log into a native log
    Import(ImportArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Log name
    #[arg(long)]
    pub store: String,

    /// Only records from this supplier (case-insensitive)
    #[arg(long, short = 's')]
    pub supplier: Option<String>,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Log name
    #[arg(long)]
    pub store: String,

    /// Only records from this supplier (case-insensitive)
    #[arg(long, short = 's')]
    pub supplier: Option<String>,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Legacy log file to read
    #[arg(long)]
    pub from: PathBuf,

    /// Native log to append the records to
    #[arg(long)]
    pub store: String,
}

/// Run a log subcommand
pub fn run(cmd: LogCommands, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;
    match cmd {
        LogCommands::List(args) => run_list(args, &settings, global),
        LogCommands::Stores => run_stores(&settings),
        LogCommands::Export(args) => run_export(args, &settings, global),
        LogCommands::Import(args) => run_import(args, &settings, global),
    }
}

/// Open a log for reading; `None` (after telling the user) when it is missing
fn open_for_read(settings: &Settings, name: &str) -> Result<Option<LogStore>> {
    match select_store(&settings.log_dir, name, OpenMode::Read) {
        Ok(store) => Ok(Some(store)),
        Err(StoreError::NotFound { name, dir }) => {
            println!("Log '{}' not found in {}.", name, dir.display());
            Ok(None)
        }
        Err(e) => Err(Report::new(e)),
    }
}

fn filtered(store: &LogStore, supplier: Option<&str>) -> Result<Vec<BatchRecord>> {
    let records = store.read_all().map_err(Report::new)?;
    Ok(records
        .into_iter()
        .filter(|r| supplier.map_or(true, |s| r.is_from(s)))
        .collect())
}

fn run_list(args: ListArgs, settings: &Settings, global: &GlobalOpts) -> Result<()> {
    let Some(store) = open_for_read(settings, &args.store)? else {
        return Ok(());
    };
    let records = filtered(&store, args.supplier.as_deref())?;

    if args.count {
        println!("{}", records.len());
        return Ok(());
    }

    if records.is_empty() && matches!(settings.format, OutputFormat::Auto | OutputFormat::Tsv) {
        println!("No records found.");
        return Ok(());
    }

    print!("{}", render_records(&records, settings.format)?);

    if settings.format == OutputFormat::Auto && !global.quiet {
        println!(
            "{} record(s) in {}.",
            style(records.len()).cyan(),
            style(store.path().display()).dim()
        );
    }

    Ok(())
}

fn run_stores(settings: &Settings) -> Result<()> {
    let stores = list_stores(&settings.log_dir).map_err(Report::new)?;

    match settings.format {
        OutputFormat::Json => {
            let list: Vec<_> = stores
                .iter()
                .map(|(name, format)| serde_json::json!({ "name": name, "format": format.to_string() }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&list).into_diagnostic()?);
        }
        _ => {
            if stores.is_empty() {
                println!("No logs in {}.", settings.log_dir.display());
            }
            for (name, format) in &stores {
                match format {
                    StoreFormat::JsonLines => println!("{}", name),
                    StoreFormat::Legacy => println!("{}\t{}", name, style("(legacy)").dim()),
                }
            }
        }
    }

    Ok(())
}

fn run_export(args: ExportArgs, settings: &Settings, global: &GlobalOpts) -> Result<()> {
    let Some(store) = open_for_read(settings, &args.store)? else {
        return Ok(());
    };
    let records = filtered(&store, args.supplier.as_deref())?;

    match args.output {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            write_csv(&records, BufWriter::new(file))?;
            if !global.quiet {
                println!(
                    "{} Exported {} record(s) to {}",
                    style("✓").green(),
                    records.len(),
                    style(path.display()).cyan()
                );
            }
        }
        None => write_csv(&records, std::io::stdout().lock())?,
    }

    Ok(())
}

fn run_import(args: ImportArgs, settings: &Settings, global: &GlobalOpts) -> Result<()> {
    let source = LogStore::at_path(&args.from).map_err(Report::new)?;
    let target = select_store(&settings.log_dir, &args.store, OpenMode::Append).map_err(Report::new)?;

    if source.path() == target.path() {
        return Err(miette::miette!(
            "cannot import {} into itself",
            source.path().display()
        ));
    }

    // Read everything first so a malformed record imports nothing
    let records = source.read_all().map_err(Report::new)?;
    for record in &records {
        target.append(record).map_err(Report::new)?;
    }
    info!(count = records.len(), from = %source.path().display(), "imported records");

    if !global.quiet {
        println!(
            "{} Imported {} record(s) into {}",
            style("✓").green(),
            records.len(),
            style(target.path().display()).cyan()
        );
    }

    Ok(())
}
