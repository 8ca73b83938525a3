//! `rqc config` command - Configuration inspection

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Report, Result};

use crate::cli::commands::utils::Settings;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show,

    /// Show paths to configuration files
    Path,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;
    let options = settings.config.analysis_options().map_err(Report::new)?;

    // The fully resolved view, flags included
    let effective = Config {
        log_dir: Some(settings.log_dir.clone()),
        suppliers: Some(settings.config.suppliers()),
        sample_size: Some(options.sample_size),
        spread: Some(options.spread),
        failure_basis: Some(options.failure_basis),
        default_format: settings.config.default_format.clone(),
    };

    match settings.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&effective).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&effective).into_diagnostic()?);
        }
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            print_value("log_dir", &settings.log_dir.display().to_string());
            print_value("suppliers", &settings.config.suppliers().join(", "));
            print_value("sample_size", &options.sample_size.to_string());
            print_value("spread", &options.spread.to_string());
            print_value("failure_basis", &options.failure_basis.to_string());
            print_value(
                "default_format",
                settings.config.default_format.as_deref().unwrap_or("auto"),
            );

            println!();
            println!("{}", style("Config Sources (in priority order):").dim());
            println!("  1. Command-line flags (--log-dir, batch overrides)");
            println!("  2. Environment variables (RQC_LOG_DIR, RQC_SAMPLE_SIZE)");
            println!("  3. Local config (./rqc.yaml)");
            println!("  4. Global config (~/.config/rqc/config.yaml)");
        }
    }

    Ok(())
}

fn print_value(key: &str, value: &str) {
    println!("  {:<16} {}", style(key).cyan(), value);
}

fn run_path() -> Result<()> {
    match Config::global_config_path() {
        Some(path) => print_path("global", &path),
        None => println!("  {:<8} {}", style("global").cyan(), style("(unavailable)").dim()),
    }
    print_path("local", &Config::local_config_path());
    Ok(())
}

fn print_path(scope: &str, path: &std::path::Path) {
    let marker = if path.exists() {
        style("✓").green().to_string()
    } else {
        style("(not found)").dim().to_string()
    };
    println!("  {:<8} {} {}", style(scope).cyan(), path.display(), marker);
}
