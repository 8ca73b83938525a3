//! `rqc decode` command - nominal value and tolerance window of a color code

use console::style;
use miette::{IntoDiagnostic, Report, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};
use tracing::debug;

use crate::cli::commands::utils::Settings;
use crate::cli::helpers::{format_ohms, format_tolerance};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::resistor::BandSet;

#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    /// Band colors in order, comma-separated (4, 5 or 6 colors)
    #[arg(long, short = 'c', value_delimiter = ',', required = true)]
    pub colors: Vec<String>,
}

/// Decoded view of a color code
#[derive(Debug, Serialize)]
pub struct DecodedCode {
    pub colors: Vec<&'static str>,
    pub bands: usize,
    pub nominal_ohms: f64,
    pub tolerance: f64,
    pub min_ohms: f64,
    pub max_ohms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_coefficient_ppm: Option<u32>,
}

impl From<&BandSet> for DecodedCode {
    fn from(bands: &BandSet) -> Self {
        let window = bands.window();
        Self {
            colors: bands.color_names(),
            bands: bands.band_count().bands(),
            nominal_ohms: bands.nominal(),
            tolerance: bands.tolerance().fraction(),
            min_ohms: window.min,
            max_ohms: window.max,
            temp_coefficient_ppm: bands.temp_coefficient().map(|t| t.ppm_per_kelvin()),
        }
    }
}

pub fn run(args: DecodeArgs, global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;
    let bands = BandSet::from_names(&args.colors).map_err(Report::new)?;
    let decoded = DecodedCode::from(&bands);
    debug!(colors = ?decoded.colors, nominal = decoded.nominal_ohms, "decoded color code");

    match settings.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&decoded).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&decoded).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if settings.format == OutputFormat::Tsv { "\t" } else { "," };
            println!(
                "{}",
                ["nominal_ohms", "tolerance", "min_ohms", "max_ohms", "temp_coefficient_ppm"].join(sep)
            );
            println!(
                "{}",
                [
                    decoded.nominal_ohms.to_string(),
                    decoded.tolerance.to_string(),
                    decoded.min_ohms.to_string(),
                    decoded.max_ohms.to_string(),
                    decoded
                        .temp_coefficient_ppm
                        .map(|t| t.to_string())
                        .unwrap_or_default(),
                ]
                .join(sep)
            );
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(["Colors", "Nominal", "Tolerance", "Min", "Max"]);
            builder.push_record([
                decoded.colors.join(", "),
                format_ohms(decoded.nominal_ohms),
                format_tolerance(decoded.tolerance),
                format_ohms(decoded.min_ohms),
                format_ohms(decoded.max_ohms),
            ]);
            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Auto => {
            println!(
                "{} {}",
                style(format!("{}-band", decoded.bands)).bold(),
                decoded.colors.join(" ")
            );
            println!("  Nominal     {}", style(format_ohms(decoded.nominal_ohms)).cyan());
            println!("  Tolerance   {}", format_tolerance(decoded.tolerance));
            println!(
                "  Accepts     {} to {}",
                style(format_ohms(decoded.min_ohms)).green(),
                style(format_ohms(decoded.max_ohms)).green()
            );
            if let Some(ppm) = decoded.temp_coefficient_ppm {
                println!("  Temp. coef. {} ppm/K", ppm);
            }
        }
    }

    Ok(())
}
