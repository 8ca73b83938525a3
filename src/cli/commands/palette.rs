//! `rqc palette` command - print the band color palettes

use console::style;
use miette::{IntoDiagnostic, Report, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::Settings;
use crate::cli::helpers::{format_tolerance, trim_float};
use crate::cli::session::palette_names;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::bands::{
    decode_digit, decode_multiplier, decode_temp_coefficient, decode_tolerance, BandRole,
    DecodeError,
};

/// One color of one palette
#[derive(Debug, Serialize)]
pub struct PaletteEntry {
    pub role: BandRole,
    /// 1-based position, as shown in menus
    pub number: usize,
    pub color: String,
    pub value: String,
}

const ROLES: [BandRole; 4] = [
    BandRole::Digit,
    BandRole::Multiplier,
    BandRole::Tolerance,
    BandRole::TempCoefficient,
];

fn value_label(role: BandRole, index: usize) -> Result<String, DecodeError> {
    Ok(match role {
        BandRole::Digit => decode_digit(index)?.to_string(),
        BandRole::Multiplier => format!("×{}", trim_float(decode_multiplier(index)?, 2)),
        BandRole::Tolerance => format_tolerance(decode_tolerance(index)?),
        BandRole::TempCoefficient => format!("{} ppm/K", decode_temp_coefficient(index)?),
    })
}

/// Every palette entry in role then palette order
pub fn entries() -> Result<Vec<PaletteEntry>, DecodeError> {
    let mut entries = Vec::new();
    for role in ROLES {
        for (index, color) in palette_names(role).into_iter().enumerate() {
            entries.push(PaletteEntry {
                role,
                number: index + 1,
                color,
                value: value_label(role, index)?,
            });
        }
    }
    Ok(entries)
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let settings = Settings::load(global)?;
    let entries = entries().map_err(Report::new)?;

    match settings.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&entries).into_diagnostic()?);
        }
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if settings.format == OutputFormat::Tsv { "\t" } else { "," };
            println!("{}", ["role", "number", "color", "value"].join(sep));
            for e in &entries {
                println!(
                    "{}",
                    [e.role.to_string(), e.number.to_string(), e.color.clone(), e.value.clone()]
                        .join(sep)
                );
            }
        }
        OutputFormat::Md | OutputFormat::Auto => {
            for role in ROLES {
                let mut builder = Builder::default();
                builder.push_record(["#", "Color", "Value"]);
                for e in entries.iter().filter(|e| e.role == role) {
                    builder.push_record([e.number.to_string(), e.color.clone(), e.value.clone()]);
                }

                let mut table = builder.build();
                if settings.format == OutputFormat::Md {
                    println!("## {}\n", role);
                    table.with(Style::markdown());
                } else {
                    println!("{}", style(role.to_string().to_uppercase()).bold());
                    table.with(Style::rounded());
                }
                println!("{}\n", table);
            }
        }
    }

    Ok(())
}
