//! Rendering of batch summaries and log listings

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::Write;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_failure_rate, format_ohms, format_tolerance, trim_float, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::batch::BatchRecord;
use crate::entities::sample::FailureBasis;

const HEADERS: [&str; 8] = [
    "Company",
    "Date",
    "Failure Rate",
    "Nominal (Ω)",
    "Tolerance",
    "Mean (Ω)",
    "Std Dev",
    "Variance",
];

/// Exact field values, in stored order
fn raw_row(record: &BatchRecord) -> [String; 8] {
    [
        record.company.clone(),
        record.date.to_string(),
        record.failure_rate.to_string(),
        record.nominal.to_string(),
        record.tolerance.to_string(),
        record.mean.to_string(),
        record.std_dev.to_string(),
        record.variance.to_string(),
    ]
}

/// Rounded field values for reading on screen
fn display_row(record: &BatchRecord) -> [String; 8] {
    [
        truncate_str(&record.company, 24),
        record.date.to_string(),
        trim_float(record.failure_rate, 2),
        trim_float(record.nominal, 4),
        trim_float(record.tolerance, 4),
        trim_float(record.mean, 4),
        trim_float(record.std_dev, 4),
        trim_float(record.variance, 4),
    ]
}

/// Summary of a single evaluated batch
pub fn render_summary(
    record: &BatchRecord,
    basis: FailureBasis,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(record)
            .map(|s| s + "\n")
            .into_diagnostic(),
        OutputFormat::Yaml => serde_yml::to_string(record).into_diagnostic(),
        OutputFormat::Csv | OutputFormat::Tsv | OutputFormat::Md => {
            render_records(std::slice::from_ref(record), format)
        }
        OutputFormat::Auto => {
            let rows = [
                ("Company", record.company.clone()),
                ("Date", record.date.display_long()),
                ("Failure Rate", format_failure_rate(record.failure_rate, basis)),
                ("Nominal Value", format_ohms(record.nominal)),
                ("Tolerance", format_tolerance(record.tolerance)),
                ("Mean Resistance", format_ohms(record.mean)),
                ("Standard Deviation", trim_float(record.std_dev, 4)),
                ("Variance", trim_float(record.variance, 4)),
            ];

            let mut out = String::new();
            for (label, value) in rows {
                out.push_str(&format!(
                    "{:<20} {}\n",
                    style(label).bold(),
                    style(value).cyan()
                ));
            }
            Ok(out)
        }
    }
}

/// Listing of stored records in the requested format
pub fn render_records(records: &[BatchRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map(|s| s + "\n")
            .into_diagnostic(),
        OutputFormat::Yaml => serde_yml::to_string(&records).into_diagnostic(),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            write_csv(records, &mut buf)?;
            String::from_utf8(buf).into_diagnostic()
        }
        OutputFormat::Tsv => {
            let mut out = HEADERS.join("\t");
            out.push('\n');
            for record in records {
                out.push_str(&raw_row(record).join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
        OutputFormat::Md => Ok(table(records, true) + "\n"),
        OutputFormat::Auto => Ok(table(records, false) + "\n"),
    }
}

fn table(records: &[BatchRecord], markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(HEADERS);
    for record in records {
        builder.push_record(display_row(record));
    }

    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    table.to_string()
}

/// Write records as CSV with the stored field names as header
pub fn write_csv<W: Write>(records: &[BatchRecord], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record).into_diagnostic()?;
    }
    if records.is_empty() {
        wtr.write_record([
            "company",
            "date",
            "failure_rate",
            "nominal_ohms",
            "tolerance",
            "mean_ohms",
            "std_dev",
            "variance",
        ])
        .into_diagnostic()?;
    }
    wtr.flush().into_diagnostic()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::date::ShipmentDate;

    fn record() -> BatchRecord {
        BatchRecord::assemble(
            "Farnell",
            ShipmentDate::parse("07062020").unwrap(),
            1000.0,
            0.05,
            1010.0,
            30.000000000000004,
            900.0000000000002,
            10.0,
        )
    }

    #[test]
    fn test_csv_header_and_exact_values() {
        let mut buf = Vec::new();
        write_csv(&[record()], &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("company,date,failure_rate,nominal_ohms,tolerance,mean_ohms,std_dev,variance")
        );
        assert_eq!(
            lines.next(),
            Some("Farnell,07062020,10.0,1000.0,0.05,1010.0,30.000000000000004,900.0000000000002")
        );
    }

    #[test]
    fn test_csv_empty_still_has_header() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().starts_with("company,date"));
    }

    #[test]
    fn test_tsv_is_exact() {
        let out = render_records(&[record()], OutputFormat::Tsv).unwrap();
        let row = out.lines().nth(1).unwrap();
        assert_eq!(row.split('\t').count(), 8);
        assert!(row.contains("30.000000000000004"));
    }

    #[test]
    fn test_markdown_table() {
        let out = render_records(&[record()], OutputFormat::Md).unwrap();
        assert!(out.contains("| Company"));
        assert!(out.contains("Farnell"));
    }

    #[test]
    fn test_json_summary_round_trips() {
        let out = render_summary(&record(), FailureBasis::Percent, OutputFormat::Json).unwrap();
        let back: BatchRecord = serde_json::from_str(&out).unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn test_auto_summary_mentions_fields() {
        console::set_colors_enabled(false);
        let out = render_summary(&record(), FailureBasis::Percent, OutputFormat::Auto).unwrap();
        assert!(out.contains("Farnell"));
        assert!(out.contains("07/06/2020"));
        assert!(out.contains("1 kΩ"));
        assert!(out.contains("±5%"));
        assert!(out.contains("10%"));
    }
}
