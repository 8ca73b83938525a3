//! Diagnostics for malformed records in a log store

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// A stored record that could not be read back, with its location
#[derive(Debug, Error, Diagnostic)]
#[error("malformed record on line {line}: {message}")]
#[diagnostic(code(rqc::store::record))]
pub struct RecordParseError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// 1-based line of the offending field
    pub line: usize,

    /// The underlying error message
    pub message: String,
}

impl RecordParseError {
    /// Point at a whole line of the store source
    pub fn at_line(
        message: impl Into<String>,
        source: &str,
        store_name: &str,
        line: usize,
    ) -> Self {
        let message = message.into();
        let (start, len) = line_span(source, line);
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(store_name, source.to_string()),
            span: SourceSpan::from(start..start + len),
            help,
            line,
            message,
        }
    }

    /// Build from a serde_json error on a given line
    pub fn from_json_error(err: &serde_json::Error, source: &str, store_name: &str, line: usize) -> Self {
        Self::at_line(err.to_string(), source, store_name, line)
    }
}

/// Byte offset and length of a 1-based line, without its newline
fn line_span(source: &str, line: usize) -> (usize, usize) {
    let mut offset = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            return (offset, text.trim_end_matches(['\n', '\r']).len());
        }
        offset += text.len();
    }
    (source.len().saturating_sub(1), 0)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("missing field") {
        return Some(
            "Each record needs company, date, failure_rate, nominal_ohms, tolerance, mean_ohms, std_dev and variance."
                .to_string(),
        );
    }

    if msg_lower.contains("ddmmyyyy") || msg_lower.contains("calendar date") {
        return Some("Dates are stored as eight digits, ddMMyyyy.".to_string());
    }

    if msg_lower.contains("invalid float") || msg_lower.contains("expected value") {
        return Some("Numeric fields must be plain decimal numbers.".to_string());
    }

    if msg_lower.contains("truncated") {
        return Some(
            "Legacy logs hold eight lines per record; the file may have been cut short.".to_string(),
        );
    }

    None
}
