//! Append-only batch log stores
//!
//! A store is a flat file in the log directory, named by the technician.
//! Two layouts are understood:
//!
//! - `<name>.jsonl` - one JSON object per line with named fields (default)
//! - `<name>.txt` - the legacy layout, eight lines per record, one field per
//!   line in the order company, date, failure rate, nominal, tolerance, mean,
//!   standard deviation, variance
//!
//! Records are never rewritten; new ones are appended at the end.

use miette::Diagnostic;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::date::ShipmentDate;
use crate::core::diagnostics::RecordParseError;
use crate::entities::batch::BatchRecord;
use crate::entities::sample::FailureBasis;

/// Lines per record in the legacy layout
pub const LEGACY_RECORD_LINES: usize = 8;

/// Errors raised by log stores
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("log '{name}' not found in {}", dir.display())]
    #[diagnostic(code(rqc::store::not_found), help("run `rqc log stores` to see available logs"))]
    NotFound { name: String, dir: PathBuf },

    #[error("'{0}' is not a valid log name")]
    #[diagnostic(
        code(rqc::store::name),
        help("use a plain file name without path separators, e.g. `shipments`")
    )]
    InvalidName(String),

    #[error("company {0:?} cannot be written to a legacy log")]
    #[diagnostic(
        code(rqc::store::encode),
        help("legacy company names must be non-empty, on one line, without surrounding spaces")
    )]
    Unencodable(String),

    #[error("{field} is {value}, which cannot be stored")]
    #[diagnostic(
        code(rqc::store::non_finite),
        help("check the measurements for values far outside the nominal range")
    )]
    NonFinite { field: &'static str, value: f64 },

    #[error("IO error: {0}")]
    #[diagnostic(code(rqc::store::io))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(rqc::store::json))]
    Json(#[from] serde_json::Error),

    #[error("batch logs hold percent failure rates, not raw failure counts")]
    #[diagnostic(
        code(rqc::store::basis),
        help("store with the percent basis, or evaluate without storing")
    )]
    CountBasis,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Record(Box<RecordParseError>),
}

impl From<RecordParseError> for StoreError {
    fn from(err: RecordParseError) -> Self {
        StoreError::Record(Box::new(err))
    }
}

/// On-disk layout of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreFormat {
    /// One JSON record per line
    JsonLines,
    /// Eight positional lines per record
    Legacy,
}

impl StoreFormat {
    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            StoreFormat::JsonLines => "jsonl",
            StoreFormat::Legacy => "txt",
        }
    }

    /// Format implied by a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jsonl" => Some(StoreFormat::JsonLines),
            "txt" => Some(StoreFormat::Legacy),
            _ => None,
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFormat::JsonLines => write!(f, "jsonl"),
            StoreFormat::Legacy => write!(f, "legacy"),
        }
    }
}

/// What the caller intends to do with a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// The store must already exist
    Read,
    /// The store is created on first append
    Append,
}

/// A resolved log store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStore {
    name: String,
    path: PathBuf,
    format: StoreFormat,
}

/// Resolve a technician-chosen log name inside `dir`
///
/// A bare name prefers an existing `.jsonl` store, then an existing legacy
/// `.txt` store. When appending to a name that does not exist yet, a new
/// `.jsonl` store is used. A name carrying an explicit extension selects
/// that layout.
pub fn select_store(dir: &Path, name: &str, mode: OpenMode) -> Result<LogStore, StoreError> {
    let (stem, explicit) = split_name(name)?;

    let candidates: Vec<StoreFormat> = match explicit {
        Some(format) => vec![format],
        None => vec![StoreFormat::JsonLines, StoreFormat::Legacy],
    };

    for format in &candidates {
        let path = dir.join(format!("{}.{}", stem, format.extension()));
        if path.is_file() {
            debug!(path = %path.display(), %format, "resolved log store");
            return Ok(LogStore {
                name: stem,
                path,
                format: *format,
            });
        }
    }

    match mode {
        OpenMode::Read => Err(StoreError::NotFound {
            name: name.trim().to_string(),
            dir: dir.to_path_buf(),
        }),
        OpenMode::Append => {
            let format = candidates[0];
            Ok(LogStore {
                path: dir.join(format!("{}.{}", stem, format.extension())),
                name: stem,
                format,
            })
        }
    }
}

/// Validate a log name and split off a recognised extension
fn split_name(name: &str) -> Result<(String, Option<StoreFormat>), StoreError> {
    let name = name.trim();
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.chars().any(char::is_control);
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }

    if let Some((stem, ext)) = name.rsplit_once('.') {
        if let Some(format) = StoreFormat::from_extension(ext) {
            if stem.is_empty() {
                return Err(StoreError::InvalidName(name.to_string()));
            }
            return Ok((stem.to_string(), Some(format)));
        }
    }

    Ok((name.to_string(), None))
}

/// Names and layouts of the stores in a log directory, sorted by name
pub fn list_stores(dir: &Path) -> Result<Vec<(String, StoreFormat)>, StoreError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut stores = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(StoreFormat::from_extension);
        let stem = path.file_stem().and_then(|s| s.to_str());
        if let (Some(format), Some(stem)) = (format, stem) {
            stores.push((stem.to_string(), format));
        }
    }
    stores.sort();
    Ok(stores)
}

impl LogStore {
    /// Open a store by explicit file path, layout chosen by extension
    pub fn at_path(path: &Path) -> Result<Self, StoreError> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(StoreFormat::from_extension)
            .unwrap_or(StoreFormat::Legacy);
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        if !path.is_file() {
            return Err(StoreError::NotFound {
                name,
                dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            });
        }

        Ok(Self {
            name,
            path: path.to_path_buf(),
            format,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Append one record at the end of the store, creating it if needed
    pub fn append(&self, record: &BatchRecord) -> Result<(), StoreError> {
        check_finite(record)?;
        let encoded = match self.format {
            StoreFormat::JsonLines => format!("{}\n", serde_json::to_string(record)?),
            StoreFormat::Legacy => encode_legacy(record)?,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        // Keep one record per line even if the file was hand-edited
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        file.write_all(encoded.as_bytes())?;
        file.flush()?;

        info!(
            store = %self.path.display(),
            company = %record.company,
            date = %record.date,
            "appended batch record"
        );
        Ok(())
    }

    /// Sequential reader over the stored records
    pub fn records(&self) -> Result<RecordReader, StoreError> {
        let source = fs::read_to_string(&self.path)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone());
        Ok(RecordReader::new(file_name, source, self.format))
    }

    /// Read every record, stopping at the first malformed one
    pub fn read_all(&self) -> Result<Vec<BatchRecord>, StoreError> {
        self.records()?.collect()
    }
}

/// Stored failure rates are always on the percent basis
pub fn ensure_storable_basis(basis: FailureBasis) -> Result<(), StoreError> {
    match basis {
        FailureBasis::Percent => Ok(()),
        FailureBasis::Count => Err(StoreError::CountBasis),
    }
}

/// Reject records whose numbers would not read back
fn check_finite(record: &BatchRecord) -> Result<(), StoreError> {
    let fields = [
        ("failure rate", record.failure_rate),
        ("nominal value", record.nominal),
        ("tolerance", record.tolerance),
        ("mean", record.mean),
        ("standard deviation", record.std_dev),
        ("variance", record.variance),
    ];
    match fields.into_iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => Err(StoreError::NonFinite { field, value }),
        None => Ok(()),
    }
}

/// Encode a record in the legacy eight-line layout
///
/// The company line is read back verbatim, so it must be non-blank,
/// free of control characters and of leading or trailing whitespace.
pub fn encode_legacy(record: &BatchRecord) -> Result<String, StoreError> {
    let company = &record.company;
    if company.trim().is_empty()
        || company.trim() != company.as_str()
        || company.chars().any(char::is_control)
    {
        return Err(StoreError::Unencodable(company.clone()));
    }

    Ok(format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
        record.company,
        record.date,
        record.failure_rate,
        record.nominal,
        record.tolerance,
        record.mean,
        record.std_dev,
        record.variance
    ))
}

/// Iterator over the records of a store, in storage order
///
/// Yields `None` at end-of-store. After a malformed record it yields the
/// error once and then ends.
pub struct RecordReader {
    store_name: String,
    source: String,
    offset: usize,
    line: usize,
    format: StoreFormat,
    failed: bool,
}

impl RecordReader {
    /// Reader over already-loaded store contents
    pub fn new(store_name: impl Into<String>, source: String, format: StoreFormat) -> Self {
        Self {
            store_name: store_name.into(),
            source,
            offset: 0,
            line: 0,
            format,
            failed: false,
        }
    }

    /// Next raw line (without line ending) and its 1-based number
    fn next_line(&mut self) -> Option<(String, usize)> {
        if self.offset >= self.source.len() {
            return None;
        }
        let rest = &self.source[self.offset..];
        let (text, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        let text = text.strip_suffix('\r').unwrap_or(text).to_string();
        self.offset += consumed;
        self.line += 1;
        Some((text, self.line))
    }

    /// Next line that is not blank
    fn next_content_line(&mut self) -> Option<(String, usize)> {
        loop {
            let (text, line) = self.next_line()?;
            if !text.trim().is_empty() {
                return Some((text, line));
            }
        }
    }

    fn error(&self, message: impl Into<String>, line: usize) -> StoreError {
        RecordParseError::at_line(message, &self.source, &self.store_name, line).into()
    }

    fn read_json(&mut self) -> Option<Result<BatchRecord, StoreError>> {
        let (text, line) = self.next_content_line()?;
        Some(serde_json::from_str::<BatchRecord>(&text).map_err(|e| {
            RecordParseError::from_json_error(&e, &self.source, &self.store_name, line).into()
        }))
    }

    fn read_legacy(&mut self) -> Option<Result<BatchRecord, StoreError>> {
        let (company, first_line) = self.next_content_line()?;

        let mut fields = Vec::with_capacity(LEGACY_RECORD_LINES - 1);
        let mut last_line = first_line;
        while fields.len() < LEGACY_RECORD_LINES - 1 {
            match self.next_line() {
                Some((text, line)) => {
                    last_line = line;
                    fields.push((text, line));
                }
                None => {
                    return Some(Err(self.error(
                        format!("record truncated after {} lines", fields.len() + 1),
                        last_line,
                    )))
                }
            }
        }

        let (date_text, date_line) = &fields[0];
        let date = match ShipmentDate::parse(date_text) {
            Ok(date) => date,
            Err(e) => return Some(Err(self.error(e.to_string(), *date_line))),
        };

        const NUMERIC: [&str; 6] = [
            "failure rate",
            "nominal value",
            "tolerance",
            "mean",
            "standard deviation",
            "variance",
        ];
        let mut numbers = [0.0f64; 6];
        for (i, label) in NUMERIC.iter().enumerate() {
            let (text, line) = &fields[i + 1];
            match text.trim().parse::<f64>() {
                Ok(v) => numbers[i] = v,
                Err(_) => {
                    return Some(Err(
                        self.error(format!("invalid float {:?} for {}", text.trim(), label), *line)
                    ))
                }
            }
        }

        let [failure_rate, nominal, tolerance, mean, std_dev, variance] = numbers;
        Some(Ok(BatchRecord::assemble(
            company,
            date,
            nominal,
            tolerance,
            mean,
            std_dev,
            variance,
            failure_rate,
        )))
    }
}

impl Iterator for RecordReader {
    type Item = Result<BatchRecord, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let item = match self.format {
            StoreFormat::JsonLines => self.read_json(),
            StoreFormat::Legacy => self.read_legacy(),
        };

        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(company: &str, rate: f64) -> BatchRecord {
        BatchRecord::assemble(
            company,
            ShipmentDate::parse("29022020").unwrap(),
            1000.0,
            0.05,
            1010.0,
            30.000000000000004,
            900.0000000000002,
            rate,
        )
    }

    #[test]
    fn test_read_missing_store_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = select_store(tmp.path(), "nope", OpenMode::Read).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_append_creates_jsonl_store() {
        let tmp = TempDir::new().unwrap();
        let store = select_store(tmp.path(), "qc", OpenMode::Append).unwrap();
        assert_eq!(store.format(), StoreFormat::JsonLines);
        assert!(!store.path().exists());

        store.append(&record("Farnell", 10.0)).unwrap();
        assert!(tmp.path().join("qc.jsonl").is_file());

        let reopened = select_store(tmp.path(), "qc", OpenMode::Read).unwrap();
        assert_eq!(reopened, store);
    }

    #[test]
    fn test_jsonl_round_trip_is_exact() {
        let tmp = TempDir::new().unwrap();
        let store = select_store(tmp.path(), "qc", OpenMode::Append).unwrap();
        let first = record("Farnell", 10.0);
        let second = BatchRecord::assemble(
            "DigiKey",
            ShipmentDate::parse("01012021").unwrap(),
            0.47,
            0.0025,
            0.1 + 0.2,
            1.0 / 3.0,
            (1.0f64 / 3.0).powi(2),
            0.0,
        );
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let mut reader = store.records().unwrap();
        assert_eq!(reader.next().unwrap().unwrap(), first);
        assert_eq!(reader.next().unwrap().unwrap(), second);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_legacy_round_trip_is_exact() {
        let tmp = TempDir::new().unwrap();
        let store = select_store(tmp.path(), "old.txt", OpenMode::Append).unwrap();
        assert_eq!(store.format(), StoreFormat::Legacy);

        let original = record("Rapid Electronics", 20.0);
        store.append(&original).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.lines().count(), LEGACY_RECORD_LINES);
        assert_eq!(content.lines().next(), Some("Rapid Electronics"));

        assert_eq!(store.read_all().unwrap(), vec![original]);
    }

    #[test]
    fn test_bare_name_appends_to_existing_legacy_store() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("old.txt"), encode_legacy(&record("Farnell", 0.0)).unwrap()).unwrap();

        let store = select_store(tmp.path(), "old", OpenMode::Append).unwrap();
        assert_eq!(store.format(), StoreFormat::Legacy);
        store.append(&record("DigiKey", 30.0)).unwrap();

        let records = store.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].company, "DigiKey");
    }

    #[test]
    fn test_reads_printf_style_legacy_values() {
        let source = "Farnell\n07062020\n10.000000\n1000.000000\n0.050000\n1010.000000\n30.000000\n900.000000\n";
        let mut reader = RecordReader::new("log.txt", source.to_string(), StoreFormat::Legacy);
        let rec = reader.next().unwrap().unwrap();
        assert_eq!(rec.company, "Farnell");
        assert_eq!(rec.failure_rate, 10.0);
        assert_eq!(rec.tolerance, 0.05);
        assert_eq!(rec.variance, 900.0);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_legacy_record() {
        let source = "Farnell\n07062020\n10\n";
        let mut reader = RecordReader::new("log.txt", source.to_string(), StoreFormat::Legacy);
        match reader.next() {
            Some(Err(StoreError::Record(e))) => {
                assert_eq!(e.line, 3);
                assert!(e.message.contains("truncated"));
            }
            other => panic!("expected truncated record error, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_bad_legacy_number_points_at_line() {
        let source = "Farnell\n07062020\n10\n1000\nfive\n1000\n0\n0\n";
        let mut reader = RecordReader::new("log.txt", source.to_string(), StoreFormat::Legacy);
        match reader.next() {
            Some(Err(StoreError::Record(e))) => assert_eq!(e.line, 5),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_json_line_is_reported_and_stops() {
        let good = serde_json::to_string(&record("Farnell", 0.0)).unwrap();
        let source = format!("{good}\n\n{{\"company\": 3}}\n{good}\n");
        let mut reader = RecordReader::new("qc.jsonl", source, StoreFormat::JsonLines);
        assert!(reader.next().unwrap().is_ok());
        match reader.next() {
            Some(Err(StoreError::Record(e))) => assert_eq!(e.line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_append_after_missing_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let good = serde_json::to_string(&record("Farnell", 0.0)).unwrap();
        fs::write(tmp.path().join("qc.jsonl"), &good).unwrap();

        let store = select_store(tmp.path(), "qc", OpenMode::Append).unwrap();
        store.append(&record("DigiKey", 10.0)).unwrap();
        assert_eq!(store.read_all().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_names() {
        let tmp = TempDir::new().unwrap();
        for name in ["", "  ", "../x", "a/b", "a\\b", ".hidden", ".txt"] {
            assert!(
                matches!(
                    select_store(tmp.path(), name, OpenMode::Append),
                    Err(StoreError::InvalidName(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_legacy_rejects_multiline_company() {
        assert!(matches!(
            encode_legacy(&record("Bad\nName", 0.0)),
            Err(StoreError::Unencodable(_))
        ));
    }

    #[test]
    fn test_legacy_rejects_blank_or_padded_company() {
        for company in ["", "   ", "Farnell ", " Farnell", "Tab\tEnd\t"] {
            assert!(
                matches!(
                    encode_legacy(&record(company, 0.0)),
                    Err(StoreError::Unencodable(_))
                ),
                "{company:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejected_legacy_append_leaves_log_readable() {
        let tmp = TempDir::new().unwrap();
        let store = select_store(tmp.path(), "old.txt", OpenMode::Append).unwrap();
        store.append(&record("Farnell", 0.0)).unwrap();

        assert!(store.append(&record("", 10.0)).is_err());
        assert!(store.append(&record("Farnell ", 10.0)).is_err());
        store.append(&record("DigiKey", 20.0)).unwrap();

        let companies: Vec<String> = store
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.company)
            .collect();
        assert_eq!(companies, vec!["Farnell", "DigiKey"]);
    }

    #[test]
    fn test_non_finite_record_is_not_appended() {
        let tmp = TempDir::new().unwrap();
        let store = select_store(tmp.path(), "qc", OpenMode::Append).unwrap();
        let mut bad = record("Farnell", 10.0);
        bad.variance = f64::INFINITY;
        bad.std_dev = f64::INFINITY;

        match store.append(&bad) {
            Err(StoreError::NonFinite { field, .. }) => assert_eq!(field, "standard deviation"),
            other => panic!("expected non-finite error, got {other:?}"),
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn test_only_percent_basis_is_storable() {
        assert!(ensure_storable_basis(FailureBasis::Percent).is_ok());
        assert!(matches!(
            ensure_storable_basis(FailureBasis::Count),
            Err(StoreError::CountBasis)
        ));
    }

    #[test]
    fn test_list_stores() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.jsonl"), "").unwrap();
        fs::write(tmp.path().join("a.txt"), "").unwrap();
        fs::write(tmp.path().join("notes.md"), "").unwrap();

        let stores = list_stores(tmp.path()).unwrap();
        assert_eq!(
            stores,
            vec![
                ("a".to_string(), StoreFormat::Legacy),
                ("b".to_string(), StoreFormat::JsonLines)
            ]
        );
        assert!(list_stores(&tmp.path().join("missing")).unwrap().is_empty());
    }
}
