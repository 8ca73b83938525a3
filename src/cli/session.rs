//! Interactive batch-entry session
//!
//! Drives the operation menu and the batch-entry flow through a [`Prompter`].
//! The session never prints results itself; it returns a [`SessionOutcome`]
//! for the caller to render.

use miette::{IntoDiagnostic, Report, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::cli::prompt::Prompter;
use crate::core::store::{ensure_storable_basis, select_store, LogStore, OpenMode, StoreError};
use crate::entities::bands::{
    BandRole, DigitColor, MultiplierColor, Palette, TempCoefficientColor, ToleranceColor,
};
use crate::entities::batch::BatchRecord;
use crate::entities::resistor::{BandCount, BandSet};
use crate::entities::sample::{AnalysisOptions, Sample};

/// Entries of the top-level operation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Evaluate,
    EvaluateAndStore,
    ViewLog,
    ViewLogBySupplier,
    Exit,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::Evaluate,
        Operation::EvaluateAndStore,
        Operation::ViewLog,
        Operation::ViewLogBySupplier,
        Operation::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Operation::Evaluate => "Input resistor batch",
            Operation::EvaluateAndStore => "Input batch and store data in log",
            Operation::ViewLog => "View data log",
            Operation::ViewLogBySupplier => "View data log (filtered by supplier)",
            Operation::Exit => "Exit",
        }
    }
}

/// What a finished session produced
#[derive(Debug)]
pub enum SessionOutcome {
    /// The user chose Exit; nothing was written
    Exited,
    /// A batch was evaluated but not stored
    Evaluated(BatchRecord),
    /// A batch was evaluated and appended to a store
    Stored { record: BatchRecord, store: LogStore },
    /// Records read back from a store, optionally filtered by supplier
    Listed {
        records: Vec<BatchRecord>,
        supplier: Option<String>,
        store: LogStore,
    },
    /// The requested log does not exist
    StoreMissing { name: String },
}

/// One run of the interactive menu
pub struct Session<'a, P: Prompter> {
    prompter: &'a mut P,
    suppliers: Vec<String>,
    log_dir: PathBuf,
    options: AnalysisOptions,
}

impl<'a, P: Prompter> Session<'a, P> {
    pub fn new(
        prompter: &'a mut P,
        suppliers: Vec<String>,
        log_dir: PathBuf,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            prompter,
            suppliers,
            log_dir,
            options,
        }
    }

    /// Show the operation menu and carry out the chosen operation
    pub fn run(&mut self) -> Result<SessionOutcome> {
        let labels: Vec<String> = Operation::ALL.iter().map(|o| o.label().to_string()).collect();
        let operation = Operation::ALL[self.prompter.select("Operation", &labels)?];
        debug!(?operation, "operation selected");

        match operation {
            Operation::Evaluate => Ok(match self.enter_batch()? {
                Some(record) => SessionOutcome::Evaluated(record),
                None => SessionOutcome::Exited,
            }),
            Operation::EvaluateAndStore => {
                ensure_storable_basis(self.options.failure_basis).map_err(Report::new)?;
                let store = self.ask_store(OpenMode::Append)?.map_err(Report::new)?;
                let Some(record) = self.enter_batch()? else {
                    return Ok(SessionOutcome::Exited);
                };
                store.append(&record).map_err(Report::new)?;
                Ok(SessionOutcome::Stored { record, store })
            }
            Operation::ViewLog => self.view_log(false),
            Operation::ViewLogBySupplier => self.view_log(true),
            Operation::Exit => Ok(SessionOutcome::Exited),
        }
    }

    /// Collect one batch; `None` when the user exits part-way
    pub fn enter_batch(&mut self) -> Result<Option<BatchRecord>> {
        let Some(company) = self.choose_supplier()? else {
            return Ok(None);
        };
        let date = self
            .prompter
            .date("Shipment date, ddMMyyyy (e.g. 07062020 is 7 June 2020)")?;
        let Some(bands) = self.choose_bands()? else {
            return Ok(None);
        };
        let sample = self.capture_sample()?;

        Ok(Some(BatchRecord::evaluate(
            company,
            date,
            &bands,
            &sample,
            &self.options,
        )))
    }

    /// Supplier menu, ending with Exit
    fn choose_supplier(&mut self) -> Result<Option<String>> {
        let mut options = self.suppliers.clone();
        options.push("Exit".to_string());

        let choice = self.prompter.select("Supplier", &options)?;
        Ok(self.suppliers.get(choice).cloned())
    }

    /// Band-count menu followed by one palette menu per band
    fn choose_bands(&mut self) -> Result<Option<BandSet>> {
        let mut options: Vec<String> = BandCount::ALL
            .iter()
            .map(|c| format!("{} Band Resistors", c.bands()))
            .collect();
        options.push("Exit".to_string());

        let choice = self.prompter.select("Band count", &options)?;
        let Some(&band_count) = BandCount::ALL.get(choice) else {
            return Ok(None);
        };

        let mut indices = Vec::with_capacity(band_count.bands());
        for position in 0..band_count.bands() {
            let role = band_role(band_count, position);
            let title = format!("Band {} ({})", position + 1, role);
            indices.push(self.prompter.select(&title, &palette_names(role))?);
        }

        BandSet::from_indices(band_count, &indices)
            .map(Some)
            .into_diagnostic()
    }

    fn capture_sample(&mut self) -> Result<Sample> {
        let n = self.options.sample_size;
        let mut values = Vec::with_capacity(n);
        for i in 1..=n {
            values.push(
                self.prompter
                    .measurement(&format!("Measured resistance of resistor {} (ohms)", i))?,
            );
        }
        Sample::new(values, n).into_diagnostic()
    }

    /// Ask for a log name, re-asking while the name is invalid
    fn ask_store(&mut self, mode: OpenMode) -> Result<std::result::Result<LogStore, StoreError>> {
        loop {
            let name = self.prompter.text("Log name")?;
            match select_store(&self.log_dir, &name, mode) {
                Err(e @ StoreError::InvalidName(_)) => self.prompter.notice(&e.to_string())?,
                resolved => return Ok(resolved),
            }
        }
    }

    fn view_log(&mut self, by_supplier: bool) -> Result<SessionOutcome> {
        let store = match self.ask_store(OpenMode::Read)? {
            Ok(store) => store,
            Err(StoreError::NotFound { name, .. }) => {
                return Ok(SessionOutcome::StoreMissing { name })
            }
            Err(e) => return Err(Report::new(e)),
        };

        let supplier = if by_supplier {
            match self.choose_supplier()? {
                Some(s) => Some(s),
                None => return Ok(SessionOutcome::Exited),
            }
        } else {
            None
        };

        let records: Vec<BatchRecord> = store
            .read_all()
            .map_err(Report::new)?
            .into_iter()
            .filter(|r| supplier.as_deref().map_or(true, |s| r.is_from(s)))
            .collect();

        Ok(SessionOutcome::Listed {
            records,
            supplier,
            store,
        })
    }
}

/// Role of the band at `position` for a given band count
pub fn band_role(band_count: BandCount, position: usize) -> BandRole {
    let digits = band_count.digit_bands();
    match position {
        p if p < digits => BandRole::Digit,
        p if p == digits => BandRole::Multiplier,
        p if p == digits + 1 => BandRole::Tolerance,
        _ => BandRole::TempCoefficient,
    }
}

/// Menu entries for a role's palette
pub fn palette_names(role: BandRole) -> Vec<String> {
    let names = match role {
        BandRole::Digit => DigitColor::names(),
        BandRole::Multiplier => MultiplierColor::names(),
        BandRole::Tolerance => ToleranceColor::names(),
        BandRole::TempCoefficient => TempCoefficientColor::names(),
    };
    names.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompt::LinePrompter;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn suppliers() -> Vec<String> {
        ["Farnell", "RSComponents", "Rapid Electronics", "DigiKey"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn run_with(input: &str, dir: &TempDir, options: AnalysisOptions) -> Result<SessionOutcome> {
        let mut prompter = LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let mut session = Session::new(&mut prompter, suppliers(), dir.path().to_path_buf(), options);
        session.run()
    }

    fn run(input: &str, dir: &TempDir) -> SessionOutcome {
        run_with(input, dir, AnalysisOptions::default()).unwrap()
    }

    /// Supplier 1, date, 4-band Brown Black Red Gold, nine 1000s and one 1100
    fn batch_answers() -> String {
        let mut answers = String::from("1\n07062020\n1\n2\n1\n5\n2\n");
        for _ in 0..9 {
            answers.push_str("1000\n");
        }
        answers.push_str("1100\n");
        answers
    }

    #[test]
    fn test_exit_writes_nothing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(run("5\n", &dir), SessionOutcome::Exited));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_evaluate_scenario() {
        let dir = TempDir::new().unwrap();
        match run(&format!("1\n{}", batch_answers()), &dir) {
            SessionOutcome::Evaluated(record) => {
                assert_eq!(record.company, "Farnell");
                assert_eq!(record.nominal, 1000.0);
                assert_eq!(record.failure_rate, 10.0);
                assert!((record.mean - 1010.0).abs() < 1e-9);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_supplier_exit_ends_batch() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(run("1\n5\n", &dir), SessionOutcome::Exited));
    }

    #[test]
    fn test_band_count_exit_ends_batch() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(run("1\n2\n01012021\n4\n", &dir), SessionOutcome::Exited));
    }

    #[test]
    fn test_store_then_view() {
        let dir = TempDir::new().unwrap();
        match run(&format!("2\nqc\n{}", batch_answers()), &dir) {
            SessionOutcome::Stored { store, .. } => assert!(store.path().is_file()),
            other => panic!("unexpected outcome {other:?}"),
        }

        match run("3\nqc\n", &dir) {
            SessionOutcome::Listed { records, supplier, .. } => {
                assert_eq!(records.len(), 1);
                assert!(supplier.is_none());
            }
            other => panic!("unexpected outcome {other:?}"),
        }

        match run("4\nqc\n4\n", &dir) {
            SessionOutcome::Listed { records, supplier, .. } => {
                assert!(records.is_empty());
                assert_eq!(supplier.as_deref(), Some("DigiKey"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_view_missing_log() {
        let dir = TempDir::new().unwrap();
        match run("3\nmissing\n", &dir) {
            SessionOutcome::StoreMissing { name } => assert_eq!(name, "missing"),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_invalid_log_name_is_reasked() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            run("3\n../etc\nmissing\n", &dir),
            SessionOutcome::StoreMissing { .. }
        ));
    }

    #[test]
    fn test_store_refused_on_count_basis() {
        let dir = TempDir::new().unwrap();
        let options = AnalysisOptions {
            failure_basis: crate::entities::sample::FailureBasis::Count,
            ..AnalysisOptions::default()
        };
        let err = run_with(&format!("2\nqc\n{}", batch_answers()), &dir, options).unwrap_err();
        assert!(err.to_string().contains("percent failure rates"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_overflowing_sample_is_not_stored() {
        let dir = TempDir::new().unwrap();
        let mut answers = String::from("2\nqc\n1\n07062020\n1\n2\n1\n5\n2\n");
        for _ in 0..9 {
            answers.push_str("1000\n");
        }
        answers.push_str("1e200\n");

        let err = run_with(&answers, &dir, AnalysisOptions::default()).unwrap_err();
        assert!(err.to_string().contains("cannot be stored"));
        assert!(!dir.path().join("qc.jsonl").exists());
    }

    #[test]
    fn test_six_band_roles() {
        let roles: Vec<BandRole> = (0..6).map(|p| band_role(BandCount::Six, p)).collect();
        assert_eq!(
            roles,
            vec![
                BandRole::Digit,
                BandRole::Digit,
                BandRole::Digit,
                BandRole::Multiplier,
                BandRole::Tolerance,
                BandRole::TempCoefficient
            ]
        );
        assert_eq!(band_role(BandCount::Four, 2), BandRole::Multiplier);
        assert_eq!(palette_names(BandRole::Tolerance).len(), 7);
    }
}
