//! BATCH record - the summary of one evaluated shipment sample

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::date::ShipmentDate;
use crate::entities::resistor::BandSet;
use crate::entities::sample::{AnalysisOptions, Sample};

/// Summary of one evaluated batch, the unit of display and persistence
///
/// Field order matches the stored record layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Supplier the shipment came from
    pub company: String,

    /// Shipment date
    pub date: ShipmentDate,

    /// Failure rate (0-100 on the percent basis)
    pub failure_rate: f64,

    /// Nominal resistance decoded from the color bands
    #[serde(rename = "nominal_ohms")]
    pub nominal: f64,

    /// Tolerance fraction (0.05 for ±5%)
    pub tolerance: f64,

    /// Mean measured resistance
    #[serde(rename = "mean_ohms")]
    pub mean: f64,

    /// Standard deviation of the measurements
    pub std_dev: f64,

    /// Variance of the measurements
    pub variance: f64,
}

impl BatchRecord {
    /// Collect already-computed figures into a record
    #[allow(clippy::too_many_arguments)]
    pub fn assemble(
        company: impl Into<String>,
        date: ShipmentDate,
        nominal: f64,
        tolerance: f64,
        mean: f64,
        std_dev: f64,
        variance: f64,
        failure_rate: f64,
    ) -> Self {
        Self {
            company: company.into(),
            date,
            failure_rate,
            nominal,
            tolerance,
            mean,
            std_dev,
            variance,
        }
    }

    /// Decode the bands, judge the sample against the window and summarize
    pub fn evaluate(
        company: impl Into<String>,
        date: ShipmentDate,
        bands: &BandSet,
        sample: &Sample,
        options: &AnalysisOptions,
    ) -> Self {
        let nominal = bands.nominal();
        let tolerance = bands.tolerance().fraction();
        let window = bands.window();
        let stats = sample.stats(options.spread);
        let conformance = sample.conformance(&window, options.failure_basis);

        debug!(
            bands = ?bands.color_names(),
            nominal,
            min = window.min,
            max = window.max,
            failing = conformance.failing,
            "evaluated batch"
        );

        Self::assemble(
            company,
            date,
            nominal,
            tolerance,
            stats.mean,
            stats.std_dev,
            stats.variance,
            conformance.failure_rate,
        )
    }

    /// True when the supplier name matches (case-insensitive, trimmed)
    pub fn is_from(&self, supplier: &str) -> bool {
        self.company.trim().eq_ignore_ascii_case(supplier.trim())
    }
}
