//! Domain types - color codes, samples and batch records

pub mod bands;
pub mod batch;
pub mod resistor;
pub mod sample;

pub use bands::{
    decode_digit, decode_multiplier, decode_temp_coefficient, decode_tolerance, BandRole,
    DecodeError, DigitColor, MultiplierColor, Palette, TempCoefficientColor, ToleranceColor,
};
pub use batch::BatchRecord;
pub use resistor::{compute_nominal, BandCount, BandSet, NominalError, ToleranceWindow};
pub use sample::{
    AnalysisOptions, Conformance, FailureBasis, Sample, SampleError, SampleStats,
    SpreadConvention, DEFAULT_SAMPLE_SIZE,
};
