//! Resistor color codes - band sets, nominal value and tolerance window

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::entities::bands::{
    DecodeError, DigitColor, MultiplierColor, Palette, TempCoefficientColor, ToleranceColor,
};

/// Number of color bands printed on the resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BandCount {
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
}

impl BandCount {
    /// All supported band counts, in menu order
    pub const ALL: [BandCount; 3] = [BandCount::Four, BandCount::Five, BandCount::Six];

    /// Total number of bands
    pub fn bands(self) -> usize {
        match self {
            BandCount::Four => 4,
            BandCount::Five => 5,
            BandCount::Six => 6,
        }
    }

    /// Number of significant-figure bands
    pub fn digit_bands(self) -> usize {
        match self {
            BandCount::Four => 2,
            BandCount::Five | BandCount::Six => 3,
        }
    }

    /// Band count from a number of bands
    pub fn from_bands(bands: usize) -> Result<Self, NominalError> {
        match bands {
            4 => Ok(BandCount::Four),
            5 => Ok(BandCount::Five),
            6 => Ok(BandCount::Six),
            other => Err(NominalError::UnsupportedBandCount(other)),
        }
    }
}

impl fmt::Display for BandCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-band", self.bands())
    }
}

/// Errors raised while building a band set or computing a nominal value
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum NominalError {
    #[error("{0} bands is not a supported color code")]
    #[diagnostic(code(rqc::nominal::band_count), help("resistors carry 4, 5 or 6 bands"))]
    UnsupportedBandCount(usize),

    #[error("a {band_count} resistor has {expected} digit bands, got {found}")]
    #[diagnostic(code(rqc::nominal::digits))]
    DigitCountMismatch {
        band_count: BandCount,
        expected: usize,
        found: usize,
    },

    #[error("digit {0} is outside 0-9")]
    #[diagnostic(code(rqc::nominal::digit))]
    DigitOutOfRange(u8),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Decode(#[from] DecodeError),
}

/// Compute the nominal resistance in ohms from decoded digits and multiplier
///
/// 4-band codes use two significant figures, 5- and 6-band codes use three.
/// The temperature coefficient of a 6-band code plays no part here.
pub fn compute_nominal(
    band_count: BandCount,
    digits: &[u8],
    multiplier: f64,
) -> Result<f64, NominalError> {
    let expected = band_count.digit_bands();
    if digits.len() != expected {
        return Err(NominalError::DigitCountMismatch {
            band_count,
            expected,
            found: digits.len(),
        });
    }
    if let Some(&bad) = digits.iter().find(|&&d| d > 9) {
        return Err(NominalError::DigitOutOfRange(bad));
    }

    Ok(f64::from(significand(digits)) * multiplier)
}

/// Significant figures read as one integer
fn significand(digits: &[u8]) -> u32 {
    digits
        .iter()
        .fold(0u32, |acc, &d| acc * 10 + u32::from(d))
}

/// A resistor's complete color encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandSet {
    Four {
        digits: [DigitColor; 2],
        multiplier: MultiplierColor,
        tolerance: ToleranceColor,
    },
    Five {
        digits: [DigitColor; 3],
        multiplier: MultiplierColor,
        tolerance: ToleranceColor,
    },
    Six {
        digits: [DigitColor; 3],
        multiplier: MultiplierColor,
        tolerance: ToleranceColor,
        temp_coefficient: TempCoefficientColor,
    },
}

impl BandSet {
    /// Build a band set from 0-based palette indices, one per band in order
    pub fn from_indices(band_count: BandCount, indices: &[usize]) -> Result<Self, NominalError> {
        Self::build(
            band_count,
            indices,
            |i| DigitColor::from_index(*i),
            |i| MultiplierColor::from_index(*i),
            |i| ToleranceColor::from_index(*i),
            |i| TempCoefficientColor::from_index(*i),
        )
    }

    /// Build a band set from color names, one per band in order
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, NominalError> {
        let band_count = BandCount::from_bands(names.len())?;
        Self::build(
            band_count,
            names,
            |n| DigitColor::from_name(n.as_ref()),
            |n| MultiplierColor::from_name(n.as_ref()),
            |n| ToleranceColor::from_name(n.as_ref()),
            |n| TempCoefficientColor::from_name(n.as_ref()),
        )
    }

    fn build<T>(
        band_count: BandCount,
        bands: &[T],
        digit: impl Fn(&T) -> Result<DigitColor, DecodeError>,
        multiplier: impl Fn(&T) -> Result<MultiplierColor, DecodeError>,
        tolerance: impl Fn(&T) -> Result<ToleranceColor, DecodeError>,
        temp_coefficient: impl Fn(&T) -> Result<TempCoefficientColor, DecodeError>,
    ) -> Result<Self, NominalError> {
        if bands.len() != band_count.bands() {
            return Err(NominalError::UnsupportedBandCount(bands.len()));
        }

        let set = match band_count {
            BandCount::Four => BandSet::Four {
                digits: [digit(&bands[0])?, digit(&bands[1])?],
                multiplier: multiplier(&bands[2])?,
                tolerance: tolerance(&bands[3])?,
            },
            BandCount::Five => BandSet::Five {
                digits: [digit(&bands[0])?, digit(&bands[1])?, digit(&bands[2])?],
                multiplier: multiplier(&bands[3])?,
                tolerance: tolerance(&bands[4])?,
            },
            BandCount::Six => BandSet::Six {
                digits: [digit(&bands[0])?, digit(&bands[1])?, digit(&bands[2])?],
                multiplier: multiplier(&bands[3])?,
                tolerance: tolerance(&bands[4])?,
                temp_coefficient: temp_coefficient(&bands[5])?,
            },
        };

        Ok(set)
    }

    /// Band count of this code
    pub fn band_count(&self) -> BandCount {
        match self {
            BandSet::Four { .. } => BandCount::Four,
            BandSet::Five { .. } => BandCount::Five,
            BandSet::Six { .. } => BandCount::Six,
        }
    }

    /// Decoded significant figures
    pub fn digits(&self) -> Vec<u8> {
        let colors: &[DigitColor] = match self {
            BandSet::Four { digits, .. } => digits,
            BandSet::Five { digits, .. } | BandSet::Six { digits, .. } => digits,
        };
        colors.iter().map(|c| c.digit()).collect()
    }

    pub fn multiplier(&self) -> MultiplierColor {
        match self {
            BandSet::Four { multiplier, .. }
            | BandSet::Five { multiplier, .. }
            | BandSet::Six { multiplier, .. } => *multiplier,
        }
    }

    pub fn tolerance(&self) -> ToleranceColor {
        match self {
            BandSet::Four { tolerance, .. }
            | BandSet::Five { tolerance, .. }
            | BandSet::Six { tolerance, .. } => *tolerance,
        }
    }

    /// Temperature coefficient band, present on 6-band codes only
    pub fn temp_coefficient(&self) -> Option<TempCoefficientColor> {
        match self {
            BandSet::Six {
                temp_coefficient, ..
            } => Some(*temp_coefficient),
            _ => None,
        }
    }

    /// Nominal resistance in ohms
    pub fn nominal(&self) -> f64 {
        f64::from(significand(&self.digits())) * self.multiplier().multiplier()
    }

    /// Tolerance window around the nominal value
    pub fn window(&self) -> ToleranceWindow {
        ToleranceWindow::new(self.nominal(), self.tolerance().fraction())
    }

    /// Color names in band order
    pub fn color_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = match self {
            BandSet::Four { digits, .. } => digits.iter().map(|d| d.name()).collect(),
            BandSet::Five { digits, .. } | BandSet::Six { digits, .. } => {
                digits.iter().map(|d| d.name()).collect()
            }
        };
        names.push(self.multiplier().name());
        names.push(self.tolerance().name());
        if let Some(tc) = self.temp_coefficient() {
            names.push(tc.name());
        }
        names
    }
}

/// Inclusive acceptance window around a nominal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToleranceWindow {
    /// Lowest conforming resistance
    pub min: f64,

    /// Highest conforming resistance
    pub max: f64,
}

impl ToleranceWindow {
    /// Window of `nominal ± nominal * fraction`
    pub fn new(nominal: f64, fraction: f64) -> Self {
        let delta = nominal * fraction;
        Self {
            min: nominal - delta,
            max: nominal + delta,
        }
    }

    /// True when the measurement lies within [min, max]
    pub fn contains(&self, measurement: f64) -> bool {
        !(measurement < self.min || measurement > self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_four_band_nominal_formula() {
        for d1 in 0..10u8 {
            for d2 in 0..10u8 {
                for m in [0.01, 0.1, 1.0, 1e3, 1e7] {
                    let nominal = compute_nominal(BandCount::Four, &[d1, d2], m).unwrap();
                    assert_eq!(nominal, f64::from(d1 * 10 + d2) * m);
                }
            }
        }
    }

    #[test]
    fn test_three_digit_nominal_formula() {
        for count in [BandCount::Five, BandCount::Six] {
            for (d1, d2, d3) in [(0, 0, 0), (1, 0, 0), (4, 7, 1), (9, 9, 9)] {
                let expected = f64::from(u32::from(d1) * 100 + u32::from(d2) * 10 + u32::from(d3));
                let nominal = compute_nominal(count, &[d1, d2, d3], 10.0).unwrap();
                assert_eq!(nominal, expected * 10.0);
            }
        }
    }

    #[test]
    fn test_nominal_rejects_wrong_digit_count() {
        let err = compute_nominal(BandCount::Four, &[1, 0, 0], 1.0).unwrap_err();
        assert_eq!(
            err,
            NominalError::DigitCountMismatch {
                band_count: BandCount::Four,
                expected: 2,
                found: 3,
            }
        );
        assert!(compute_nominal(BandCount::Six, &[1, 0], 1.0).is_err());
        assert!(compute_nominal(BandCount::Five, &[1, 0, 12], 1.0).is_err());
    }

    #[test]
    fn test_brown_black_red_gold() {
        let set = BandSet::from_names(&["Brown", "Black", "Red", "Gold"]).unwrap();
        assert_eq!(set.band_count(), BandCount::Four);
        assert_eq!(set.nominal(), 1000.0);

        let window = set.window();
        assert!((window.min - 950.0).abs() < 1e-9);
        assert!((window.max - 1050.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_indices_uses_role_palettes() {
        // Brown, Black (digits), Red (multiplier index 4), Gold (tolerance index 1)
        let set = BandSet::from_indices(BandCount::Four, &[1, 0, 4, 1]).unwrap();
        assert_eq!(set.digits(), vec![1, 0]);
        assert_eq!(set.multiplier(), MultiplierColor::Red);
        assert_eq!(set.tolerance(), ToleranceColor::Gold);
        assert_eq!(set.temp_coefficient(), None);
    }

    #[test]
    fn test_six_band_temp_coefficient_does_not_change_nominal() {
        let a = BandSet::from_names(&["orange", "orange", "black", "brown", "brown", "brown"]).unwrap();
        let b = BandSet::from_names(&["orange", "orange", "black", "brown", "brown", "yellow"]).unwrap();
        assert_eq!(a.nominal(), 3300.0);
        assert_eq!(a.nominal(), b.nominal());
        assert_eq!(b.temp_coefficient(), Some(TempCoefficientColor::Yellow));
    }

    #[test]
    fn test_band_set_nominal_matches_formula() {
        for names in [
            vec!["Brown", "Black", "Red", "Gold"],
            vec!["White", "White", "White", "Violet", "Brown"],
            vec!["Red", "Violet", "Green", "Silver", "Green", "Red"],
        ] {
            let set = BandSet::from_names(&names).unwrap();
            let expected =
                compute_nominal(set.band_count(), &set.digits(), set.multiplier().multiplier()).unwrap();
            assert_eq!(set.nominal(), expected, "{names:?}");
            assert!(set.nominal().is_finite());
        }
    }

    #[test]
    fn test_fractional_multipliers() {
        let set = BandSet::from_names(&["Yellow", "Violet", "Gold", "Silver"]).unwrap();
        assert!((set.nominal() - 4.7).abs() < 1e-12);
        assert_eq!(set.tolerance().fraction(), 0.1);
    }

    #[test]
    fn test_band_set_errors() {
        assert_eq!(
            BandSet::from_names(&["brown", "black", "red"]).unwrap_err(),
            NominalError::UnsupportedBandCount(3)
        );
        assert!(matches!(
            BandSet::from_indices(BandCount::Five, &[1, 0, 0, 2, 9]).unwrap_err(),
            NominalError::Decode(DecodeError::IndexOutOfRange { index: 9, .. })
        ));
        assert!(matches!(
            BandSet::from_names(&["brown", "black", "gold", "gold"]),
            Ok(BandSet::Four { .. })
        ));
        assert!(BandSet::from_names(&["gold", "black", "red", "gold"]).is_err());
    }

    #[test]
    fn test_color_names_round_trip() {
        let names = ["Green", "Blue", "Black", "Orange", "Brown", "Red"];
        let set = BandSet::from_names(&names).unwrap();
        assert_eq!(set.color_names(), names.to_vec());
    }

    #[test]
    fn test_window_is_symmetric() {
        for nominal in [0.47, 10.0, 1000.0, 4.7e6] {
            for fraction in [0.1, 0.05, 0.01, 0.02, 0.005, 0.0025, 0.001] {
                let w = ToleranceWindow::new(nominal, fraction);
                let upper = w.max - nominal;
                let lower = nominal - w.min;
                assert!((upper - lower).abs() <= nominal * 1e-12);
            }
        }
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let w = ToleranceWindow { min: 950.0, max: 1050.0 };
        assert!(w.contains(950.0));
        assert!(w.contains(1050.0));
        assert!(w.contains(1000.0));
        assert!(!w.contains(949.999));
        assert!(!w.contains(1050.001));
    }
}
