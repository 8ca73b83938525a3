//! Band palettes and decoders
//!
//! Each band role (digit, multiplier, tolerance, temperature coefficient) has
//! its own closed, ordered palette. A color only has a meaning relative to the
//! palette it was picked from: "Red" is digit 2, multiplier 10², tolerance 2%
//! and 50 ppm/K depending on the band.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The role a band plays in a resistor color code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandRole {
    Digit,
    Multiplier,
    Tolerance,
    TempCoefficient,
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandRole::Digit => write!(f, "digit"),
            BandRole::Multiplier => write!(f, "multiplier"),
            BandRole::Tolerance => write!(f, "tolerance"),
            BandRole::TempCoefficient => write!(f, "temperature coefficient"),
        }
    }
}

/// Errors raised while decoding a band
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DecodeError {
    #[error("the {role} palette has no entry at index {index} (valid: 0..{len})")]
    #[diagnostic(code(rqc::decode::index))]
    IndexOutOfRange {
        role: BandRole,
        index: usize,
        len: usize,
    },

    #[error("'{name}' is not a {role} band color")]
    #[diagnostic(code(rqc::decode::color), help("valid {role} colors: {valid}"))]
    UnknownColor {
        role: BandRole,
        name: String,
        valid: String,
    },
}

/// A fixed, ordered color palette for one band role
pub trait Palette: Copy + Sized + 'static {
    /// Role this palette encodes
    const ROLE: BandRole;

    /// Every color of the palette, in palette order
    const ALL: &'static [Self];

    /// Display name of the color
    fn name(&self) -> &'static str;

    /// Look a color up by its 0-based palette position
    fn from_index(index: usize) -> Result<Self, DecodeError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(DecodeError::IndexOutOfRange {
                role: Self::ROLE,
                index,
                len: Self::ALL.len(),
            })
    }

    /// Look a color up by name (case-insensitive, "gray" accepted for "grey")
    fn from_name(name: &str) -> Result<Self, DecodeError> {
        let wanted = name.trim().to_lowercase().replace("gray", "grey");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().to_lowercase() == wanted)
            .ok_or_else(|| DecodeError::UnknownColor {
                role: Self::ROLE,
                name: name.trim().to_string(),
                valid: Self::names().join(", "),
            })
    }

    /// Palette names in order, for menus
    fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.name()).collect()
    }
}

/// Significant-figure band color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigitColor {
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
    Grey,
    White,
}

impl DigitColor {
    /// Digit value 0-9
    pub fn digit(self) -> u8 {
        match self {
            DigitColor::Black => 0,
            DigitColor::Brown => 1,
            DigitColor::Red => 2,
            DigitColor::Orange => 3,
            DigitColor::Yellow => 4,
            DigitColor::Green => 5,
            DigitColor::Blue => 6,
            DigitColor::Violet => 7,
            DigitColor::Grey => 8,
            DigitColor::White => 9,
        }
    }
}

impl Palette for DigitColor {
    const ROLE: BandRole = BandRole::Digit;
    const ALL: &'static [Self] = &[
        DigitColor::Black,
        DigitColor::Brown,
        DigitColor::Red,
        DigitColor::Orange,
        DigitColor::Yellow,
        DigitColor::Green,
        DigitColor::Blue,
        DigitColor::Violet,
        DigitColor::Grey,
        DigitColor::White,
    ];

    fn name(&self) -> &'static str {
        match self {
            DigitColor::Black => "Black",
            DigitColor::Brown => "Brown",
            DigitColor::Red => "Red",
            DigitColor::Orange => "Orange",
            DigitColor::Yellow => "Yellow",
            DigitColor::Green => "Green",
            DigitColor::Blue => "Blue",
            DigitColor::Violet => "Violet",
            DigitColor::Grey => "Grey",
            DigitColor::White => "White",
        }
    }
}

/// Multiplier band color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiplierColor {
    Silver,
    Gold,
    Black,
    Brown,
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Violet,
}

impl MultiplierColor {
    /// Power-of-ten scale factor
    pub fn multiplier(self) -> f64 {
        match self {
            MultiplierColor::Silver => 0.01,
            MultiplierColor::Gold => 0.1,
            MultiplierColor::Black => 1.0,
            MultiplierColor::Brown => 10.0,
            MultiplierColor::Red => 100.0,
            MultiplierColor::Orange => 1_000.0,
            MultiplierColor::Yellow => 10_000.0,
            MultiplierColor::Green => 100_000.0,
            MultiplierColor::Blue => 1_000_000.0,
            MultiplierColor::Violet => 10_000_000.0,
        }
    }
}

impl Palette for MultiplierColor {
    const ROLE: BandRole = BandRole::Multiplier;
    const ALL: &'static [Self] = &[
        MultiplierColor::Silver,
        MultiplierColor::Gold,
        MultiplierColor::Black,
        MultiplierColor::Brown,
        MultiplierColor::Red,
        MultiplierColor::Orange,
        MultiplierColor::Yellow,
        MultiplierColor::Green,
        MultiplierColor::Blue,
        MultiplierColor::Violet,
    ];

    fn name(&self) -> &'static str {
        match self {
            MultiplierColor::Silver => "Silver",
            MultiplierColor::Gold => "Gold",
            MultiplierColor::Black => "Black",
            MultiplierColor::Brown => "Brown",
            MultiplierColor::Red => "Red",
            MultiplierColor::Orange => "Orange",
            MultiplierColor::Yellow => "Yellow",
            MultiplierColor::Green => "Green",
            MultiplierColor::Blue => "Blue",
            MultiplierColor::Violet => "Violet",
        }
    }
}

/// Tolerance band color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceColor {
    Silver,
    Gold,
    Brown,
    Red,
    Green,
    Blue,
    Violet,
}

impl ToleranceColor {
    /// Tolerance as a fraction of nominal (0.05 for ±5%)
    pub fn fraction(self) -> f64 {
        match self {
            ToleranceColor::Silver => 0.1,
            ToleranceColor::Gold => 0.05,
            ToleranceColor::Brown => 0.01,
            ToleranceColor::Red => 0.02,
            ToleranceColor::Green => 0.005,
            ToleranceColor::Blue => 0.0025,
            ToleranceColor::Violet => 0.001,
        }
    }
}

impl Palette for ToleranceColor {
    const ROLE: BandRole = BandRole::Tolerance;
    const ALL: &'static [Self] = &[
        ToleranceColor::Silver,
        ToleranceColor::Gold,
        ToleranceColor::Brown,
        ToleranceColor::Red,
        ToleranceColor::Green,
        ToleranceColor::Blue,
        ToleranceColor::Violet,
    ];

    fn name(&self) -> &'static str {
        match self {
            ToleranceColor::Silver => "Silver",
            ToleranceColor::Gold => "Gold",
            ToleranceColor::Brown => "Brown",
            ToleranceColor::Red => "Red",
            ToleranceColor::Green => "Green",
            ToleranceColor::Blue => "Blue",
            ToleranceColor::Violet => "Violet",
        }
    }
}

/// Temperature coefficient band color (6-band resistors only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempCoefficientColor {
    Brown,
    Red,
    Orange,
    Yellow,
}

impl TempCoefficientColor {
    /// Coefficient class in ppm/K. Informational only.
    pub fn ppm_per_kelvin(self) -> u32 {
        match self {
            TempCoefficientColor::Brown => 100,
            TempCoefficientColor::Red => 50,
            TempCoefficientColor::Orange => 15,
            TempCoefficientColor::Yellow => 25,
        }
    }
}

impl Palette for TempCoefficientColor {
    const ROLE: BandRole = BandRole::TempCoefficient;
    const ALL: &'static [Self] = &[
        TempCoefficientColor::Brown,
        TempCoefficientColor::Red,
        TempCoefficientColor::Orange,
        TempCoefficientColor::Yellow,
    ];

    fn name(&self) -> &'static str {
        match self {
            TempCoefficientColor::Brown => "Brown",
            TempCoefficientColor::Red => "Red",
            TempCoefficientColor::Orange => "Orange",
            TempCoefficientColor::Yellow => "Yellow",
        }
    }
}

macro_rules! impl_display_via_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

impl_display_via_name!(DigitColor, MultiplierColor, ToleranceColor, TempCoefficientColor);

/// Decode a digit-palette index to its digit value
pub fn decode_digit(index: usize) -> Result<u8, DecodeError> {
    DigitColor::from_index(index).map(DigitColor::digit)
}

/// Decode a multiplier-palette index to its scale factor
pub fn decode_multiplier(index: usize) -> Result<f64, DecodeError> {
    MultiplierColor::from_index(index).map(MultiplierColor::multiplier)
}

/// Decode a tolerance-palette index to its tolerance fraction
pub fn decode_tolerance(index: usize) -> Result<f64, DecodeError> {
    ToleranceColor::from_index(index).map(ToleranceColor::fraction)
}

/// Decode a temperature-coefficient-palette index to its ppm/K class
pub fn decode_temp_coefficient(index: usize) -> Result<u32, DecodeError> {
    TempCoefficientColor::from_index(index).map(TempCoefficientColor::ppm_per_kelvin)
}
