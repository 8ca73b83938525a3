//! Shipment dates in `ddMMyyyy` form

use chrono::{Datelike, NaiveDate};
use miette::Diagnostic;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing a shipment date
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum DateError {
    #[error("'{0}' is not in the form ddMMyyyy")]
    #[diagnostic(
        code(rqc::date::format),
        help("enter eight digits, e.g. 07062020 for 7 June 2020")
    )]
    Format(String),

    #[error("{day:02}/{month:02}/{year:04} is not a calendar date")]
    #[diagnostic(code(rqc::date::calendar))]
    NoSuchDate { day: u32, month: u32, year: i32 },
}

/// A validated calendar date, written as `ddMMyyyy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShipmentDate(NaiveDate);

impl ShipmentDate {
    /// Parse an eight-digit `ddMMyyyy` string, rejecting impossible dates
    pub fn parse(raw: &str) -> Result<Self, DateError> {
        let raw = raw.trim();
        if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DateError::Format(raw.to_string()));
        }

        // All eight bytes are ASCII digits, so these slices and parses hold
        let day: u32 = raw[0..2].parse().map_err(|_| DateError::Format(raw.to_string()))?;
        let month: u32 = raw[2..4].parse().map_err(|_| DateError::Format(raw.to_string()))?;
        let year: i32 = raw[4..8].parse().map_err(|_| DateError::Format(raw.to_string()))?;

        if year < 1 {
            return Err(DateError::NoSuchDate { day, month, year });
        }

        NaiveDate::from_ymd_opt(year, month, day)
            .map(ShipmentDate)
            .ok_or(DateError::NoSuchDate { day, month, year })
    }

    /// The underlying calendar date
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Human-readable form (dd/mm/yyyy)
    pub fn display_long(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }
}

impl From<NaiveDate> for ShipmentDate {
    fn from(date: NaiveDate) -> Self {
        ShipmentDate(date)
    }
}

impl fmt::Display for ShipmentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:02}{:04}",
            self.0.day(),
            self.0.month(),
            self.0.year()
        )
    }
}

impl FromStr for ShipmentDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShipmentDate::parse(s)
    }
}

impl Serialize for ShipmentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ShipmentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ShipmentDate::parse(&raw).map_err(serde::de::Error::custom)
    }
}
