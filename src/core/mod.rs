//! Core module - dates, input validation, configuration and log stores

pub mod config;
pub mod date;
pub mod diagnostics;
pub mod logging;
pub mod selection;
pub mod store;

pub use config::{Config, ConfigError};
pub use date::{DateError, ShipmentDate};
pub use diagnostics::RecordParseError;
pub use selection::{
    parse_bounded_int, parse_measurement, parse_measurement_list, MeasurementError,
    SelectionError,
};
pub use store::{list_stores, select_store, LogStore, OpenMode, RecordReader, StoreError, StoreFormat};
