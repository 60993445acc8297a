use std::fmt;
use std::io;

use polars::prelude::PolarsError;
use serde_json::Error as SerdeJsonError;

use crate::normalizer::MissingColumns;

#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    Csv(csv::Error),
    Serialization(SerdeJsonError),
    DataFrame(PolarsError),
    Schema(MissingColumns),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::DataFrame(err) => write!(f, "dataframe conversion error: {err}"),
            PersistenceError::Schema(err) => write!(f, "{err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<PolarsError> for PersistenceError {
    fn from(value: PolarsError) -> Self {
        Self::DataFrame(value)
    }
}

impl From<MissingColumns> for PersistenceError {
    fn from(value: MissingColumns) -> Self {
        Self::Schema(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub mod file;

pub use file::{
    load_export_from_csv, load_export_from_json, pivot_csv_filename, read_export,
    save_export_to_json, save_pivot_to_csv, save_pivots_to_dir,
};
