//! # Errors
//! Errors emitted by oprisk_core

/// Define all errors which may be raised by this crate.
///
/// The variants mirror the categories a caller needs to tell apart: a table which
/// is shaped wrong (missing columns, wrong column types) versus parameters which are
/// out of their allowed bounds.
use polars::prelude::PolarsError;
use std::{error, fmt};

/// oprisk specific result.
pub type OpRiskResult<T> = Result<T, Error>;

/// Possible Errors which may be raised by this crate.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Column or value has the wrong type, for example non-numeric loss amounts.
    TypeError(String),

    /// A required column is missing from the table.
    KeyError(String),

    /// Input or variable exceeded expected or allowed bounds.
    ValueError(String),

    /// Numerical method did not converge within the algorithms limits.
    Convergence(String),

    /// The underlying table library failed.
    Table(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TypeError(s) => {
                write!(f, "{}", s)
            }
            Error::KeyError(s) => {
                write!(f, "{}", s)
            }
            Error::ValueError(s) => {
                write!(f, "{}", s)
            }
            Error::Convergence(s) => {
                write!(f, "{}", s)
            }
            Error::Table(s) => {
                write!(f, "Table operation failed: {}", s)
            }
        }
    }
}

impl From<PolarsError> for Error {
    fn from(error: PolarsError) -> Self {
        Error::Table(error.to_string())
    }
}
