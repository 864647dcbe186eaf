use thiserror::Error;

/// Failures of the numeral formatter, its companion parser and the amount helpers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumeralError {
    #[error("Value {value} exceeds the supported maximum {max}")]
    OutOfRange { value: String, max: u64 },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unexpected character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("Malformed numeral: {0}")]
    Malformed(String),

    #[error("Invalid amount '{0}': expected digits with at most two decimals")]
    InvalidAmount(String),
}

/// Failures of the long-to-wide pivot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReshapeError {
    #[error("Missing data point for company '{company}' in month {month}")]
    MissingDataPoint { company: String, month: u8 },

    #[error("Duplicate data point for company '{company}' in month {month}")]
    DuplicateDataPoint { company: String, month: u8 },
}
