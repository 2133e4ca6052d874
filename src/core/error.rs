//! Error types for data file loading.

use thiserror::Error;

/// Errors that can occur when loading agent tuning or combo data.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },

    /// A numeric field is negative or not finite.
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f32 },

    /// A combo definition could not be registered.
    #[error("Combo '{name}' rejected: {source}")]
    Combo {
        name: String,
        #[source]
        source: crate::combo::ComboError,
    },
}
