use thiserror::Error;

use crate::chemistry::catalog::Salt;

#[derive(Error, Debug)]
pub enum AppError {
    #[cfg(feature = "cli")]
    #[error("Error reading from stdin: {source}")]
    ReadStdin {
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Error reading file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON for --inputs-json: {source}")]
    ParseInputsJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Invalid JSON in input document: {source}")]
    ParseCmdInputJson {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Could not serialize output to JSON: {source}")]
    SerializeOutput {
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "cli")]
    #[error("Missing input data: provide --input, --inputs-json or --preset")]
    MissingInputData,

    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error("Calcium share must be within [0, 1], got {0}")]
    CalciumShareOutOfRange(f64),

    #[error("Salinity salt must be NaCl or KCl, got {0}")]
    UnsupportedSalinitySalt(Salt),
}

