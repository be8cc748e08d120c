use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read HAR file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse HAR file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid HAR structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Quantile must be within [0, 1], got {0}")]
    InvalidQuantile(f64),

    #[error("Quantiles {first} and {second} share the label '{label}'")]
    QuantileLabelCollision {
        label: String,
        first: f64,
        second: f64,
    },

    #[error("Cannot compute statistics over an empty input")]
    EmptyInput,

    #[error("Cannot build a report from zero transaction records")]
    EmptyReport,

    #[error("Malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
}

/// Discriminant of [`Error`], for callers that degrade per field instead of
/// aborting on any failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Parse,
    InvalidStructure,
    InvalidPattern,
    InvalidQuantile,
    EmptyInput,
    EmptyReport,
    MalformedUrl,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Parse(_) => ErrorKind::Parse,
            Error::InvalidStructure(_) => ErrorKind::InvalidStructure,
            Error::InvalidPattern(_) => ErrorKind::InvalidPattern,
            Error::InvalidQuantile(_) | Error::QuantileLabelCollision { .. } => {
                ErrorKind::InvalidQuantile
            }
            Error::EmptyInput => ErrorKind::EmptyInput,
            Error::EmptyReport => ErrorKind::EmptyReport,
            Error::MalformedUrl { .. } => ErrorKind::MalformedUrl,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
