use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for trajectory parsing and observable estimation.
///
/// Inputs are static files, so every variant is terminal for the computation
/// that raised it. Each variant carries enough context to locate the bad input.
#[derive(Debug, Error)]
pub enum Error {
    /// An expected input file does not exist.
    #[error("missing input file: {}", path.display())]
    MissingInput { path: PathBuf },

    /// A line does not match any accepted shape, or the input ends mid-frame.
    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },

    /// Degenerate numerical input (zero variance, empty sample window, no wall events).
    #[error("degenerate fit: {0}")]
    DegenerateFit(String),

    /// Invalid caller parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Malformed YAML analysis configuration.
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    /// Propagated I/O errors (reading runs, writing CSV tables).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Error::Format {
            line,
            message: message.into(),
        }
    }
}
