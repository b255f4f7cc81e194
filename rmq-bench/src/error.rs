//! Errors raised while loading inputs and writing or reading timing logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// Unreadable input or unwritable log directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A token in an integer file that is not a non-negative integer.
    #[error("line {line}: `{token}` is not a non-negative integer")]
    Parse { line: usize, token: String },

    /// The input held no integers at all.
    #[error("the input does not contain any integers")]
    EmptyInput,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A malformed line in a command file.
    #[error("invalid command: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, BenchError>;
