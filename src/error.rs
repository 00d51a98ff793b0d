use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("grid must have at least one row and one column")]
    EmptyGrid,

    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown difficulty tier '{0}' (expected Beginner, Intermediate, Expert or Master)")]
    InvalidTier(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidSetting { key: String, value: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
