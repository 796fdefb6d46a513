use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcsError {
    #[error("Division by zero: the additive identity has no inverse")]
    DivisionByZero,

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid length: expected {expected}, got {got}")]
    InvalidLength {
        expected: usize,
        got: usize,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Missing file: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Missing row: no row with nv = {nv} in the {table} table")]
    MissingRow { table: &'static str, nv: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = PcsError> = std::result::Result<T, E>;

impl From<ark_serialize::SerializationError> for PcsError {
    fn from(err: ark_serialize::SerializationError) -> Self {
        match err {
            ark_serialize::SerializationError::IoError(err) => Self::Io(err),
            other => Self::InvalidEncoding(format!("{:?}", other)),
        }
    }
}
