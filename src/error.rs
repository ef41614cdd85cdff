// Error taxonomy for the pipeline
// Load errors are fatal for the caller; query errors become well-formed responses

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("input directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("no {kind} CSV files found in {dir}")]
    NoInputFiles { kind: &'static str, dir: PathBuf },

    #[error("schema mismatch in {kind} file {file}: expected [{expected}], found [{found}]")]
    SchemaMismatch {
        kind: &'static str,
        file: PathBuf,
        expected: String,
        found: String,
    },

    #[error("failed to read {file}: {source}")]
    Csv {
        file: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("State not found")]
    StateNotFound(String),

    #[error("No state data available")]
    EmptySummary,
}
