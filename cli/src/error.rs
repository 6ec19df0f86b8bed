//! Error types for the pairgraph CLI.

use thiserror::Error;

use pairgraph_core::GraphError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Build failure from the core engine, including a missing input file.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Report file could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON report serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting outside its allowed range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// `verify` found closures that differ from plain BFS.
    #[error("{0} closure(s) differ from the reference traversal")]
    Mismatch(usize),
}
