use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by graph construction.
///
/// A truncated trailing record is not an error (the reader drops it), and an
/// empty graph solves to an empty closure table.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The record stream could not be opened.
    #[error("input {} does not exist or cannot be opened: {source}", .path.display())]
    MissingInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Read failure in the middle of the record stream.
    #[error("I/O error while reading records: {0}")]
    Io(#[from] io::Error),

    /// A node identifier that does not fit the fixed-width token.
    #[error("invalid node id '{0}': at most 12 bytes and no NUL bytes")]
    InvalidNodeId(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
