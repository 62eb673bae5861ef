//! Error types for image loading and encoding.

use std::collections::TryReserveError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while decoding, allocating, or writing images.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid image '{path}': {reason}")]
    InvalidImage { path: PathBuf, reason: String },

    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("allocation failure: {0}")]
    OutOfMemory(#[from] TryReserveError),
}
