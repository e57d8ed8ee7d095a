//! Error types for file reading
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to produce the head buffer of a file.
///
/// Detection itself is infallible; only getting the bytes can fail.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },
}

impl ReadError {
    /// Path the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. } | Self::Read { path, .. } | Self::NotAFile { path } => path,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReadError>;
