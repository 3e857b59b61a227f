//! Error types for host file operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors a host can report from its file lifecycle.
///
/// The interpreter never fails on key input; these only come back from
/// [`TextBuffer::save`](crate::host::TextBuffer::save),
/// [`open`](crate::host::TextBuffer::open) and
/// [`reload`](crate::host::TextBuffer::reload), and end up as a status
/// message.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("{path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The buffer has no associated file to write or reload.
    #[error("no file name")]
    NoFileName,

    /// `open` was pointed at a directory.
    #[error("{0}: is a directory")]
    IsDirectory(PathBuf),
}

impl Error {
    /// Wrap an I/O error together with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for host file operations.
pub type Result<T> = std::result::Result<T, Error>;
