//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure decoding an npz archive or one of its arrays.
    #[error("npz error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// A required array is absent from the archive.
    #[error("missing array '{0}'")]
    MissingArray(String),

    /// Arrays are present but their shapes or contents are inconsistent.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// The file extension names no supported archive type.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] pmtdisplay_core::Error),
}

impl From<Error> for pmtdisplay_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Core(inner) => inner,
            other => pmtdisplay_core::Error::Source(Box::new(other)),
        }
    }
}
