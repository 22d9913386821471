//! pmtdisplay-io: Geometry and event archive readers.
//!
//! `.npz` archives are read through a memory map with `ndarray-npy`; HDF5
//! files are supported behind the `hdf5` feature. Both expose events through
//! [`pmtdisplay_core::EventSource`].
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod layout;
mod mmap;
pub mod npz;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use hdf5::{read_hdf5_geometry, Hdf5EventArchive};
pub use layout::EventOffsets;
pub use mmap::MappedFile;
pub use npz::{read_npz_geometry, NpzArchive, NpzEventArchive};

use pmtdisplay_core::{EventSource, Geometry};
use std::path::Path;

/// Archive container types recognised by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// Zip of `.npy` arrays.
    Npz,
    /// HDF5 file (`.h5`, `.hdf5`).
    Hdf5,
}

impl ArchiveFormat {
    /// Detects the format from the file extension.
    ///
    /// # Errors
    /// Returns [`Error::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("npz") => Ok(Self::Npz),
            Some("h5" | "hdf5") => Ok(Self::Hdf5),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[cfg(not(feature = "hdf5"))]
fn hdf5_disabled(path: &Path) -> Error {
    Error::UnsupportedFormat(format!(
        "{}: built without HDF5 support (enable the `hdf5` feature)",
        path.display()
    ))
}

/// Reads detector geometry, choosing the reader by extension.
///
/// # Errors
/// Returns an error if the format is unsupported or the archive is malformed.
pub fn read_geometry<P: AsRef<Path>>(path: P) -> Result<Geometry> {
    let path = path.as_ref();
    match ArchiveFormat::from_path(path)? {
        ArchiveFormat::Npz => read_npz_geometry(path),
        #[cfg(feature = "hdf5")]
        ArchiveFormat::Hdf5 => read_hdf5_geometry(path),
        #[cfg(not(feature = "hdf5"))]
        ArchiveFormat::Hdf5 => Err(hdf5_disabled(path)),
    }
}

/// Opens an event archive, choosing the reader by extension.
///
/// # Errors
/// Returns an error if the format is unsupported or the archive is malformed.
pub fn open_event_archive<P: AsRef<Path>>(path: P) -> Result<Box<dyn EventSource>> {
    let path = path.as_ref();
    match ArchiveFormat::from_path(path)? {
        ArchiveFormat::Npz => Ok(Box::new(NpzEventArchive::open(path)?)),
        #[cfg(feature = "hdf5")]
        ArchiveFormat::Hdf5 => Ok(Box::new(Hdf5EventArchive::open(path)?)),
        #[cfg(not(feature = "hdf5"))]
        ArchiveFormat::Hdf5 => Err(hdf5_disabled(path)),
    }
}
