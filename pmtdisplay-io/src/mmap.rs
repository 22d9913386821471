//! Memory-mapped archive files.

use crate::Result;
use memmap2::Mmap;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A read-only memory map of an archive file.
///
/// Cloning shares the mapping.
#[derive(Clone)]
pub struct MappedFile {
    mmap: Arc<Mmap>,
    path: PathBuf,
}

impl MappedFile {
    /// Maps an archive read-only.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be opened or mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: read-only mapping; archives are not rewritten while the
        // display holds them open.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap: Arc::new(mmap),
            path: path.as_ref().to_path_buf(),
        })
    }

    /// The mapped archive bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap[..]
    }

    /// Archive size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mmap.len()
    }

    /// Returns true for a zero-length archive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Path the file was opened from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A seekable reader over the mapping.
    #[must_use]
    pub fn cursor(&self) -> Cursor<Self> {
        Cursor::new(self.clone())
    }
}

impl AsRef<[u8]> for MappedFile {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for MappedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedFile")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_cursor_reads_contents() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abcdef").unwrap();
        file.flush().unwrap();

        let mapped = MappedFile::open(file.path()).unwrap();
        assert_eq!(mapped.len(), 6);
        assert_eq!(&mapped.as_bytes()[..3], b"abc");
        let mut buf = String::new();
        mapped.cursor().read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abcdef");
    }

    #[test]
    fn test_missing_file() {
        assert!(MappedFile::open("/nonexistent/archive.npz").is_err());
    }
}
