//! Read-only file access
//!
//! Identification never needs more than the first few kilobytes of a file,
//! and never needs write access. Every file the tool inspects is opened
//! through here.

use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::Path;

use crate::error::{ReadError, Result};

/// Bytes read per file when nothing else is configured.
///
/// Enough for every offset the detector table looks at (the deepest is the
/// 512-byte tar header, PDF scans a bit further).
pub const DEFAULT_HEAD_BYTES: usize = 4100;

// ============================================================================
// Safe File Opening
// ============================================================================

/// Open a file for reading only.
///
/// Directories and other non-regular files are refused up front so callers
/// get a clear error instead of an odd read failure.
pub fn open_readonly(path: &Path) -> Result<File> {
    let metadata = std::fs::metadata(path).map_err(|source| ReadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_file() {
        return Err(ReadError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Read at most `limit` bytes from the start of `path`.
///
/// Short files give a short buffer; that is not an error.
pub fn read_head(path: &Path, limit: usize) -> Result<Vec<u8>> {
    let file = open_readonly(path)?;
    let head = read_head_from(file, limit).map_err(|source| ReadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::trace!(path = %path.display(), bytes = head.len(), "Read file head");
    Ok(head)
}

/// Read at most `limit` bytes from any reader
pub fn read_head_from<R: Read>(reader: R, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    reader.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Check a path can be opened for reading, without reading it
pub fn verify_readable(path: &Path) -> Result<()> {
    open_readonly(path).map(|_: File| ())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_head_truncates() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("big.bin");
        std::fs::write(&file_path, vec![0xAB; 10_000]).unwrap();

        let head = read_head(&file_path, DEFAULT_HEAD_BYTES).unwrap();
        assert_eq!(head.len(), DEFAULT_HEAD_BYTES);
        assert!(head.iter().all(|&b| b == 0xAB));
    }

    #[test]
    fn test_read_head_short_file() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("small.txt");
        std::fs::write(&file_path, "test content").unwrap();

        let head = read_head(&file_path, DEFAULT_HEAD_BYTES).unwrap();
        assert_eq!(head, b"test content");
    }

    #[test]
    fn test_read_head_zero_limit() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("any.txt");
        std::fs::write(&file_path, "abc").unwrap();

        assert!(read_head(&file_path, 0).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_head(&dir.path().join("nope"), 16).unwrap_err();
        assert!(matches!(err, ReadError::Open { .. }));
        assert!(err.path().ends_with("nope"));
    }

    #[test]
    fn test_directory_is_refused() {
        let dir = TempDir::new().unwrap();
        let err = open_readonly(dir.path()).unwrap_err();
        assert!(matches!(err, ReadError::NotAFile { .. }));
        assert!(verify_readable(dir.path()).is_err());
    }

    #[test]
    fn test_read_head_from_slice() {
        let data: &[u8] = b"0123456789";
        assert_eq!(read_head_from(data, 4).unwrap(), b"0123");
    }
}
