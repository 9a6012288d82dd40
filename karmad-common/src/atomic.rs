//! Atomic file writes (temp file + rename)
//!
//! A reader never observes a partially written file: contents go to a
//! uniquely named temporary file in the target's directory, which is then
//! renamed over the target. Concurrent writers of the same target each use
//! their own temporary file, so the last rename wins.

use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write `contents` to `path` atomically
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path)?;

    let write_result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = write_result.and_then(|()| fs::rename(&temp_path, path)) {
        // Best-effort cleanup; the original error is what matters
        let _ = fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote file atomically");
    Ok(())
}

/// Temporary sibling path: `.{file_name}.{uuid}.tmp`
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::InvalidInput(format!("Not a file path: {}", path.display())))?;

    let temp_name = format!(".{}.{}.tmp", file_name, crate::uuid_utils::generate().simple());
    Ok(match path.parent() {
        Some(dir) => dir.join(temp_name),
        None => PathBuf::from(temp_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");

        write_atomic(&target, b"{}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("out.json");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read(&target).unwrap(), b"second");
    }

    #[test]
    fn test_write_atomic_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing").join("out.json");

        assert!(write_atomic(&target, b"x").is_err());
        assert!(!target.exists());
    }
}
