//! Moving imported files out of the way.

use crate::clean::timestamp;
use chrono::NaiveDateTime;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Moves `source` into `dest_dir` as `{yyyyMMdd_HHmmss}_{fileName}`.
///
/// A taken name gets a counter before the extension. Falls back to copy and
/// remove when `dest_dir` is on another filesystem.
///
/// # Errors
///
/// Returns the I/O error if the directory cannot be created or the file
/// cannot be moved; the source is left in place in that case.
pub fn archive_file(source: &Path, dest_dir: &Path, now: NaiveDateTime) -> io::Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy();
    fs::create_dir_all(dest_dir)?;

    let stamp = timestamp::file_stamp(now);
    let mut target = dest_dir.join(format!("{stamp}_{name}"));
    let mut n = 1;
    while target.exists() {
        target = dest_dir.join(numbered(&stamp, source, n));
        n += 1;
    }

    move_file(source, &target)?;
    Ok(target)
}

fn numbered(stamp: &str, source: &Path, n: usize) -> String {
    let stem = source
        .file_stem()
        .map_or_else(|| "file".into(), |s| s.to_string_lossy());
    match source.extension() {
        Some(ext) => format!("{stamp}_{stem}_{n}.{}", ext.to_string_lossy()),
        None => format!("{stamp}_{stem}_{n}"),
    }
}

fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            copy_then_remove(from, to, |p| fs::remove_file(p))
        },
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to`, then removes `from` with `remove`.
///
/// If the source cannot be removed the copy is deleted again, so a file is
/// never both archived and left for the next pass.
fn copy_then_remove<F>(from: &Path, to: &Path, remove: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    fs::copy(from, to)?;
    if let Err(e) = remove(from) {
        if let Err(cleanup) = fs::remove_file(to) {
            tracing::warn!(path = %to.display(), error = %cleanup, "failed to remove partial archive copy");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at() -> NaiveDateTime {
        timestamp::parse_timestamp("2024-05-06 07:08:09").unwrap()
    }

    #[test]
    fn test_moves_with_prefix() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.json");
        fs::write(&source, "[]").unwrap();

        let target = archive_file(&source, &dir.path().join("archive"), at()).unwrap();
        assert_eq!(target.file_name().unwrap(), "20240506_070809_a.json");
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(target).unwrap(), "[]");
    }

    #[test]
    fn test_collision_gets_counter() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("archive");
        for body in ["one", "two", "three"] {
            let source = dir.path().join("feed.csv");
            fs::write(&source, body).unwrap();
            archive_file(&source, &archive, at()).unwrap();
        }

        assert_eq!(
            fs::read_to_string(archive.join("20240506_070809_feed.csv")).unwrap(),
            "one"
        );
        assert_eq!(
            fs::read_to_string(archive.join("20240506_070809_feed_1.csv")).unwrap(),
            "two"
        );
        assert_eq!(
            fs::read_to_string(archive.join("20240506_070809_feed_2.csv")).unwrap(),
            "three"
        );
    }

    #[test]
    fn test_copy_fallback_keeps_single_copy_when_source_stays() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.json");
        let target = dir.path().join("archived.json");
        fs::write(&source, "[]").unwrap();

        let err = copy_then_remove(&source, &target, |_| {
            Err(io::Error::new(ErrorKind::PermissionDenied, "read-only source"))
        })
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(source.exists());
        assert!(!target.exists());
    }

    #[test]
    fn test_copy_fallback_moves_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("a.json");
        let target = dir.path().join("archived.json");
        fs::write(&source, "[1]").unwrap();

        copy_then_remove(&source, &target, |p| fs::remove_file(p)).unwrap();

        assert!(!source.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "[1]");
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = TempDir::new().unwrap();
        let err = archive_file(&dir.path().join("gone.json"), dir.path(), at()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
