//! Crash-safe file replacement.
//!
//! Writers serialize into a temporary file in the destination directory and
//! rename it over the target, so readers only ever see the old file or the
//! complete new one.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Writes `value` as pretty-printed JSON (4-space indent) to `path`.
///
/// Non-ASCII text is written verbatim. Missing parent directories are
/// created.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory, temp file, write or
/// rename fails. On error the previous contents of `path` are untouched.
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut serializer).map_err(io::Error::other)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns the directory a temp file for `path` should live in.
fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
