//! Loading candidate records from an input file.

use super::formats::Format;
use crate::models::NewsRecord;
use crate::{Error, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Loads every candidate record from `path`.
///
/// The format is chosen by file extension.
///
/// # Errors
///
/// Returns [`Error::FileRead`] if the file has an unrecognized extension,
/// cannot be opened, or is malformed at the document level.
pub fn load_candidates(path: &Path) -> Result<Vec<NewsRecord>> {
    let file_error = |cause: String| Error::FileRead {
        path: path.to_path_buf(),
        cause,
    };

    let format =
        Format::from_path(path).ok_or_else(|| file_error("unrecognized file extension".to_string()))?;
    let file = File::open(path).map_err(|e| file_error(e.to_string()))?;

    let mut source = format
        .source(BufReader::new(file))
        .map_err(|e| file_error(e.to_string()))?;
    let records = source.collect_all().map_err(|e| file_error(e.to_string()))?;

    tracing::debug!(path = %path.display(), %format, records = records.len(), "loaded candidates");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_json_and_csv() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("a.json");
        let csv = dir.path().join("b.csv");
        fs::write(&json, r#"[{"title": "t1"}, {"title": "t2"}]"#).unwrap();
        fs::write(&csv, "title,content\nt3,c3\n").unwrap();

        assert_eq!(load_candidates(&json).unwrap().len(), 2);
        assert_eq!(load_candidates(&csv).unwrap().len(), 1);
    }

    #[test]
    fn test_both_publish_time_keys_are_loaded() {
        let dir = TempDir::new().unwrap();
        let json = dir.path().join("both.json");
        let csv = dir.path().join("both.csv");
        fs::write(
            &json,
            r#"[{"title":"t1","publishTime":"2023-07-01 08:00:00","publish_time":"2023-07-01"}]"#,
        )
        .unwrap();
        fs::write(&csv, "title,publishTime,publish_time\nt2,2023-07-01 08:00:00,\n").unwrap();

        let from_json = load_candidates(&json).unwrap();
        assert_eq!(from_json.len(), 1);
        assert_eq!(from_json[0].publish_time.as_deref(), Some("2023-07-01"));
        assert!(from_json[0].extra.contains_key("publishTime"));

        let from_csv = load_candidates(&csv).unwrap();
        assert_eq!(from_csv.len(), 1);
        assert_eq!(from_csv[0].publish_time.as_deref(), Some("2023-07-01 08:00:00"));
        assert!(from_csv[0].extra.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = load_candidates(&dir.path().join("gone.json")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = load_candidates(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_unrecognized_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "hello").unwrap();
        assert!(matches!(load_candidates(&path), Err(Error::FileRead { .. })));
    }
}
