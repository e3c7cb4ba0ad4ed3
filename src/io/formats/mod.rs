//! Input format adapters.
//!
//! Each format implements [`RecordSource`].

pub mod csv;
pub mod json;

use crate::{Error, Result};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use super::traits::RecordSource;

/// Recognized input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// A JSON array of objects, or a single object.
    Json,
    /// UTF-8 CSV with a header row.
    Csv,
}

impl Format {
    /// Returns all recognized formats.
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Json, Self::Csv]
    }

    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// Detects the format from a file extension, ignoring case.
    ///
    /// Returns `None` for anything that is not an input file.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }

    /// Creates a record source reading this format.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader cannot be read or its header is
    /// malformed.
    pub fn source<'a, R: Read + 'a>(self, reader: R) -> Result<Box<dyn RecordSource + 'a>> {
        match self {
            Self::Json => Ok(Box::new(json::JsonRecordSource::new(reader)?)),
            Self::Csv => Ok(Box::new(csv::CsvRecordSource::new(reader)?)),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(Error::Schema(format!("unknown input format: {s}"))),
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.json")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("b.CSV")), Some(Format::Csv));
        assert_eq!(Format::from_path(Path::new("notes.txt")), None);
        assert_eq!(Format::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_display_round_trips() {
        for format in Format::all() {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
    }
}
