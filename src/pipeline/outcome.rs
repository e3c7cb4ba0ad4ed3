//! Per-file and per-pass results.

use crate::Error;
use crate::watch::Channel;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First pass of a watch session.
    Startup,
    /// A debounced notification or poll tick.
    Signal(Channel),
    /// Explicit request; every input file is processed regardless of its
    /// fingerprint.
    Forced,
}

impl Trigger {
    /// Returns the trigger as a metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Signal(channel) => channel.as_str(),
            Self::Forced => "forced",
        }
    }

    /// Returns true if fingerprints are ignored for this pass.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        matches!(self, Self::Forced)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a changed file produced no rows without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The file was read but every record was dropped during cleaning.
    /// The file is archived like an imported one.
    NoUsableRecords {
        /// Records read from the file.
        read: usize,
    },
    /// The file disappeared between the scan and the read.
    Vanished,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoUsableRecords { read } => write!(f, "no usable records ({read} read)"),
            Self::Vanished => f.write_str("file vanished"),
        }
    }
}

/// Result of processing one changed input file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Rows appended to the store.
    Imported(usize),
    /// Nothing to import; not an error.
    Skipped(SkipReason),
    /// A step failed; the fingerprint is not committed and the file stays
    /// in place for the next pass.
    Failed(Error),
}

impl FileOutcome {
    /// Returns the outcome as a metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Imported(_) => "imported",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }

    /// Rows imported; 0 unless [`FileOutcome::Imported`].
    #[must_use]
    pub const fn rows(&self) -> usize {
        match self {
            Self::Imported(rows) => *rows,
            Self::Skipped(_) | Self::Failed(_) => 0,
        }
    }

    /// Returns true for [`FileOutcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One file's trip through a pass.
#[derive(Debug)]
pub struct FileReport {
    /// The input file.
    pub path: PathBuf,
    /// What happened.
    pub outcome: FileOutcome,
    /// Where the input file was moved, if it was.
    pub archived_to: Option<PathBuf>,
    /// The processed CSV left behind, if any.
    pub processed_csv: Option<PathBuf>,
}

impl FileReport {
    pub(crate) const fn new(path: PathBuf, outcome: FileOutcome) -> Self {
        Self {
            path,
            outcome,
            archived_to: None,
            processed_csv: None,
        }
    }
}

/// Aggregate of one pass.
#[derive(Debug)]
pub struct PassReport {
    /// What started the pass.
    pub trigger: Trigger,
    /// Changed files, in scan order.
    pub files: Vec<FileReport>,
    /// Files skipped because their fingerprint was unchanged.
    pub unchanged: usize,
    /// Rows appended across all files.
    pub rows_imported: usize,
    /// Records written to the snapshot; 0 when no export ran.
    pub exported: usize,
    /// Snapshot records not yet handed downstream.
    pub new_records: usize,
    /// Records the downstream accepted.
    pub delivered: usize,
    /// Wall time of the pass.
    pub duration: Duration,
}

impl PassReport {
    pub(crate) const fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            files: Vec::new(),
            unchanged: 0,
            rows_imported: 0,
            exported: 0,
            new_records: 0,
            delivered: 0,
            duration: Duration::ZERO,
        }
    }

    /// Files whose processing failed.
    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|f| f.outcome.is_failed())
    }

    /// Number of files that imported at least one row.
    #[must_use]
    pub fn imported_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Imported(n) if n > 0))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_labels() {
        assert_eq!(Trigger::Startup.as_str(), "startup");
        assert_eq!(Trigger::Signal(Channel::Snapshot).to_string(), Channel::Snapshot.as_str());
        assert!(Trigger::Forced.is_forced());
        assert!(!Trigger::Signal(Channel::Poll).is_forced());
    }

    #[test]
    fn test_outcome_rows_and_labels() {
        assert_eq!(FileOutcome::Imported(3).rows(), 3);
        assert_eq!(FileOutcome::Skipped(SkipReason::Vanished).rows(), 0);
        let failed = FileOutcome::Failed(Error::Export("disk full".to_string()));
        assert!(failed.is_failed());
        assert_eq!(failed.as_str(), "failed");
    }

    #[test]
    fn test_report_counts() {
        let mut report = PassReport::new(Trigger::Forced);
        report
            .files
            .push(FileReport::new("a.json".into(), FileOutcome::Imported(2)));
        report.files.push(FileReport::new(
            "b.json".into(),
            FileOutcome::Skipped(SkipReason::NoUsableRecords { read: 1 }),
        ));
        report.files.push(FileReport::new(
            "c.json".into(),
            FileOutcome::Failed(Error::Schema("bad".to_string())),
        ));

        assert_eq!(report.imported_files(), 1);
        assert_eq!(report.failed().count(), 1);
        assert_eq!(
            SkipReason::NoUsableRecords { read: 1 }.to_string(),
            "no usable records (1 read)"
        );
    }
}
