//! The pass: scan, clean, persist, export, dedup, hand off.

use super::archive::archive_file;
use super::outcome::{FileOutcome, FileReport, PassReport, SkipReason, Trigger};
use crate::clean::{RecordCleaner, timestamp};
use crate::config::PipelineConfig;
use crate::downstream::{self, Downstream};
use crate::export::{ProcessedCsvWriter, SnapshotExporter};
use crate::io::load_candidates;
use crate::state::{DedupStore, FileFingerprintStore, Fingerprint, id_for};
use crate::storage::NewsStore;
use crate::watch::{DirectoryScanner, RawFile};
use crate::Result;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};

const SUMMARY_TITLES: usize = 3;
const SUMMARY_TITLE_CHARS: usize = 30;

/// Where the orchestrator is within a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassState {
    /// Waiting for a trigger.
    #[default]
    Idle,
    /// Listing input files.
    Scanning,
    /// Loading and cleaning one file.
    Cleaning,
    /// Appending one file's records.
    Persisting,
    /// Writing the snapshot.
    Exporting,
    /// Filtering the snapshot and handing off new records.
    Deduping,
}

impl PassState {
    /// Returns the state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Cleaning => "cleaning",
            Self::Persisting => "persisting",
            Self::Exporting => "exporting",
            Self::Deduping => "deduping",
        }
    }
}

/// Runs pipeline passes.
///
/// Owns every piece of pipeline state: the store, both persisted maps and
/// the downstream. A pass takes `&mut self`, so two passes can never
/// overlap on one orchestrator.
pub struct Orchestrator {
    scanner: DirectoryScanner,
    cleaner: RecordCleaner,
    store: NewsStore,
    csv_writer: ProcessedCsvWriter,
    exporter: SnapshotExporter,
    fingerprints: FileFingerprintStore,
    dedup: DedupStore,
    downstream: Box<dyn Downstream>,
    archive_dir: PathBuf,
    imported_dir: Option<PathBuf>,
    state: PassState,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("input_dir", &self.scanner.root())
            .field("table", &self.store.table())
            .field("downstream", &self.downstream.name())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Builds an orchestrator from configuration.
    ///
    /// Opens (and initializes) the store and loads both state maps. Missing
    /// or corrupt state maps start empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the database cannot be opened and
    /// [`Error::Config`] for an invalid table name or downstream command.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let store = NewsStore::new(&config.db_path, &config.table_name)?;
        let downstream = downstream::from_command(config.downstream_command.as_deref())?;
        Ok(Self::with_store(config, store).with_downstream(downstream))
    }

    /// Builds an orchestrator around an already opened store.
    #[must_use]
    pub fn with_store(config: &PipelineConfig, store: NewsStore) -> Self {
        // Nothing the pipeline writes may be picked up as input.
        let scanner = [
            &config.output_dir,
            &config.archive_dir,
            &config.snapshot_path,
            &config.processed_records_path,
            &config.raw_state_path,
        ]
        .into_iter()
        .chain(config.imported_dir.as_ref())
        .fold(DirectoryScanner::new(&config.input_dir), |scanner, path| {
            scanner.exclude(path)
        });

        Self {
            scanner,
            cleaner: RecordCleaner::new(),
            store,
            csv_writer: ProcessedCsvWriter::new(&config.output_dir),
            exporter: SnapshotExporter::new(&config.snapshot_path),
            fingerprints: FileFingerprintStore::load(&config.raw_state_path),
            dedup: DedupStore::load(&config.processed_records_path, config.mark_policy),
            downstream: Box::new(downstream::LogDownstream),
            archive_dir: config.archive_dir.clone(),
            imported_dir: config.imported_dir.clone(),
            state: PassState::Idle,
        }
    }

    /// Replaces the downstream consumer.
    #[must_use]
    pub fn with_downstream(mut self, downstream: Box<dyn Downstream>) -> Self {
        self.downstream = downstream;
        self
    }

    /// Returns the record store.
    #[must_use]
    pub const fn store(&self) -> &NewsStore {
        &self.store
    }

    /// Returns the snapshot exporter.
    #[must_use]
    pub const fn exporter(&self) -> &SnapshotExporter {
        &self.exporter
    }

    /// Returns the dedup markers.
    #[must_use]
    pub const fn dedup(&self) -> &DedupStore {
        &self.dedup
    }

    /// Returns the file fingerprints.
    #[must_use]
    pub const fn fingerprints(&self) -> &FileFingerprintStore {
        &self.fingerprints
    }

    /// Returns the input directory.
    #[must_use]
    pub fn input_dir(&self) -> &Path {
        self.scanner.root()
    }

    /// Returns the current state; [`PassState::Idle`] between passes.
    #[must_use]
    pub const fn state(&self) -> PassState {
        self.state
    }

    /// Runs one pass to completion.
    ///
    /// Never fails as a whole: every error is caught at the step that
    /// raised it, logged, and reflected in the report.
    pub fn run_pass(&mut self, trigger: Trigger) -> PassReport {
        let span = info_span!("pipeline_pass", trigger = %trigger);
        let _enter = span.enter();
        let start = Instant::now();
        let mut report = PassReport::new(trigger);

        self.enter(PassState::Scanning);
        for raw in self.scanner.scan() {
            let fingerprint = raw.fingerprint();
            if !trigger.is_forced() && !self.fingerprints.has_changed(&raw.path, &fingerprint) {
                report.unchanged += 1;
                continue;
            }
            let file = self.process_file(&raw, fingerprint);
            metrics::counter!("files_processed_total", "outcome" => file.outcome.as_str()).increment(1);
            report.rows_imported += file.outcome.rows();
            report.files.push(file);
        }
        self.fingerprints.prune_missing();
        self.flush_fingerprints();

        if report.rows_imported > 0 {
            self.enter(PassState::Exporting);
            report.exported = self.exporter.export(&self.store, None);
        }

        self.enter(PassState::Deduping);
        self.hand_off_new_records(&mut report);

        self.enter(PassState::Idle);
        report.duration = start.elapsed();
        metrics::counter!("pipeline_passes_total", "trigger" => trigger.as_str()).increment(1);
        info!(
            files = report.files.len(),
            unchanged = report.unchanged,
            failed = report.failed().count(),
            rows = report.rows_imported,
            exported = report.exported,
            new_records = report.new_records,
            delivered = report.delivered,
            elapsed_ms = u64::try_from(report.duration.as_millis()).unwrap_or(u64::MAX),
            "pass complete"
        );
        report
    }

    fn enter(&mut self, state: PassState) {
        debug!(from = self.state.as_str(), to = state.as_str(), "pass state");
        self.state = state;
    }

    /// Load, clean, persist and archive one changed file.
    fn process_file(&mut self, raw: &RawFile, fingerprint: Fingerprint) -> FileReport {
        let path = raw.path.clone();
        self.enter(PassState::Cleaning);

        let candidates = match load_candidates(&raw.path) {
            Ok(candidates) => candidates,
            Err(_) if !raw.path.exists() => {
                debug!(path = %path.display(), "file vanished before it was read");
                return FileReport::new(path, FileOutcome::Skipped(SkipReason::Vanished));
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load input file, will retry");
                return FileReport::new(path, FileOutcome::Failed(e));
            },
        };

        let now = timestamp::now();
        let read = candidates.len();
        let cleaned = self.cleaner.clean_at(candidates, now);
        if cleaned.records.is_empty() {
            info!(path = %path.display(), read, "no usable records in file");
            let mut report =
                FileReport::new(path, FileOutcome::Skipped(SkipReason::NoUsableRecords { read }));
            self.commit_fingerprint(&raw.path, fingerprint);
            report.archived_to = self.archive(&raw.path, now);
            return report;
        }

        let csv = match self.csv_writer.write(&raw.path, &cleaned.records, now) {
            Ok(csv) => csv,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to write processed CSV, will retry");
                return FileReport::new(path, FileOutcome::Failed(e));
            },
        };

        self.enter(PassState::Persisting);
        let rows = match self.store.append(&cleaned.records) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store append failed, will retry");
                if let Err(rm) = std::fs::remove_file(&csv) {
                    warn!(path = %csv.display(), error = %rm, "failed to remove processed CSV");
                }
                return FileReport::new(path, FileOutcome::Failed(e));
            },
        };

        self.commit_fingerprint(&raw.path, fingerprint);
        let mut report = FileReport::new(path, FileOutcome::Imported(rows));
        report.archived_to = self.archive(&raw.path, now);
        report.processed_csv = Some(match &self.imported_dir {
            Some(dir) => archive_file(&csv, dir, now).unwrap_or_else(|e| {
                warn!(path = %csv.display(), error = %e, "failed to move processed CSV");
                csv.clone()
            }),
            None => csv,
        });
        info!(
            path = %report.path.display(),
            rows,
            dropped = cleaned.report.dropped(),
            "imported file"
        );
        report
    }

    /// Commits and persists at once, so a crash later in the pass does not
    /// re-import a file whose rows are already stored.
    fn commit_fingerprint(&mut self, file: &Path, fingerprint: Fingerprint) {
        self.fingerprints.commit(file, fingerprint);
        self.flush_fingerprints();
    }

    fn flush_fingerprints(&mut self) {
        if let Err(e) = self.fingerprints.flush() {
            warn!(error = %e, "failed to persist file fingerprints");
        }
    }

    fn archive(&self, source: &Path, now: chrono::NaiveDateTime) -> Option<PathBuf> {
        match archive_file(source, &self.archive_dir, now) {
            Ok(target) => {
                debug!(from = %source.display(), to = %target.display(), "archived input file");
                Some(target)
            },
            Err(e) => {
                // The fingerprint is already committed, so the file is not
                // imported twice; it just stays where it is.
                warn!(path = %source.display(), error = %e, "failed to archive input file");
                None
            },
        }
    }

    /// Reads the snapshot and hands records without a settled marker to the
    /// downstream, as one batch.
    fn hand_off_new_records(&mut self, report: &mut PassReport) {
        let snapshot = match self.exporter.read_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "cannot read snapshot, skipping hand-off");
                return;
            },
        };
        log_snapshot_summary(&snapshot);

        let mut seen = HashSet::new();
        let (ids, batch): (Vec<String>, Vec<Value>) = snapshot
            .into_iter()
            .filter_map(|record| {
                let id = id_for(&record);
                (self.dedup.is_new(&id) && seen.insert(id.clone())).then_some((id, record))
            })
            .unzip();
        report.new_records = batch.len();
        if batch.is_empty() {
            debug!("no new records in snapshot");
            return;
        }
        for (id, record) in ids.iter().zip(&batch) {
            let title = record.get("title").and_then(Value::as_str).unwrap_or("");
            info!(id = &id[..8.min(id.len())], title = %truncate(title, SUMMARY_TITLE_CHARS), "new record");
        }

        let now = timestamp::now();
        for (id, record) in ids.iter().zip(&batch) {
            self.dedup.reserve(id, record, now);
        }
        if let Err(e) = self.dedup.flush() {
            warn!(error = %e, "cannot persist tentative markers, hand-off postponed");
            self.release_all(&ids);
            return;
        }

        match self.downstream.deliver(&batch) {
            Ok(()) => {
                for id in &ids {
                    self.dedup.commit(id);
                }
                report.delivered = batch.len();
                metrics::counter!("downstream_records_total", "status" => "delivered")
                    .increment(count_u64(batch.len()));
                info!(count = batch.len(), downstream = self.downstream.name(), "handed off new records");
            },
            Err(e) => {
                self.release_all(&ids);
                metrics::counter!("downstream_records_total", "status" => "failed")
                    .increment(count_u64(batch.len()));
                warn!(error = %e, count = batch.len(), "hand-off failed, records stay eligible");
            },
        }
        if let Err(e) = self.dedup.flush() {
            warn!(error = %e, "failed to persist dedup markers");
        }
    }

    fn release_all(&mut self, ids: &[String]) {
        for id in ids {
            self.dedup.release(id);
        }
    }
}

fn log_snapshot_summary(snapshot: &[Value]) {
    let titles: Vec<String> = snapshot
        .iter()
        .take(SUMMARY_TITLES)
        .map(|r| truncate(r.get("title").and_then(Value::as_str).unwrap_or(""), SUMMARY_TITLE_CHARS))
        .collect();
    info!(records = snapshot.len(), first = ?titles, "snapshot loaded");
}

fn count_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
