//! First-run workspace layout.
//!
//! Creates every directory the configuration names and an empty snapshot,
//! and optionally drops one example JSON file and one example CSV file
//! into the input directory so the first pass has something to import.

use crate::config::PipelineConfig;
use crate::export::SnapshotExporter;
use crate::{Error, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Example JSON input file name.
pub const EXAMPLE_JSON: &str = "example_news_data.json";
/// Example CSV input file name.
pub const EXAMPLE_CSV: &str = "example_news_data.csv";

const EXAMPLE_CSV_HEADER: [&str; 5] = ["title", "content", "publish_time", "source", "url"];

/// What [`prepare_workspace`] created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceReport {
    /// Directories that did not exist before.
    pub created_dirs: Vec<PathBuf>,
    /// Whether an empty snapshot was written.
    pub snapshot_created: bool,
    /// Example files written; existing files are left alone.
    pub example_files: Vec<PathBuf>,
}

/// Creates the directories and files the pipeline expects.
///
/// Directories: input, output, archive, the imported directory when one is
/// configured, and the parents of the database and both state maps.
/// Existing directories and files are never touched.
///
/// # Errors
///
/// Returns [`Error::Export`] if a directory or example file cannot be
/// written.
pub fn prepare_workspace(config: &PipelineConfig, with_examples: bool) -> Result<WorkspaceReport> {
    let mut report = WorkspaceReport::default();

    let mut dirs: Vec<&Path> = vec![&config.input_dir, &config.output_dir, &config.archive_dir];
    dirs.extend(config.imported_dir.as_deref());
    dirs.extend(
        [
            &config.db_path,
            &config.processed_records_path,
            &config.raw_state_path,
        ]
        .into_iter()
        .filter_map(|file| file.parent())
        .filter(|dir| !dir.as_os_str().is_empty()),
    );

    for dir in dirs {
        if dir.is_dir() {
            continue;
        }
        fs::create_dir_all(dir).map_err(|e| Error::Export(format!("{}: {e}", dir.display())))?;
        info!(path = %dir.display(), "created directory");
        report.created_dirs.push(dir.to_path_buf());
    }

    report.snapshot_created = SnapshotExporter::new(&config.snapshot_path).ensure_exists()?;

    if with_examples {
        let json_path = config.input_dir.join(EXAMPLE_JSON);
        if !json_path.exists() {
            crate::io::atomic::write_json_pretty(&json_path, &example_records("json"))
                .map_err(|e| Error::Export(format!("{}: {e}", json_path.display())))?;
            info!(path = %json_path.display(), "wrote example input");
            report.example_files.push(json_path);
        }

        let csv_path = config.input_dir.join(EXAMPLE_CSV);
        if !csv_path.exists() {
            write_example_csv(&csv_path)?;
            info!(path = %csv_path.display(), "wrote example input");
            report.example_files.push(csv_path);
        }
    }

    Ok(report)
}

fn example_records(kind: &str) -> Vec<Value> {
    [(1, "2023-07-01 08:30:00"), (2, "2023-07-01 09:15:00")]
        .into_iter()
        .map(|(n, published)| {
            json!({
                "title": format!("Example {kind} headline {n}"),
                "content": format!(
                    "Example {kind} article body {n}, used to try out the ingestion pipeline."
                ),
                "publish_time": published,
                "source": format!("Example source {n}"),
                "url": format!("https://example.com/news/{kind}/{n}"),
            })
        })
        .collect()
}

fn write_example_csv(path: &Path) -> Result<()> {
    let export_error = |e: csv::Error| Error::Export(format!("{}: {e}", path.display()));
    let mut writer = csv::Writer::from_path(path).map_err(export_error)?;
    writer.write_record(EXAMPLE_CSV_HEADER).map_err(export_error)?;
    for (record, published) in example_records("csv")
        .iter()
        .zip(["2023-07-01 10:30:00", "2023-07-01 11:15:00"])
    {
        let row = EXAMPLE_CSV_HEADER.map(|column| match column {
            "publish_time" => published,
            _ => record[column].as_str().unwrap_or_default(),
        });
        writer.write_record(row).map_err(export_error)?;
    }
    writer
        .flush()
        .map_err(|e| Error::Export(format!("{}: {e}", path.display())))
}
