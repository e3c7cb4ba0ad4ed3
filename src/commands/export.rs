//! Export command handler.

use newsflow::config::PipelineConfig;
use newsflow::storage::NewsStore;
use newsflow::{Result, SnapshotExporter};
use std::path::PathBuf;

/// Exports the store to `output`, or to the configured snapshot path.
pub fn cmd_export(config: &PipelineConfig, output: Option<PathBuf>, limit: Option<usize>) -> Result<()> {
    let store = NewsStore::new(&config.db_path, &config.table_name)?;
    let exporter = SnapshotExporter::new(output.unwrap_or_else(|| config.snapshot_path.clone()));

    let count = exporter.try_export(&store, limit)?;
    if count == 0 {
        println!("Store is empty; {} left unchanged", exporter.path().display());
    } else {
        println!("Exported {count} records to {}", exporter.path().display());
    }
    Ok(())
}
