//! Status command handler.

use newsflow::config::PipelineConfig;
use newsflow::state::{DedupStore, FileFingerprintStore};
use newsflow::storage::NewsStore;
use newsflow::Result;
use std::path::Path;

/// Prints configured paths and record/state counts.
pub fn cmd_status(config: &PipelineConfig) -> Result<()> {
    println!("Newsflow Status");
    println!("===============");
    println!();
    println!("Version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Input directory:   {}", describe(&config.input_dir));
    println!("Output directory:  {}", describe(&config.output_dir));
    println!("Archive directory: {}", describe(&config.archive_dir));
    if let Some(dir) = &config.imported_dir {
        println!("Imported CSVs:     {}", describe(dir));
    }
    println!();

    let store = NewsStore::new(&config.db_path, &config.table_name)?;
    println!("Store: {} ({})", config.db_path.display(), config.table_name);
    println!("  Records: {}", store.count()?);

    let fingerprints = FileFingerprintStore::load(&config.raw_state_path);
    println!("File fingerprints: {}", fingerprints.len());
    println!("  Path: {}", config.raw_state_path.display());

    let dedup = DedupStore::load(&config.processed_records_path, config.mark_policy);
    println!(
        "Dedup markers: {} ({} tentative, policy {})",
        dedup.len(),
        dedup.tentative_count(),
        config.mark_policy
    );
    println!("  Path: {}", config.processed_records_path.display());

    println!("Snapshot: {}", describe(&config.snapshot_path));
    Ok(())
}

fn describe(path: &Path) -> String {
    let state = if path.exists() { "present" } else { "missing" };
    format!("{} ({state})", path.display())
}
