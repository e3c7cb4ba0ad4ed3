//! Init command handler.

use newsflow::Result;
use newsflow::config::PipelineConfig;
use newsflow::pipeline::prepare_workspace;

/// Creates the workspace layout and reports what was created.
pub fn cmd_init(config: &PipelineConfig, examples: bool) -> Result<()> {
    let report = prepare_workspace(config, examples)?;

    if report.created_dirs.is_empty() {
        println!("All directories already exist.");
    }
    for dir in &report.created_dirs {
        println!("Created {}", dir.display());
    }
    if report.snapshot_created {
        println!("Created empty snapshot {}", config.snapshot_path.display());
    }
    for file in &report.example_files {
        println!("Wrote example {}", file.display());
    }

    println!();
    println!("Point the collector at {}", config.input_dir.display());
    println!("then run `newsflow run` or `newsflow watch`.");
    Ok(())
}
