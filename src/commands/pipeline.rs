//! Pipeline command handlers.

use newsflow::config::PipelineConfig;
use newsflow::pipeline::{FileOutcome, Orchestrator, PassReport, Trigger, WatchRunner};
use newsflow::{Error, Result};

/// Runs a single pass.
pub async fn cmd_run(config: &PipelineConfig, force: bool) -> Result<()> {
    let mut orchestrator = Orchestrator::from_config(config)?;
    let trigger = if force { Trigger::Forced } else { Trigger::Startup };

    let report = tokio::task::spawn_blocking(move || orchestrator.run_pass(trigger))
        .await
        .map_err(|e| Error::Watch(format!("pipeline pass aborted: {e}")))?;

    print_report(&report);
    Ok(())
}

/// Watches until Ctrl-C.
pub async fn cmd_watch(config: &PipelineConfig) -> Result<()> {
    tracing::info!(
        input = %config.input_dir.display(),
        snapshot = %config.snapshot_path.display(),
        poll_seconds = config.poll_interval.as_secs_f64(),
        "starting watch"
    );
    let runner = WatchRunner::from_config(config)?;
    let summary = runner.run(shutdown_signal()).await?;

    println!(
        "Stopped after {} passes: {} rows imported, {} records handed off",
        summary.passes, summary.rows_imported, summary.delivered
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C, stopping");
    }
}

fn print_report(report: &PassReport) {
    println!("Pass ({}) finished in {:.2?}", report.trigger, report.duration);
    println!("  Files changed:   {}", report.files.len());
    println!("  Files unchanged: {}", report.unchanged);
    for file in &report.files {
        let detail = match &file.outcome {
            FileOutcome::Imported(rows) => format!("imported {rows} rows"),
            FileOutcome::Skipped(reason) => format!("skipped: {reason}"),
            FileOutcome::Failed(e) => format!("FAILED: {e}"),
        };
        println!("    {} - {detail}", file.path.display());
    }
    println!("  Rows imported:   {}", report.rows_imported);
    println!("  Exported:        {}", report.exported);
    println!("  New records:     {}", report.new_records);
    println!("  Handed off:      {}", report.delivered);
}
