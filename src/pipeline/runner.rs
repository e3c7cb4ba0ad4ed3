//! Long-running watch mode.
//!
//! Change sources push events into one queue; the [`Debouncer`] turns
//! bursts into signals; each signal requests a pass. Passes run on a
//! blocking thread, one at a time. Signals that arrive while a pass is
//! running collapse into a single follow-up pass.

use super::orchestrator::Orchestrator;
use super::outcome::{PassReport, Trigger};
use crate::config::PipelineConfig;
use crate::watch::{ChangeSource, DebounceStats, Debouncer, FsNotifySource, PollSource};
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type PassHandle = JoinHandle<(Orchestrator, PassReport)>;

/// What a watch session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerSummary {
    /// Passes completed.
    pub passes: usize,
    /// Rows imported across all passes.
    pub rows_imported: usize,
    /// Records handed downstream across all passes.
    pub delivered: usize,
    /// Debouncer counters.
    pub debounce: DebounceStats,
}

/// Drives an [`Orchestrator`] from change notifications.
pub struct WatchRunner {
    orchestrator: Orchestrator,
    sources: Vec<Box<dyn ChangeSource>>,
    debouncer: Debouncer,
}

impl WatchRunner {
    /// Creates a runner without change sources.
    #[must_use]
    pub fn new(orchestrator: Orchestrator, raw_window: Duration, snapshot_window: Duration) -> Self {
        Self {
            orchestrator,
            sources: Vec::new(),
            debouncer: Debouncer::new(raw_window, snapshot_window),
        }
    }

    /// Creates a runner with filesystem notifications and the fallback poll.
    ///
    /// # Errors
    ///
    /// Returns the error of [`Orchestrator::from_config`].
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let orchestrator = Orchestrator::from_config(config)?;
        Ok(Self::new(orchestrator, config.raw_debounce, config.snapshot_debounce)
            .with_source(Box::new(FsNotifySource::new(&config.input_dir, &config.snapshot_path)))
            .with_source(Box::new(PollSource::new(config.poll_interval))))
    }

    /// Adds a change source.
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn ChangeSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Runs until `shutdown` completes.
    ///
    /// A startup pass runs first. On shutdown the sources are stopped and
    /// an in-flight pass is allowed to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if a pass panics, or if no change source
    /// could be started.
    pub async fn run<F>(self, shutdown: F) -> Result<RunnerSummary>
    where
        F: Future<Output = ()>,
    {
        let Self {
            orchestrator,
            mut sources,
            mut debouncer,
        } = self;

        prepare_watched_paths(&orchestrator);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut started = 0;
        for source in &mut sources {
            match source.start(tx.clone()) {
                Ok(()) => {
                    started += 1;
                    info!(source = source.name(), "change source started");
                },
                Err(e) => warn!(source = source.name(), error = %e, "change source unavailable"),
            }
        }
        drop(tx);
        if started == 0 && !sources.is_empty() {
            return Err(Error::Watch("no change source could be started".to_string()));
        }

        let mut summary = RunnerSummary::default();
        let mut idle = Some(orchestrator);
        let mut in_flight: Option<PassHandle> = None;
        let mut pending = Some(Trigger::Startup);
        let mut events_open = true;
        tokio::pin!(shutdown);

        loop {
            if in_flight.is_none()
                && let Some(trigger) = pending.take()
                && let Some(mut orchestrator) = idle.take()
            {
                debug!(%trigger, "starting pass");
                in_flight = Some(tokio::task::spawn_blocking(move || {
                    let report = orchestrator.run_pass(trigger);
                    (orchestrator, report)
                }));
            }

            let deadline = debouncer.next_deadline();
            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                },
                event = rx.recv(), if events_open => match event {
                    Some(event) => debouncer.note(event.channel, now()),
                    None => {
                        warn!("all change sources stopped");
                        events_open = false;
                    },
                },
                () = sleep_until(deadline) => {
                    for channel in debouncer.fire_ready(now()) {
                        debug!(%channel, "debounced signal");
                        // Several signals before the next pass starts are one request.
                        pending.get_or_insert(Trigger::Signal(channel));
                    }
                },
                joined = join_pass(&mut in_flight) => {
                    in_flight = None;
                    let (orchestrator, report) = joined?;
                    record(&mut summary, &report);
                    idle = Some(orchestrator);
                },
            }
        }

        for source in &mut sources {
            source.stop();
        }
        if let Some(handle) = in_flight.take() {
            info!("waiting for the running pass to finish");
            let (_, report) = settle(handle.await)?;
            record(&mut summary, &report);
        }
        summary.debounce = *debouncer.stats();
        info!(passes = summary.passes, rows = summary.rows_imported, "watch stopped");
        Ok(summary)
    }
}

fn prepare_watched_paths(orchestrator: &Orchestrator) {
    if let Err(e) = std::fs::create_dir_all(orchestrator.input_dir()) {
        warn!(path = %orchestrator.input_dir().display(), error = %e, "cannot create input directory");
    }
    if let Err(e) = orchestrator.exporter().ensure_exists() {
        warn!(error = %e, "cannot create empty snapshot");
    }
}

fn record(summary: &mut RunnerSummary, report: &PassReport) {
    summary.passes += 1;
    summary.rows_imported += report.rows_imported;
    summary.delivered += report.delivered;
}

/// Debouncer time, taken from the tokio clock so paused-time tests work.
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

async fn join_pass(handle: &mut Option<PassHandle>) -> Result<(Orchestrator, PassReport)> {
    match handle {
        Some(handle) => settle(handle.await),
        None => std::future::pending().await,
    }
}

fn settle(
    joined: std::result::Result<(Orchestrator, PassReport), tokio::task::JoinError>,
) -> Result<(Orchestrator, PassReport)> {
    joined.map_err(|e| Error::Watch(format!("pipeline pass aborted: {e}")))
}
