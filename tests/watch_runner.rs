//! Watch mode integration tests.
//!
//! Drives a [`WatchRunner`] with an in-process change source so events can
//! be injected deterministically. Windows are kept short and real time is
//! used, since passes run on blocking threads.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use newsflow::config::PipelineConfig;
use newsflow::pipeline::{Orchestrator, RunnerSummary, WatchRunner};
use newsflow::storage::NewsStore;
use newsflow::watch::{ChangeEvent, ChangeSource, Channel};
use newsflow::{Downstream, Error, Result};
use serde_json::Value;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const WINDOW: Duration = Duration::from_millis(50);
const DEADLINE: Duration = Duration::from_secs(10);

const RECORD: &str = r#"[{"title":"Watched headline","content":"Content long enough to survive the cleaning step.","source":"S1"}]"#;
const SECOND: &str = r#"[{"title":"Second headline","content":"Another body that is comfortably above the threshold.","source":"S2"}]"#;

// ============================================================================
// Helpers
// ============================================================================

/// Change source whose events are pushed by the test.
#[derive(Clone, Default)]
struct ManualSource {
    tx: Arc<Mutex<Option<UnboundedSender<ChangeEvent>>>>,
}

impl ManualSource {
    fn emit(&self, channel: Channel) {
        let guard = self.tx.lock().unwrap();
        let tx = guard.as_ref().expect("source not started");
        tx.send(ChangeEvent::new(channel, None)).unwrap();
    }

    fn is_started(&self) -> bool {
        self.tx.lock().unwrap().is_some()
    }
}

impl ChangeSource for ManualSource {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn start(&mut self, tx: UnboundedSender<ChangeEvent>) -> Result<()> {
        *self.tx.lock().unwrap() = Some(tx);
        Ok(())
    }

    fn stop(&mut self) {
        self.tx.lock().unwrap().take();
    }
}

/// Downstream whose first delivery blocks until the test releases it.
struct Gate {
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
    calls: Arc<AtomicUsize>,
}

impl Gate {
    fn new() -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>, Arc<AtomicUsize>) {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Self {
            entered: Mutex::new(Some(entered_tx)),
            release: Mutex::new(Some(release_rx)),
            calls: Arc::clone(&calls),
        };
        (gate, entered_rx, release_tx, calls)
    }
}

impl Downstream for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn deliver(&self, _records: &[Value]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(entered) = self.entered.lock().unwrap().take() {
            let _ = entered.send(());
        }
        let release = self.release.lock().unwrap().take();
        if let Some(release) = release {
            // Runs on the pass's blocking thread.
            let _ = release.blocking_recv();
        }
        Ok(())
    }
}

/// Change source that never starts.
struct BrokenSource;

impl ChangeSource for BrokenSource {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn start(&mut self, _tx: UnboundedSender<ChangeEvent>) -> Result<()> {
        Err(Error::Watch("unavailable".to_string()))
    }

    fn stop(&mut self) {}
}

struct Session {
    _dir: TempDir,
    config: PipelineConfig,
    source: ManualSource,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<RunnerSummary>>,
}

impl Session {
    fn start(seed: Option<&str>) -> Self {
        Self::start_with(seed, None)
    }

    fn start_with(seed: Option<&str>, downstream: Option<Box<dyn Downstream>>) -> Self {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::default().rooted_at(dir.path());
        fs::create_dir_all(&config.input_dir).unwrap();
        if let Some(body) = seed {
            fs::write(config.input_dir.join("seed.json"), body).unwrap();
        }

        let source = ManualSource::default();
        let mut orchestrator = Orchestrator::from_config(&config).unwrap();
        if let Some(downstream) = downstream {
            orchestrator = orchestrator.with_downstream(downstream);
        }
        let runner =
            WatchRunner::new(orchestrator, WINDOW, WINDOW).with_source(Box::new(source.clone()));
        let (stop, stopped) = oneshot::channel();
        let task = tokio::spawn(runner.run(async {
            let _ = stopped.await;
        }));

        Self {
            _dir: dir,
            config,
            source,
            stop,
            task,
        }
    }

    fn count(&self) -> u64 {
        NewsStore::new(&self.config.db_path, &self.config.table_name)
            .and_then(|store| store.count())
            .unwrap_or(0)
    }

    async fn wait_for_count(&self, expected: u64) {
        let waited = tokio::time::timeout(DEADLINE, async {
            while self.count() < expected {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "store never reached {expected} rows");
    }

    async fn wait_started(&self) {
        let waited = tokio::time::timeout(DEADLINE, async {
            while !self.source.is_started() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        assert!(waited.is_ok(), "change source never started");
    }

    async fn finish(self) -> RunnerSummary {
        self.stop.send(()).unwrap();
        let summary = tokio::time::timeout(DEADLINE, self.task)
            .await
            .expect("runner did not stop")
            .unwrap()
            .unwrap();
        assert!(!self.source.is_started(), "source left running");
        summary
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn startup_pass_imports_existing_files() {
    let session = Session::start(Some(RECORD));

    session.wait_for_count(1).await;
    let summary = session.finish().await;

    assert!(summary.passes >= 1);
    assert_eq!(summary.rows_imported, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn raw_input_event_triggers_a_pass() {
    let session = Session::start(Some(RECORD));
    session.wait_for_count(1).await;
    session.wait_started().await;

    fs::write(session.config.input_dir.join("second.json"), SECOND).unwrap();
    session.source.emit(Channel::RawInput);
    session.wait_for_count(2).await;

    let summary = session.finish().await;
    assert!(summary.passes >= 2);
    assert_eq!(summary.rows_imported, 2);
    assert!(summary.debounce.signals_emitted >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn events_during_a_pass_schedule_one_follow_up_pass() {
    let (gate, entered, release, calls) = Gate::new();
    let session = Session::start_with(Some(RECORD), Some(Box::new(gate)));

    // The startup pass is now blocked inside its hand-off.
    tokio::time::timeout(DEADLINE, entered)
        .await
        .expect("startup pass never reached the hand-off")
        .unwrap();
    session.wait_started().await;

    fs::write(session.config.input_dir.join("second.json"), SECOND).unwrap();
    for _ in 0..3 {
        session.source.emit(Channel::RawInput);
    }
    // Let the debounce window elapse while the pass is still running.
    tokio::time::sleep(WINDOW * 6).await;
    assert_eq!(session.count(), 1);

    release.send(()).unwrap();
    session.wait_for_count(2).await;
    tokio::time::sleep(WINDOW * 6).await;

    let summary = session.finish().await;
    assert_eq!(summary.passes, 2);
    assert_eq!(summary.rows_imported, 2);
    assert_eq!(summary.delivered, 2);
    assert_eq!(summary.debounce.events_received, 3);
    assert_eq!(summary.debounce.signals_emitted, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn burst_of_events_coalesces_into_one_signal() {
    let session = Session::start(None);
    session.wait_started().await;

    for _ in 0..5 {
        session.source.emit(Channel::RawInput);
    }
    tokio::time::sleep(WINDOW * 6).await;

    let summary = session.finish().await;
    assert_eq!(summary.debounce.events_received, 5);
    assert_eq!(summary.debounce.events_coalesced, 4);
    assert_eq!(summary.debounce.signals_emitted, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn channels_debounce_independently() {
    let session = Session::start(None);
    session.wait_started().await;

    session.source.emit(Channel::RawInput);
    session.source.emit(Channel::Snapshot);
    tokio::time::sleep(WINDOW * 6).await;

    let summary = session.finish().await;
    assert_eq!(summary.debounce.events_received, 2);
    assert_eq!(summary.debounce.events_coalesced, 0);
    assert_eq!(summary.debounce.signals_emitted, 2);
}

#[tokio::test]
async fn runner_fails_when_no_source_starts() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default().rooted_at(dir.path());
    let runner = WatchRunner::new(Orchestrator::from_config(&config).unwrap(), WINDOW, WINDOW)
        .with_source(Box::new(BrokenSource));

    let result = runner.run(std::future::pending::<()>()).await;

    assert!(matches!(result, Err(Error::Watch(_))));
}
