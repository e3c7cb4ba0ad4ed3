//! Change sources feeding the debouncer.
//!
//! Filesystem notifications and the fallback poll both implement
//! [`ChangeSource`] and push [`ChangeEvent`]s into one channel. The watch
//! loop does not care where an event came from beyond its [`Channel`].

use super::debouncer::Channel;
use crate::io::Format;
use crate::{Error, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Channel the change belongs to.
    pub channel: Channel,
    /// Affected path, when known.
    pub path: Option<PathBuf>,
}

impl ChangeEvent {
    /// Creates an event for `channel`.
    #[must_use]
    pub const fn new(channel: Channel, path: Option<PathBuf>) -> Self {
        Self { channel, path }
    }
}

/// A producer of change notifications.
pub trait ChangeSource: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Starts producing events into `tx`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Watch`] if the source cannot be set up.
    fn start(&mut self, tx: UnboundedSender<ChangeEvent>) -> Result<()>;

    /// Stops producing events. Idempotent.
    fn stop(&mut self);
}

/// Operating-system file notifications.
///
/// Watches the input directory recursively and the snapshot file's parent
/// directory non-recursively with a single watcher.
pub struct FsNotifySource {
    input_dir: PathBuf,
    snapshot_path: PathBuf,
    watcher: Option<RecommendedWatcher>,
}

impl FsNotifySource {
    /// Creates a source for the given input directory and snapshot file.
    #[must_use]
    pub fn new(input_dir: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            snapshot_path: snapshot_path.into(),
            watcher: None,
        }
    }
}

/// Maps notify events onto channels.
#[derive(Debug, Clone)]
struct EventRouter {
    input_dir: PathBuf,
    snapshot_dir: PathBuf,
    snapshot_name: Option<OsString>,
}

impl EventRouter {
    fn route(&self, event: &Event) -> Vec<ChangeEvent> {
        if !is_relevant(&event.kind) {
            return Vec::new();
        }
        event
            .paths
            .iter()
            .filter_map(|path| self.classify(path).map(|c| ChangeEvent::new(c, Some(path.clone()))))
            .collect()
    }

    fn classify(&self, path: &Path) -> Option<Channel> {
        if path.starts_with(&self.input_dir) && Format::from_path(path).is_some() {
            return Some(Channel::RawInput);
        }
        let in_snapshot_dir = path.parent() == Some(self.snapshot_dir.as_path());
        (in_snapshot_dir && path.file_name() == self.snapshot_name.as_deref())
            .then_some(Channel::Snapshot)
    }
}

/// Creations and modifications count; removals and the source half of a
/// rename (our own archiving) do not.
const fn is_relevant(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Any => true,
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => false,
        EventKind::Modify(_) => true,
        EventKind::Access(_) | EventKind::Remove(_) | EventKind::Other => false,
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

impl ChangeSource for FsNotifySource {
    fn name(&self) -> &'static str {
        "fs_notify"
    }

    fn start(&mut self, tx: UnboundedSender<ChangeEvent>) -> Result<()> {
        if self.watcher.is_some() {
            return Ok(());
        }

        let snapshot_dir = match self.snapshot_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let router = EventRouter {
            input_dir: canonical_or_self(&self.input_dir),
            snapshot_dir: canonical_or_self(&snapshot_dir),
            snapshot_name: self.snapshot_path.file_name().map(OsString::from),
        };
        let callback_router = router.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                for change in callback_router.route(&event) {
                    debug!(channel = %change.channel, path = ?change.path, "change notification");
                    if tx.send(change).is_err() {
                        return;
                    }
                }
            },
            Err(e) => warn!(error = %e, "file notification error"),
        })
        .map_err(|e| Error::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&router.input_dir, RecursiveMode::Recursive)
            .map_err(|e| Error::Watch(format!("cannot watch {}: {e}", router.input_dir.display())))?;
        if !router.snapshot_dir.starts_with(&router.input_dir) {
            watcher
                .watch(&router.snapshot_dir, RecursiveMode::NonRecursive)
                .map_err(|e| {
                    Error::Watch(format!("cannot watch {}: {e}", router.snapshot_dir.display()))
                })?;
        }

        self.watcher = Some(watcher);
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the watcher unregisters every watch.
        self.watcher = None;
    }
}

/// Fallback timer that emits a [`Channel::Poll`] event every interval.
///
/// The first tick is skipped; the watch loop already runs a pass at
/// startup.
pub struct PollSource {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl PollSource {
    /// Creates a poll source with the given period.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Returns the poll period.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

impl ChangeSource for PollSource {
    fn name(&self) -> &'static str {
        "poll"
    }

    fn start(&mut self, tx: UnboundedSender<ChangeEvent>) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Watch("poll interval must be positive".to_string()));
        }
        if self.task.is_some() {
            return Ok(());
        }
        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(ChangeEvent::new(Channel::Poll, None)).is_err() {
                    break;
                }
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for PollSource {
    fn drop(&mut self) {
        self.stop();
    }
}
