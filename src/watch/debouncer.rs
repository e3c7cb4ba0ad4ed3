//! Per-channel trigger debouncing.
//!
//! The debouncer holds no timers of its own; callers pass the current time
//! in and sleep until [`Debouncer::next_deadline`]. That keeps the
//! coalescing rules deterministic and testable without a runtime.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Longest window a channel may use; longer windows are clamped.
pub const MAX_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Independent trigger channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Changes under the input directory.
    RawInput,
    /// Changes to the snapshot file.
    Snapshot,
    /// Fallback poll tick. Not debounced.
    Poll,
}

impl Channel {
    /// Returns the channel name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RawInput => "raw_input",
            Self::Snapshot => "snapshot",
            Self::Poll => "poll",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debouncer counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Notifications received.
    pub events_received: u64,
    /// Notifications that reset an already pending timer.
    pub events_coalesced: u64,
    /// Signals emitted.
    pub signals_emitted: u64,
}

/// Coalesces bursts of notifications into one signal per channel.
///
/// Each channel has at most one pending deadline. A notification moves the
/// deadline to `now + window`; once `now` reaches the deadline the channel
/// fires exactly once and is cleared.
#[derive(Debug, Clone)]
pub struct Debouncer {
    windows: BTreeMap<Channel, Duration>,
    pending: BTreeMap<Channel, Instant>,
    stats: DebounceStats,
}

impl Debouncer {
    /// Creates a debouncer with the given windows for the two file channels.
    ///
    /// Windows longer than [`MAX_WINDOW`] are clamped.
    #[must_use]
    pub fn new(raw_window: Duration, snapshot_window: Duration) -> Self {
        let windows = BTreeMap::from([
            (Channel::RawInput, raw_window.min(MAX_WINDOW)),
            (Channel::Snapshot, snapshot_window.min(MAX_WINDOW)),
            (Channel::Poll, Duration::ZERO),
        ]);
        Self {
            windows,
            pending: BTreeMap::new(),
            stats: DebounceStats::default(),
        }
    }

    /// Returns the window of `channel`.
    #[must_use]
    pub fn window(&self, channel: Channel) -> Duration {
        self.windows.get(&channel).copied().unwrap_or_default()
    }

    /// Records a notification on `channel` at `now`.
    pub fn note(&mut self, channel: Channel, now: Instant) {
        self.stats.events_received = self.stats.events_received.saturating_add(1);
        let deadline = now
            .checked_add(self.window(channel))
            .or_else(|| now.checked_add(MAX_WINDOW))
            .unwrap_or(now);
        if self.pending.insert(channel, deadline).is_some() {
            self.stats.events_coalesced = self.stats.events_coalesced.saturating_add(1);
        }
    }

    /// Earliest pending deadline, if any channel is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns every channel whose deadline has passed.
    pub fn fire_ready(&mut self, now: Instant) -> Vec<Channel> {
        let ready: Vec<Channel> = self
            .pending
            .iter()
            .filter(|&(_, deadline)| *deadline <= now)
            .map(|(channel, _)| *channel)
            .collect();
        for channel in &ready {
            self.pending.remove(channel);
        }
        self.stats.signals_emitted = self.stats.signals_emitted.saturating_add(ready.len() as u64);
        ready
    }

    /// Returns true if `channel` has a pending deadline.
    #[must_use]
    pub fn is_pending(&self, channel: Channel) -> bool {
        self.pending.contains_key(&channel)
    }

    /// Returns the counters.
    #[must_use]
    pub const fn stats(&self) -> &DebounceStats {
        &self.stats
    }
}
