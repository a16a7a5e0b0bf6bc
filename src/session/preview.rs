use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Debounce used by the editor when regenerating screen thumbnails.
pub const DEFAULT_PREVIEW_DEBOUNCE: Duration = Duration::from_millis(500);

/// Source of the timestamps preview requests are stamped with.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(origin: Instant) -> Self {
        Self {
            origin,
            elapsed_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .elapsed_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
                Some(v.saturating_add(ns))
            });
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}

/// Debounced, per-screen preview requests.
///
/// Time is passed in by the caller so the schedule is deterministic. A newer request for a screen
/// replaces its pending one, so at most one generation per screen is ever outstanding.
#[derive(Clone, Debug)]
pub struct PreviewScheduler {
    debounce: Duration,
    pending: BTreeMap<u32, Instant>,
}

impl Default for PreviewScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_DEBOUNCE)
    }
}

impl PreviewScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: BTreeMap::new(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Schedule `screen` for `now + debounce`, cancelling any earlier request for it.
    pub fn request(&mut self, screen: u32, now: Instant) {
        self.pending.insert(screen, now + self.debounce);
    }

    pub fn cancel(&mut self, screen: u32) -> bool {
        self.pending.remove(&screen).is_some()
    }

    pub fn is_pending(&self, screen: u32) -> bool {
        self.pending.contains_key(&screen)
    }

    /// When `screen` becomes due, if it is pending.
    pub fn deadline(&self, screen: u32) -> Option<Instant> {
        self.pending.get(&screen).copied()
    }

    /// Remove and return the screens whose debounce elapsed by `now`, in id order.
    pub fn due(&mut self, now: Instant) -> Vec<u32> {
        let ready: Vec<u32> = self
            .pending
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| *id)
            .collect();
        for id in &ready {
            self.pending.remove(id);
        }
        ready
    }

    /// Remove and return every pending screen regardless of its deadline.
    pub fn drain(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.pending).into_keys().collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
