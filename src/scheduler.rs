//! Virtual-time timer queue.
//!
//! The notepad never sleeps or spawns threads. It keeps every delayed action in
//! a [`Timeline`] and the host advances the clock. Entries fire in
//! (due time, insertion order), so two entries scheduled from the same point
//! with delays D1 < D2 always fire in that order.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle returned for every scheduled entry; used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    repeat: Option<Duration>,
    payload: T,
}

/// Ordered queue of one-shot and repeating timers over a virtual clock.
#[derive(Debug)]
pub struct Timeline<T> {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Entry<T>>,
    index: HashMap<TimerId, (Duration, u64)>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timeline<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run `payload` once, `delay` after the current virtual time.
    pub fn schedule_once(&mut self, delay: Duration, payload: T) -> TimerId {
        self.insert(self.now + delay, None, payload)
    }

    /// Run `payload` every `interval`, first at `now + interval`.
    ///
    /// A zero interval is bumped to one millisecond so the queue always drains.
    pub fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerId {
        let interval = interval.max(Duration::from_millis(1));
        self.insert(self.now + interval, Some(interval), payload)
    }

    /// Remove a pending entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drop every pending entry.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.index.clear();
    }

    /// Pop the earliest entry due at or before `until`, moving the clock to its due time.
    ///
    /// Repeating entries are re-armed at `due + interval` before the payload is
    /// handed out, so the caller only sees a clone.
    pub fn pop_due(&mut self, until: Duration) -> Option<T>
    where
        T: Clone,
    {
        let (&key, _) = self.queue.iter().next()?;
        let (due, _) = key;
        if due > until {
            return None;
        }

        let entry = self.queue.remove(&key)?;
        self.index.remove(&entry.id);
        self.now = self.now.max(due);

        match entry.repeat {
            Some(interval) => {
                let payload = entry.payload.clone();
                self.reinsert(entry.id, due + interval, interval, entry.payload);
                Some(payload)
            }
            None => Some(entry.payload),
        }
    }

    /// Move the clock forward to `until` once nothing else is due.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    fn insert(&mut self, due: Duration, repeat: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_seq);
        let seq = self.bump_seq();
        self.queue.insert(
            (due, seq),
            Entry {
                id,
                repeat,
                payload,
            },
        );
        self.index.insert(id, (due, seq));
        id
    }

    fn reinsert(&mut self, id: TimerId, due: Duration, interval: Duration, payload: T) {
        let seq = self.bump_seq();
        self.queue.insert(
            (due, seq),
            Entry {
                id,
                repeat: Some(interval),
                payload,
            },
        );
        self.index.insert(id, (due, seq));
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
