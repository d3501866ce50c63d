//! # Event Log
//!
//! Ordered, append-only record of ledger events.
//!
//! Observers either poll a range from a cursor or hold a
//! [`LogSubscription`] that replays everything from its starting cursor and
//! then waits for new entries. Unlike a broadcast channel, nothing is ever
//! dropped for a slow reader: the log is the source of truth and a
//! subscription is only a cursor into it.

use crate::events::{EventFilter, LedgerEvent, LogEntry};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Append-only event log.
pub struct EventLog {
    /// Every event ever appended, in append order.
    entries: RwLock<Vec<LedgerEvent>>,
    /// Current log length, watched by subscriptions.
    head: watch::Sender<u64>,
}

impl EventLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        let (head, _) = watch::channel(0);
        Self {
            entries: RwLock::new(Vec::new()),
            head,
        }
    }

    /// Append a single event, returning its sequence number.
    pub fn append(&self, event: LedgerEvent) -> u64 {
        self.append_all(vec![event])
    }

    /// Append a batch of events contiguously, returning the sequence
    /// number of the first one.
    ///
    /// No other append can interleave with the batch.
    pub fn append_all(&self, events: Vec<LedgerEvent>) -> u64 {
        let mut entries = self.entries.write();
        let first = entries.len() as u64;
        let count = events.len();
        entries.extend(events);
        let len = entries.len() as u64;
        drop(entries);

        self.head.send_replace(len);
        debug!(first, count, "Appended events to log");
        first
    }

    /// Number of events in the log.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries.read().len() as u64
    }

    /// Returns true if nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns the entry at `sequence`, if any.
    #[must_use]
    pub fn entry(&self, sequence: u64) -> Option<LogEntry> {
        let index = usize::try_from(sequence).ok()?;
        self.entries.read().get(index).map(|event| LogEntry {
            sequence,
            event: event.clone(),
        })
    }

    /// Returns up to `max` entries starting at `cursor`.
    ///
    /// An empty result means the reader is caught up. The next cursor is
    /// the last returned sequence plus one.
    #[must_use]
    pub fn poll(&self, cursor: u64, max: usize) -> Vec<LogEntry> {
        let Ok(start) = usize::try_from(cursor) else {
            return Vec::new();
        };
        let entries = self.entries.read();
        entries
            .iter()
            .enumerate()
            .skip(start)
            .take(max)
            .map(|(index, event)| LogEntry {
                sequence: index as u64,
                event: event.clone(),
            })
            .collect()
    }

    /// Subscribe to events matching `filter`, starting at `cursor`.
    ///
    /// Cursor 0 replays the whole log.
    #[must_use]
    pub fn subscribe_from(self: &Arc<Self>, cursor: u64, filter: EventFilter) -> LogSubscription {
        debug!(cursor, kinds = ?filter.kinds, "New log subscription created");
        LogSubscription {
            log: Arc::clone(self),
            head: self.head.subscribe(),
            cursor,
            filter,
        }
    }

    /// Find the next entry at or after `cursor` that matches `filter`.
    ///
    /// Returns the entry (if any) and the cursor to resume from.
    fn next_matching(&self, cursor: u64, filter: &EventFilter) -> (Option<LogEntry>, u64) {
        let entries = self.entries.read();
        let mut sequence = cursor;
        while let Some(event) = usize::try_from(sequence).ok().and_then(|i| entries.get(i)) {
            sequence += 1;
            if filter.matches(event) {
                let entry = LogEntry {
                    sequence: sequence - 1,
                    event: event.clone(),
                };
                return (Some(entry), sequence);
            }
        }
        (None, sequence)
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog").field("len", &self.len()).finish()
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// A cursor into the event log that yields matching entries in order.
pub struct LogSubscription {
    log: Arc<EventLog>,
    head: watch::Receiver<u64>,
    cursor: u64,
    filter: EventFilter,
}

impl LogSubscription {
    /// Receive the next matching entry, waiting for new appends if the
    /// subscription is caught up.
    ///
    /// # Returns
    ///
    /// - `Some(entry)` - The next matching entry
    /// - `None` - The log was dropped
    pub async fn recv(&mut self) -> Option<LogEntry> {
        loop {
            // Mark the current head as seen before scanning, so an append
            // racing with the scan wakes the `changed()` below.
            self.head.borrow_and_update();
            if let Some(entry) = self.try_recv() {
                return Some(entry);
            }
            if self.head.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Return the next matching entry without waiting.
    pub fn try_recv(&mut self) -> Option<LogEntry> {
        let (entry, cursor) = self.log.next_matching(self.cursor, &self.filter);
        self.cursor = cursor;
        entry
    }

    /// Sequence number the next scan starts from.
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
