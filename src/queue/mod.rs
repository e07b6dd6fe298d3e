//! Pending item queue
//!
//! An in-memory FIFO of accepted items that decouples fetch cadence from publish
//! cadence. Items whose publish attempt failed go back to the *front*, so a single
//! hard-to-publish item is retried before newer work and never starves behind it.
//!
//! The queue is owned by the scheduler and is not shared; nothing here locks.

mod item;

pub use item::{CandidateItem, FetchedItem, ItemOrigin};

use std::collections::{HashSet, VecDeque};

/// Ordered buffer of accepted-but-unpublished items
#[derive(Debug, Clone)]
pub struct PendingQueue {
    /// Items awaiting publication, front first
    items: VecDeque<CandidateItem>,

    /// Recently published ids, oldest first
    history: VecDeque<String>,

    /// Lookup set mirroring `history`
    history_index: HashSet<String>,

    /// Maximum number of remembered published ids
    history_size: usize,
}

impl PendingQueue {
    /// Creates an empty queue remembering up to `history_size` published ids
    pub fn new(history_size: usize) -> Self {
        Self {
            items: VecDeque::new(),
            history: VecDeque::new(),
            history_index: HashSet::new(),
            history_size,
        }
    }

    /// Appends an item to the back
    ///
    /// Returns `false` (and drops the item) when an item with the same id is
    /// already pending or was published recently.
    pub fn enqueue(&mut self, item: CandidateItem) -> bool {
        if self.is_known(item.id()) {
            return false;
        }
        self.items.push_back(item);
        true
    }

    /// Removes and returns the front item
    pub fn dequeue_front(&mut self) -> Option<CandidateItem> {
        self.items.pop_front()
    }

    /// Puts an item back at the front after a failed publish attempt
    ///
    /// Never rejected as a duplicate: the item was just dequeued.
    pub fn requeue_front(&mut self, item: CandidateItem) {
        self.items.push_front(item);
    }

    /// Remembers a published id so later fetches do not queue it again
    pub fn mark_published(&mut self, id: &str) {
        if self.history_size == 0 || self.history_index.contains(id) {
            return;
        }
        self.history.push_back(id.to_string());
        self.history_index.insert(id.to_string());
        while self.history.len() > self.history_size {
            if let Some(evicted) = self.history.pop_front() {
                self.history_index.remove(&evicted);
            }
        }
    }

    /// Whether an id is pending or was published recently
    pub fn is_known(&self, id: &str) -> bool {
        self.history_index.contains(id) || self.items.iter().any(|item| item.id() == id)
    }

    /// Returns the front item without removing it
    pub fn peek(&self) -> Option<&CandidateItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for PendingQueue {
    fn default() -> Self {
        Self::new(500)
    }
}
