//! FIFO of submitted candidates: many agent producers, one arbiter consumer.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::core::types::{Candidate, Item};
use crate::sync::lock;

#[derive(Debug, Default)]
pub struct CandidateQueue {
    pending: Mutex<VecDeque<Candidate>>,
    ready: Condvar,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, candidate: Candidate) {
        lock(&self.pending).push_back(candidate);
        self.ready.notify_one();
    }

    pub fn pop(&self) -> Option<Candidate> {
        lock(&self.pending).pop_front()
    }

    pub fn len(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.pending).is_empty()
    }

    /// Remove every queued candidate that references any of `items`, keeping order.
    pub fn purge(&self, items: &[Item]) -> Vec<Candidate> {
        let mut pending = lock(&self.pending);
        let mut purged = Vec::new();
        pending.retain(|candidate| {
            if candidate.references_any(items) {
                purged.push(*candidate);
                false
            } else {
                true
            }
        });
        purged
    }

    /// Remove and return everything still queued.
    pub fn drain(&self) -> Vec<Candidate> {
        lock(&self.pending).drain(..).collect()
    }

    /// Block until the queue is non-empty, `timeout` elapses, or [`Self::interrupt`] is called.
    ///
    /// Returns true if a candidate is waiting.
    pub fn wait_ready(&self, timeout: Duration) -> bool {
        let pending = lock(&self.pending);
        if !pending.is_empty() {
            return true;
        }
        let (pending, _) = self
            .ready
            .wait_timeout(pending, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        !pending.is_empty()
    }

    /// Wake the consumer out of [`Self::wait_ready`].
    pub fn interrupt(&self) {
        let _pending = lock(&self.pending);
        self.ready.notify_all();
    }
}
