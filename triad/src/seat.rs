//! Per-agent shared cell: phase, score and pending selection events.
//!
//! The agent thread owns its state machine; the arbiter only ever moves a seat
//! out of [`Phase::Awaiting`] (verdict, purge or round reset). Every transition
//! notifies the seat's condition variable so a blocked agent wakes promptly.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

use crate::core::types::{AgentId, Phase, Slot, Verdict};
use crate::sync::lock;

/// Maximum number of selection events buffered for one agent.
pub const INBOX_CAPACITY: usize = 3;

#[derive(Debug)]
struct SeatState {
    phase: Phase,
    score: u32,
    inbox: VecDeque<Slot>,
}

#[derive(Debug)]
pub struct Seat {
    id: AgentId,
    state: Mutex<SeatState>,
    signal: Condvar,
}

impl Seat {
    pub fn new(id: AgentId) -> Self {
        Self {
            id,
            state: Mutex::new(SeatState {
                phase: Phase::Playing,
                score: 0,
                inbox: VecDeque::with_capacity(INBOX_CAPACITY),
            }),
            signal: Condvar::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        lock(&self.state).phase
    }

    pub fn score(&self) -> u32 {
        lock(&self.state).score
    }

    /// Buffer a selection event. Dropped unless the agent is playing and the inbox has room.
    pub fn offer_selection(&self, slot: Slot) -> bool {
        let mut state = lock(&self.state);
        if state.phase != Phase::Playing || state.inbox.len() >= INBOX_CAPACITY {
            return false;
        }
        state.inbox.push_back(slot);
        self.signal.notify_all();
        true
    }

    #[cfg(test)]
    pub fn pending_selections(&self) -> usize {
        lock(&self.state).inbox.len()
    }

    pub fn has_room(&self) -> bool {
        let state = lock(&self.state);
        state.phase == Phase::Playing && state.inbox.len() < INBOX_CAPACITY
    }

    pub fn clear_selections(&self) {
        lock(&self.state).inbox.clear();
    }

    /// Take the oldest buffered selection, waiting up to `timeout` for one to arrive.
    ///
    /// Returns early with `None` when the phase leaves `Playing` or the seat is interrupted.
    pub fn next_selection(&self, timeout: Duration) -> Option<Slot> {
        let state = lock(&self.state);
        let (mut state, _) = self
            .signal
            .wait_timeout_while(state, timeout, |state| {
                state.inbox.is_empty() && state.phase == Phase::Playing
            })
            .unwrap_or_else(PoisonError::into_inner);
        if state.phase != Phase::Playing {
            return None;
        }
        state.inbox.pop_front()
    }

    /// Enter `Awaiting`. Called by the agent just before it queues a candidate.
    pub fn begin_awaiting(&self) {
        lock(&self.state).phase = Phase::Awaiting;
    }

    /// Block while the seat is `Awaiting`, for at most `timeout`. Returns the phase seen on wake.
    pub fn wait_outcome(&self, timeout: Duration) -> Phase {
        let state = lock(&self.state);
        let (state, _) = self
            .signal
            .wait_timeout_while(state, timeout, |state| state.phase == Phase::Awaiting)
            .unwrap_or_else(PoisonError::into_inner);
        state.phase
    }

    /// Deliver the arbiter's verdict. Ignored unless the agent is awaiting one.
    pub fn deliver(&self, verdict: Verdict) -> bool {
        self.transition_from_awaiting(Phase::from(verdict))
    }

    /// Return an awaiting agent to `Playing` without a verdict (purge or round reset).
    pub fn release(&self) -> bool {
        self.transition_from_awaiting(Phase::Playing)
    }

    /// Leave a freeze and accept input again. Buffered selections made before the verdict are dropped.
    pub fn resume_playing(&self) {
        let mut state = lock(&self.state);
        state.phase = Phase::Playing;
        state.inbox.clear();
        self.signal.notify_all();
    }

    /// Credit one point and return the new score.
    pub fn award_point(&self) -> u32 {
        let mut state = lock(&self.state);
        state.score += 1;
        state.score
    }

    /// Wake any thread waiting on this seat so it can observe shutdown.
    pub fn interrupt(&self) {
        let _state = lock(&self.state);
        self.signal.notify_all();
    }

    fn transition_from_awaiting(&self, next: Phase) -> bool {
        let mut state = lock(&self.state);
        if state.phase != Phase::Awaiting {
            return false;
        }
        state.phase = next;
        self.signal.notify_all();
        true
    }
}
