//! Per-player state machine.
//!
//! An [`Agent`] turns buffered selection events into tokens on the board.
//! When it holds exactly three tokens it snapshots the items beneath them
//! into a [`Candidate`], queues it for the arbiter and blocks until its seat
//! leaves [`Phase::Awaiting`]. Verdicts are then served on the agent's own
//! thread: a point or a penalty freezes the agent for the configured time.
//!
//! Token placement and candidate submission both happen under the board lock,
//! and only while the board is open, so the arbiter never sees a candidate
//! built against a board it has already closed.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use crate::core::table::MAX_TOKENS;
use crate::core::types::{AgentId, Candidate, Item, Phase};
use crate::driver::Driver;
use crate::seat::Seat;
use crate::shared::Shared;

const FREEZE_STEP: Duration = Duration::from_secs(1);

pub struct Agent {
    id: AgentId,
    shared: Arc<Shared>,
    /// Items of the last queued candidate; the same triple is not queued twice in a row.
    last_submitted: Option<[Item; MAX_TOKENS]>,
}

impl Agent {
    pub fn new(id: AgentId, shared: Arc<Shared>) -> Result<Self> {
        shared.seat(id)?;
        Ok(Self {
            id,
            shared,
            last_submitted: None,
        })
    }

    /// Run the agent loop on a dedicated named thread.
    pub fn spawn(self) -> Result<JoinHandle<Result<()>>> {
        thread::Builder::new()
            .name(format!("player-{}", self.id))
            .spawn(move || self.run())
            .context("spawn player thread")
    }

    /// Agent main loop: runs until the game is terminated.
    ///
    /// Computer players start their driver first and join it before returning.
    pub fn run(mut self) -> Result<()> {
        info!(player = self.id, "player starting");
        let driver = if self.shared.config.is_human(self.id) {
            None
        } else {
            Some(Driver::new(self.id, Arc::clone(&self.shared)).spawn()?)
        };

        while !self.shared.is_terminated() {
            self.step();
        }

        if let Some(driver) = driver {
            driver
                .join()
                .map_err(|_| anyhow!("driver thread for player {} panicked", self.id))?;
        }
        info!(player = self.id, "player terminated");
        Ok(())
    }

    /// One iteration of the state machine.
    pub fn step(&mut self) {
        match self.seat().phase() {
            Phase::Point => self.point(),
            Phase::Penalty => self.penalty(),
            Phase::Awaiting => {
                self.seat().wait_outcome(self.shared.config.tick());
            }
            Phase::Playing => {
                if let Some(slot) = self.seat().next_selection(self.shared.config.tick()) {
                    self.select(slot);
                }
                self.try_submit();
            }
        }
    }

    /// Toggle a token on `slot`. Returns true if the board changed.
    ///
    /// Ignored while the board is closed or after termination.
    pub fn select(&mut self, slot: usize) -> bool {
        let mut board = self.shared.board();
        if !board.open || self.shared.is_terminated() {
            return false;
        }
        if board.table.has_token(self.id, slot) {
            board.table.remove_token(self.id, slot);
            self.last_submitted = None;
            debug!(player = self.id, slot, "token removed");
            return true;
        }
        let placed = board.table.place_token(self.id, slot);
        if placed {
            debug!(player = self.id, slot, "token placed");
        }
        placed
    }

    /// Queue a candidate if the agent holds exactly three tokens whose items differ from the
    /// last submitted triple.
    ///
    /// The triple is compared by item, so a slot the arbiter emptied and refilled counts as a
    /// change. Tokens whose slot has lost its item are retracted and nothing is queued.
    pub fn try_submit(&mut self) -> Option<Candidate> {
        let mut board = self.shared.board();
        if !board.open || self.shared.is_terminated() {
            return None;
        }
        let slots = board.table.tokens_of(self.id);
        if slots.len() != MAX_TOKENS {
            return None;
        }

        let mut items = Vec::with_capacity(MAX_TOKENS);
        let mut stale = Vec::new();
        for slot in slots {
            match board.table.item_at(slot) {
                Some(item) => items.push(item),
                None => stale.push(slot),
            }
        }
        if !stale.is_empty() {
            for slot in stale {
                board.table.remove_token(self.id, slot);
            }
            debug!(player = self.id, "stale tokens retracted");
            return None;
        }
        let items: [Item; MAX_TOKENS] = items.try_into().ok()?;
        if self.last_submitted == Some(items) {
            return None;
        }

        let candidate = Candidate::new(self.id, items);
        // Awaiting must be visible before the arbiter can pop the candidate.
        self.seat().begin_awaiting();
        self.shared.queue.push(candidate);
        self.last_submitted = Some(items);
        debug!(player = self.id, items = ?candidate.items, "candidate queued");
        Some(candidate)
    }

    fn point(&mut self) {
        let score = self.seat().award_point();
        self.shared.display.set_score(self.id, score);
        info!(player = self.id, score, "point");
        self.freeze(self.shared.config.point_freeze());

        {
            let mut board = self.shared.board();
            for slot in board.table.tokens_of(self.id) {
                board.table.remove_token(self.id, slot);
            }
        }
        self.last_submitted = None;
        self.seat().resume_playing();
    }

    fn penalty(&mut self) {
        info!(player = self.id, "penalty");
        self.freeze(self.shared.config.penalty_freeze());
        self.seat().resume_playing();
    }

    /// Count a freeze down in whole-second steps. Cut short only by termination.
    fn freeze(&self, duration: Duration) {
        let display = &self.shared.display;
        let mut remaining = duration;
        display.set_freeze(self.id, remaining);
        while !remaining.is_zero() {
            let step = remaining.min(FREEZE_STEP);
            remaining = if self.shared.shutdown.sleep(step) {
                Duration::ZERO
            } else {
                remaining - step
            };
            display.set_freeze(self.id, remaining);
        }
    }

    fn seat(&self) -> &Seat {
        &self.shared.seats[self.id]
    }
}

/// Entry point for selection events produced outside the agent thread.
///
/// Events are buffered on the agent's seat and applied by the agent loop.
#[derive(Clone)]
pub struct GameHandle {
    shared: Arc<Shared>,
}

impl GameHandle {
    pub fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Offer a selection of `slot` for `agent`.
    ///
    /// Dropped when the game is over, the board is closed, the slot is empty,
    /// or the agent is not accepting input.
    pub fn select(&self, agent: AgentId, slot: usize) -> bool {
        if self.shared.is_terminated() {
            return false;
        }
        {
            let board = self.shared.board();
            if !board.open || board.table.item_at(slot).is_none() {
                return false;
            }
        }
        match self.shared.seats.get(agent) {
            Some(seat) => seat.offer_selection(slot),
            None => false,
        }
    }

    pub fn terminate(&self) {
        self.shared.terminate();
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.is_terminated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbiter::{Arbiter, Fill};
    use crate::core::invariants::check_table;
    use crate::core::types::{Judgement, Verdict};
    use crate::test_support::{
        DisplayEvent, RecordingDisplay, open_board, quick_config, recording_game_with, shared_game,
    };
    use std::time::Instant;

    fn freeze_events(display: &RecordingDisplay) -> Vec<Duration> {
        display
            .events()
            .into_iter()
            .filter_map(|event| match event {
                DisplayEvent::Freeze { remaining, .. } => Some(remaining),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn select_toggles_tokens_up_to_three() {
        let shared = shared_game(1, 0);
        open_board(&shared, &[(0, 0), (1, 1), (2, 2), (3, 40)]);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");

        assert!(agent.select(0));
        assert!(agent.select(1));
        assert!(agent.select(2));
        assert!(!agent.select(3));
        assert!(agent.select(1));
        assert!(agent.select(3));
        assert_eq!(shared.board().table.tokens_of(0), vec![0, 2, 3]);
        assert!(check_table(&shared.board().table).is_empty());
    }

    #[test]
    fn select_ignores_empty_slots_and_closed_board() {
        let shared = shared_game(1, 0);
        open_board(&shared, &[(0, 0)]);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");
        assert!(!agent.select(5));

        shared.board().open = false;
        assert!(!agent.select(0));
        assert_eq!(shared.board().table.token_count(0), 0);
    }

    #[test]
    fn third_token_queues_candidate_and_awaits() {
        let shared = shared_game(1, 0);
        open_board(&shared, &[(0, 0), (1, 1), (2, 2)]);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");
        agent.select(0);
        agent.select(1);
        assert!(agent.try_submit().is_none());
        agent.select(2);

        let candidate = agent.try_submit().expect("candidate");
        assert_eq!(candidate.items, [Item(0), Item(1), Item(2)]);
        assert_eq!(shared.queue.len(), 1);
        assert_eq!(shared.seats[0].phase(), Phase::Awaiting);
    }

    #[test]
    fn unchanged_selection_is_not_resubmitted() {
        let shared = shared_game(1, 0);
        open_board(&shared, &[(0, 0), (1, 1), (2, 4), (3, 3)]);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");
        for slot in 0..3 {
            agent.select(slot);
        }
        assert!(agent.try_submit().is_some());
        shared.queue.drain();
        shared.seats[0].deliver(Verdict::Penalty);
        shared.seats[0].resume_playing();

        assert!(agent.try_submit().is_none());
        agent.select(2);
        agent.select(3);
        let candidate = agent.try_submit().expect("changed selection");
        assert_eq!(candidate.items, [Item(0), Item(1), Item(3)]);
    }

    #[test]
    fn handle_rejects_selection_for_empty_slot_or_unknown_player() {
        let shared = shared_game(1, 0);
        open_board(&shared, &[(0, 0)]);
        let handle = GameHandle::new(Arc::clone(&shared));
        assert!(!handle.select(0, 1));
        assert!(!handle.select(7, 0));
        assert!(handle.select(0, 0));
        assert_eq!(shared.seats[0].pending_selections(), 1);

        handle.terminate();
        assert!(!handle.select(0, 0));
    }

    #[test]
    fn triple_changed_by_arbiter_is_submitted_after_penalty() {
        let mut config = quick_config(2, 0);
        config.table_size = 5;
        let (shared, _) = recording_game_with(config);
        open_board(&shared, &[(0, 0), (1, 1), (2, 4), (3, 3), (4, 5)]);
        let mut first = Agent::new(0, Arc::clone(&shared)).expect("agent");
        let mut second = Agent::new(1, Arc::clone(&shared)).expect("agent");
        let mut arbiter = Arbiter::with_deck(Arc::clone(&shared), vec![Item(2), Item(6), Item(7)]);

        for slot in [0, 1, 2] {
            first.select(slot);
        }
        first.try_submit().expect("candidate");
        assert_eq!(arbiter.process_next(), Some(Judgement::Invalid));
        first.step();
        assert_eq!(shared.seats[0].phase(), Phase::Playing);

        // Another player consumes the item under the first player's third token.
        for slot in [2, 3, 4] {
            second.select(slot);
        }
        second.try_submit().expect("candidate");
        assert_eq!(arbiter.process_next(), Some(Judgement::Valid));
        assert_eq!(shared.board().table.tokens_of(0), vec![0, 1]);
        assert!(first.try_submit().is_none());
        assert_eq!(arbiter.fill(), Fill::Dealt(3));

        assert!(first.select(2));
        let candidate = first.try_submit().expect("new triple is queued");
        assert_eq!(candidate.items[..2], [Item(0), Item(1)]);
        assert_ne!(candidate.items[2], Item(4));
        assert_eq!(shared.queue.len(), 1);
        assert_eq!(shared.seats[0].phase(), Phase::Awaiting);
    }

    #[test]
    fn penalty_freeze_counts_down_in_whole_seconds() {
        let mut config = quick_config(1, 0);
        config.timing.penalty_freeze_millis = 1_500;
        let (shared, display) = recording_game_with(config);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");
        shared.seats[0].begin_awaiting();
        assert!(shared.seats[0].deliver(Verdict::Penalty));

        let frozen = thread::spawn(move || agent.step());
        thread::sleep(Duration::from_millis(300));
        assert_eq!(shared.seats[0].phase(), Phase::Penalty);
        frozen.join().expect("join agent step");

        assert_eq!(shared.seats[0].phase(), Phase::Playing);
        assert_eq!(
            freeze_events(&display),
            vec![
                Duration::from_millis(1_500),
                Duration::from_millis(500),
                Duration::ZERO
            ]
        );
    }

    #[test]
    fn termination_cuts_freeze_short() {
        let mut config = quick_config(1, 0);
        config.timing.point_freeze_millis = 60_000;
        let (shared, display) = recording_game_with(config);
        let mut agent = Agent::new(0, Arc::clone(&shared)).expect("agent");
        shared.seats[0].begin_awaiting();
        assert!(shared.seats[0].deliver(Verdict::Point));

        let start = Instant::now();
        let frozen = thread::spawn(move || agent.step());
        thread::sleep(Duration::from_millis(50));
        shared.terminate();
        frozen.join().expect("join agent step");

        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(shared.seats[0].score(), 1);
        assert_eq!(
            freeze_events(&display),
            vec![Duration::from_secs(60), Duration::ZERO]
        );
    }
}
