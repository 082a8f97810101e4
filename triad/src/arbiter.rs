//! The arbiter: deck owner, round timer and sole judge of candidates.
//!
//! The arbiter is the only party that puts items on the board or takes them
//! off. Each round it fills the board, then alternates between waiting on the
//! candidate queue (at most one tick), judging the oldest candidate and
//! topping the board back up, until the round deadline passes. A valid match
//! refreshes the deadline. When the deadline passes the board is closed,
//! anything still queued is judged, and the board is swept back into the deck.
//!
//! The game ends when termination is requested, when the undealt deck alone
//! holds no match, or when a fill finds no match anywhere on deck or board.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument, warn};

use crate::agent::Agent;
use crate::core::types::{Item, Judgement, Phase, Slot, Verdict};
use crate::core::winners::winners;
use crate::game::GameOutcome;
use crate::shared::Shared;

/// Result of one fill pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Board topped up with this many items.
    Dealt(usize),
    /// No match is possible on deck and board combined; the game was terminated.
    Exhausted,
}

pub struct Arbiter {
    shared: Arc<Shared>,
    deck: Vec<Item>,
    slot_order: Vec<Slot>,
    rng: StdRng,
    deadline: Instant,
    rounds: u32,
    matches: u32,
}

impl Arbiter {
    /// Arbiter holding the full configured deck.
    pub fn new(shared: Arc<Shared>) -> Result<Self> {
        let deck_len = u32::try_from(shared.config.deck_len()?)
            .map_err(|_| anyhow!("deck too large"))?;
        let deck = (0..deck_len).map(Item).collect();
        Ok(Self::with_deck(shared, deck))
    }

    /// Arbiter holding exactly `deck` as its undealt items.
    pub fn with_deck(shared: Arc<Shared>, deck: Vec<Item>) -> Self {
        let slot_order = (0..shared.config.table_size).collect();
        let rng = shared.rng(0);
        Self {
            shared,
            deck,
            slot_order,
            rng,
            deadline: Instant::now(),
            rounds: 0,
            matches: 0,
        }
    }

    pub fn deck(&self) -> &[Item] {
        &self.deck
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    /// Arbiter main loop. Spawns every player, runs rounds until the game ends,
    /// joins the players in reverse start order and announces the winners.
    pub fn run(mut self) -> Result<GameOutcome> {
        info!(
            players = self.shared.seats.len(),
            deck = self.deck.len(),
            "arbiter starting"
        );
        let players = self.spawn_players()?;

        while !self.should_finish() {
            if self.fill() == Fill::Exhausted {
                break;
            }
            self.run_round();
            if !self.shared.is_terminated() {
                self.clear_board();
            }
        }
        self.shared.terminate();

        let joined = join_players(players);
        self.settle_points();
        let outcome = self.announce_winners();
        info!(rounds = outcome.rounds, matches = outcome.matches, "arbiter terminated");
        joined?;
        Ok(outcome)
    }

    fn spawn_players(&self) -> Result<Vec<JoinHandle<Result<()>>>> {
        let mut players = Vec::with_capacity(self.shared.seats.len());
        for id in 0..self.shared.seats.len() {
            let spawned = Agent::new(id, Arc::clone(&self.shared)).and_then(Agent::spawn);
            match spawned {
                Ok(handle) => players.push(handle),
                Err(err) => {
                    self.shared.terminate();
                    let _ = join_players(players);
                    return Err(err);
                }
            }
        }
        Ok(players)
    }

    /// True once termination was requested or the undealt deck holds no match.
    pub fn should_finish(&self) -> bool {
        self.shared.is_terminated() || !self.shared.rules.has_any_match(&self.deck)
    }

    /// Deal undealt items into empty slots, or end the game if no match is left anywhere.
    #[instrument(level = "debug", skip_all)]
    pub fn fill(&mut self) -> Fill {
        let mut board = self.shared.board();
        self.slot_order.shuffle(&mut self.rng);

        let mut pool = self.deck.clone();
        pool.extend(board.table.items());
        if !self.shared.rules.has_any_match(&pool) {
            drop(board);
            info!(remaining = pool.len(), "no match left on deck or board");
            self.shared.shutdown.sleep(self.shared.config.end_game_pause());
            {
                let mut board = self.shared.board();
                board.open = false;
                board.table.clear_all_tokens();
            }
            self.shared.display.clear_token_display();
            self.shared.terminate();
            return Fill::Exhausted;
        }

        self.deck.shuffle(&mut self.rng);
        let mut dealt = 0;
        for &slot in &self.slot_order {
            if board.table.item_at(slot).is_some() {
                continue;
            }
            match self.deck.pop() {
                Some(item) => match board.table.place(item, slot) {
                    Ok(()) => dealt += 1,
                    Err(err) => {
                        warn!(%item, slot, err = %err, "failed to place item");
                        self.deck.push(item);
                    }
                },
                None => {
                    let cleared = board.table.clear_slot_tokens(slot);
                    if !cleared.is_empty() {
                        debug!(slot, ?cleared, "tokens cleared from empty slot");
                    }
                }
            }
        }

        if dealt > 0 {
            info!(dealt, deck = self.deck.len(), board = %board.table.layout(), "board filled");
            if self.shared.config.hints {
                let items = board.table.items();
                if let Some(hint) = self.shared.rules.find_matches(&items, 1).first() {
                    let slots: Vec<Option<Slot>> =
                        hint.iter().map(|item| board.table.slot_of(*item)).collect();
                    debug!(?slots, items = ?hint, "hint");
                }
            }
        }
        Fill::Dealt(dealt)
    }

    /// Run one timed round: open the board and judge candidates until the deadline.
    ///
    /// Candidates still queued when the deadline passes are judged before
    /// returning; the board stays closed while they are.
    #[instrument(skip_all, fields(round = self.rounds + 1))]
    pub fn run_round(&mut self) {
        self.shared.board().open = true;
        self.rounds += 1;
        self.reset_deadline();
        info!(deck = self.deck.len(), "round started");

        let tick = self.shared.config.tick();
        while !self.shared.is_terminated() {
            let remaining = self.remaining();
            if remaining.is_zero() {
                break;
            }
            self.shared.queue.wait_ready(tick.min(remaining));
            if self.shared.is_terminated() {
                break;
            }
            self.update_countdown();
            if self.remaining().is_zero() {
                break;
            }
            if self.process_next() == Some(Judgement::Valid) {
                self.reset_deadline();
            }
            if self.fill() == Fill::Exhausted {
                return;
            }
        }

        self.shared.board().open = false;
        if self.shared.is_terminated() {
            return;
        }
        let mut drained = 0;
        while self.process_next().is_some() {
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "judged candidates queued at the deadline");
        }
    }

    /// Pop and judge the oldest queued candidate, if any.
    #[instrument(level = "debug", skip_all)]
    pub fn process_next(&mut self) -> Option<Judgement> {
        let mut board = self.shared.board();
        let candidate = self.shared.queue.pop()?;
        let Some(seat) = self.shared.seats.get(candidate.agent) else {
            warn!(player = candidate.agent, "candidate from unknown player dropped");
            return Some(Judgement::Stale);
        };

        let slots: Option<Vec<Slot>> = candidate
            .items
            .iter()
            .map(|item| board.table.slot_of(*item))
            .collect();
        let Some(slots) = slots else {
            seat.release();
            debug!(player = candidate.agent, items = ?candidate.items, "stale candidate discarded");
            return Some(Judgement::Stale);
        };

        let [a, b, c] = candidate.items;
        if !self.shared.rules.is_match(a, b, c) {
            seat.deliver(Verdict::Penalty);
            debug!(player = candidate.agent, items = ?candidate.items, "invalid candidate");
            return Some(Judgement::Invalid);
        }

        for slot in slots {
            if let Some((item, displaced)) = board.table.remove(slot) {
                debug!(%item, slot, ?displaced, "item retired");
            }
        }
        self.matches += 1;
        for purged in self.shared.queue.purge(&candidate.items) {
            if let Some(other) = self.shared.seats.get(purged.agent) {
                other.release();
            }
            debug!(player = purged.agent, items = ?purged.items, "queued candidate purged");
        }
        seat.deliver(Verdict::Point);
        info!(player = candidate.agent, items = ?candidate.items, "valid match");
        Some(Judgement::Valid)
    }

    /// Close the board, release every waiting agent and return all items to the deck.
    #[instrument(level = "debug", skip_all)]
    pub fn clear_board(&mut self) {
        let mut board = self.shared.board();
        board.open = false;
        for candidate in self.shared.queue.drain() {
            if let Some(seat) = self.shared.seats.get(candidate.agent) {
                seat.release();
            }
        }
        board.table.clear_all_tokens();
        self.shared.display.clear_token_display();
        for seat in &self.shared.seats {
            seat.release();
            seat.clear_selections();
        }

        self.slot_order.shuffle(&mut self.rng);
        let mut returned = 0;
        for &slot in &self.slot_order {
            if let Some((item, _)) = board.table.remove(slot) {
                self.deck.push(item);
                returned += 1;
            }
        }
        debug!(returned, deck = self.deck.len(), "board cleared");
    }

    /// Credit points delivered too late for their agent to serve them.
    ///
    /// Runs after every player has been joined.
    fn settle_points(&self) {
        for seat in &self.shared.seats {
            if seat.phase() == Phase::Point {
                let score = seat.award_point();
                seat.resume_playing();
                self.shared.display.set_score(seat.id(), score);
                info!(player = seat.id(), score, "point credited at shutdown");
            }
        }
    }

    fn announce_winners(&self) -> GameOutcome {
        let scores: Vec<u32> = self.shared.seats.iter().map(|seat| seat.score()).collect();
        let winners = winners(&scores);
        self.shared.display.announce_winners(&winners);
        GameOutcome {
            scores,
            winners,
            rounds: self.rounds,
            matches: self.matches,
        }
    }

    fn reset_deadline(&mut self) {
        self.deadline = Instant::now() + self.shared.config.turn_timeout();
        self.update_countdown();
    }

    fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    fn update_countdown(&self) {
        let remaining = self.remaining();
        let urgent = remaining <= self.shared.config.turn_timeout_warning();
        self.shared.display.set_countdown(remaining, urgent);
    }
}

/// Join player threads in reverse start order, reporting the first failure.
fn join_players(players: Vec<JoinHandle<Result<()>>>) -> Result<()> {
    let mut first_err = None;
    for handle in players.into_iter().rev() {
        let result = handle
            .join()
            .map_err(|_| anyhow!("player thread panicked"))
            .and_then(|result| result);
        if let Err(err) = result {
            warn!(err = %err, "player thread failed");
            first_err.get_or_insert(err);
        }
    }
    match first_err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
