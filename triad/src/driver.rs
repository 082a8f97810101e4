//! Autonomous selection source for computer players.
//!
//! The driver never touches tokens. It only offers random occupied slots to
//! its agent's seat, which drops them whenever the agent is not accepting input.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use rand::Rng;
use rand::rngs::StdRng;
use tracing::info;

use crate::core::types::{AgentId, Slot};
use crate::shared::Shared;

pub struct Driver {
    agent: AgentId,
    shared: Arc<Shared>,
    rng: StdRng,
}

impl Driver {
    pub fn new(agent: AgentId, shared: Arc<Shared>) -> Self {
        // Stream 0 belongs to the arbiter.
        let rng = shared.rng(agent as u64 + 1);
        Self { agent, shared, rng }
    }

    pub fn spawn(self) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("computer-{}", self.agent))
            .spawn(move || self.run())
            .context("spawn computer thread")
    }

    fn run(mut self) {
        info!(player = self.agent, "computer starting");
        let delay = self.shared.config.computer_delay();
        while !self.shared.shutdown.sleep(delay) {
            self.burst();
        }
        info!(player = self.agent, "computer terminated");
    }

    /// Offer random occupied slots until the seat stops accepting or the attempt budget runs out.
    ///
    /// Returns how many selections were accepted.
    pub fn burst(&mut self) -> usize {
        let Some(seat) = self.shared.seats.get(self.agent) else {
            return 0;
        };
        let size = self.shared.config.table_size;
        let mut accepted = 0;
        for _ in 0..size * 2 {
            if !seat.has_room() || self.shared.is_terminated() {
                break;
            }
            let slot: Slot = self.rng.gen_range(0..size);
            if !self.occupied(slot) {
                continue;
            }
            if !seat.offer_selection(slot) {
                break;
            }
            accepted += 1;
        }
        accepted
    }

    fn occupied(&self, slot: Slot) -> bool {
        let board = self.shared.board();
        board.open && board.table.item_at(slot).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Phase;
    use crate::seat::INBOX_CAPACITY;
    use crate::test_support::{open_board, shared_game};

    #[test]
    fn burst_fills_inbox_with_occupied_slots() {
        let shared = shared_game(0, 1);
        open_board(&shared, &[(4, 0), (5, 1), (6, 2)]);
        let mut driver = Driver::new(0, Arc::clone(&shared));

        // With three occupied slots out of twelve the attempt budget can run dry.
        let mut accepted = 0;
        for _ in 0..50 {
            accepted += driver.burst();
            if accepted == INBOX_CAPACITY {
                break;
            }
        }
        assert_eq!(accepted, INBOX_CAPACITY);
        while let Some(slot) = shared.seats[0].next_selection(std::time::Duration::ZERO) {
            assert!((4..=6).contains(&slot));
        }
    }

    #[test]
    fn burst_offers_nothing_while_agent_awaits() {
        let shared = shared_game(0, 1);
        open_board(&shared, &[(0, 0), (1, 1), (2, 2)]);
        shared.seats[0].begin_awaiting();
        let mut driver = Driver::new(0, Arc::clone(&shared));
        assert_eq!(driver.burst(), 0);
        assert_eq!(shared.seats[0].phase(), Phase::Awaiting);
    }

    #[test]
    fn burst_offers_nothing_on_closed_board() {
        let shared = shared_game(0, 1);
        open_board(&shared, &[(0, 0)]);
        shared.board().open = false;
        let mut driver = Driver::new(0, Arc::clone(&shared));
        assert_eq!(driver.burst(), 0);
    }
}
