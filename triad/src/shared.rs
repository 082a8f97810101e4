//! State shared by the arbiter, agent and driver threads.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::core::rules::Rules;
use crate::core::table::Table;
use crate::io::config::GameConfig;
use crate::io::display::Display;
use crate::queue::CandidateQueue;
use crate::seat::Seat;
use crate::sync::{Shutdown, lock};

/// Everything guarded by the single board lock.
///
/// `open` is true only while a round is running; agents may place tokens and
/// submit candidates only while it is set.
#[derive(Debug)]
pub struct Board {
    pub table: Table,
    pub open: bool,
}

pub struct Shared {
    pub config: GameConfig,
    pub board: Mutex<Board>,
    pub queue: CandidateQueue,
    pub seats: Vec<Seat>,
    pub shutdown: Shutdown,
    pub rules: Arc<dyn Rules>,
    pub display: Arc<dyn Display>,
}

impl Shared {
    pub fn new(config: GameConfig, rules: Arc<dyn Rules>, display: Arc<dyn Display>) -> Result<Self> {
        config.validate()?;
        let seats = (0..config.player_count()).map(Seat::new).collect();
        Ok(Self {
            board: Mutex::new(Board {
                table: Table::new(config.table_size),
                open: false,
            }),
            queue: CandidateQueue::new(),
            seats,
            shutdown: Shutdown::new(),
            rules,
            display,
            config,
        })
    }

    pub fn seat(&self, agent: usize) -> Result<&Seat> {
        self.seats
            .get(agent)
            .ok_or_else(|| anyhow!("unknown player {agent}"))
    }

    /// Stop the game and wake every thread that may be blocked on it.
    pub fn terminate(&self) {
        if self.shutdown.trigger() {
            info!("termination requested");
        }
        self.queue.interrupt();
        for seat in &self.seats {
            seat.interrupt();
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.shutdown.is_triggered()
    }

    pub fn board(&self) -> MutexGuard<'_, Board> {
        lock(&self.board)
    }

    /// RNG for one thread. Seeded streams are derived from the configured seed.
    pub fn rng(&self, stream: u64) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_entropy(),
        }
    }
}
