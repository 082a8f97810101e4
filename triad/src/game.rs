//! Game lifecycle: build shared state, start the arbiter, terminate, join.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::agent::GameHandle;
use crate::arbiter::Arbiter;
use crate::core::rules::{FeatureRules, Rules};
use crate::core::types::AgentId;
use crate::io::config::GameConfig;
use crate::io::display::{Display, TracingDisplay};
use crate::shared::Shared;

/// Summary of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// Final score per player id.
    pub scores: Vec<u32>,
    /// Players tied at the top score.
    pub winners: Vec<AgentId>,
    /// Rounds started.
    pub rounds: u32,
    /// Valid matches judged.
    pub matches: u32,
}

pub struct Game {
    shared: Arc<Shared>,
    arbiter: Option<JoinHandle<Result<GameOutcome>>>,
}

impl Game {
    pub fn new(config: GameConfig, rules: Arc<dyn Rules>, display: Arc<dyn Display>) -> Result<Self> {
        let shared = Shared::new(config, rules, display).context("invalid game config")?;
        Ok(Self {
            shared: Arc::new(shared),
            arbiter: None,
        })
    }

    /// Game using [`FeatureRules`] for the configured encoding and a [`TracingDisplay`].
    pub fn from_config(config: GameConfig) -> Result<Self> {
        let rules = FeatureRules::new(config.features, config.feature_values)
            .map_err(|err| anyhow!(err))
            .context("invalid game config")?;
        let names = (0..config.player_count())
            .map(|agent| config.player_name(agent))
            .collect();
        Self::new(config, Arc::new(rules), Arc::new(TracingDisplay::new(names)))
    }

    /// Spin up the arbiter, which in turn starts every player (and driver).
    pub fn start(&mut self) -> Result<()> {
        if self.arbiter.is_some() {
            bail!("game already started");
        }
        let arbiter = Arbiter::new(Arc::clone(&self.shared))?;
        let handle = thread::Builder::new()
            .name("arbiter".to_string())
            .spawn(move || arbiter.run())
            .context("spawn arbiter thread")?;
        self.arbiter = Some(handle);
        Ok(())
    }

    /// Handle for routing external selection events and requesting termination.
    pub fn handle(&self) -> GameHandle {
        GameHandle::new(Arc::clone(&self.shared))
    }

    /// Request termination. Safe to call any number of times.
    pub fn terminate(&self) {
        self.shared.terminate();
    }

    /// Wait for the arbiter (which joins every player first) and return the outcome.
    pub fn join(mut self) -> Result<GameOutcome> {
        let handle = self
            .arbiter
            .take()
            .ok_or_else(|| anyhow!("game was never started"))?;
        handle
            .join()
            .map_err(|_| anyhow!("arbiter thread panicked"))?
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        if let Some(handle) = self.arbiter.take() {
            self.shared.terminate();
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::quick_config;

    #[test]
    fn join_before_start_errors() {
        let game = Game::from_config(quick_config(0, 1)).expect("game");
        let err = game.join().unwrap_err();
        assert!(err.to_string().contains("never started"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = quick_config(0, 1);
        config.table_size = 2;
        let err = Game::from_config(config).err().expect("error");
        assert!(format!("{err:#}").contains("table_size"));
    }

    #[test]
    fn zero_feature_values_are_rejected() {
        let mut config = quick_config(0, 1);
        config.feature_values = 0;
        let err = Game::from_config(config).err().expect("error");
        assert!(format!("{err:#}").contains("feature values"));
    }

    #[test]
    fn start_twice_errors() {
        let mut game = Game::from_config(quick_config(0, 1)).expect("game");
        game.start().expect("start");
        assert!(game.start().is_err());
        game.terminate();
        game.join().expect("join");
    }
}
