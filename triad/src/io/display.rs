//! Display surface for scores, freezes, the round countdown and winners.
//!
//! The [`Display`] trait decouples the game threads from whatever renders the
//! game. Calls are fire-and-forget and may arrive from any thread. Tests use
//! `test_support::RecordingDisplay` to assert on what was reported.

use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};

use crate::core::types::AgentId;
use crate::sync::lock;

pub trait Display: Send + Sync {
    fn set_score(&self, agent: AgentId, score: u32);

    /// Remaining freeze for `agent`; `Duration::ZERO` clears it.
    fn set_freeze(&self, agent: AgentId, remaining: Duration);

    /// Remaining round time. `urgent` once below the warning threshold.
    fn set_countdown(&self, remaining: Duration, urgent: bool);

    fn clear_token_display(&self);

    fn announce_winners(&self, winners: &[AgentId]);
}

/// Display that reports every event through `tracing`.
///
/// Countdown refreshes happen every arbiter tick, so they are only emitted at
/// debug level and only when the whole-second value changes.
#[derive(Debug, Default)]
pub struct TracingDisplay {
    names: Vec<String>,
    last_second: Mutex<Option<u64>>,
}

impl TracingDisplay {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            last_second: Mutex::new(None),
        }
    }

    fn name(&self, agent: AgentId) -> String {
        self.names
            .get(agent)
            .cloned()
            .unwrap_or_else(|| format!("player-{agent}"))
    }
}

impl Display for TracingDisplay {
    fn set_score(&self, agent: AgentId, score: u32) {
        info!(player = %self.name(agent), score, "score");
    }

    fn set_freeze(&self, agent: AgentId, remaining: Duration) {
        debug!(
            player = %self.name(agent),
            remaining_ms = remaining.as_millis() as u64,
            "freeze"
        );
    }

    fn set_countdown(&self, remaining: Duration, urgent: bool) {
        let second = remaining.as_secs();
        let mut last = lock(&self.last_second);
        if *last == Some(second) {
            return;
        }
        *last = Some(second);
        debug!(remaining_secs = second, urgent, "countdown");
    }

    fn clear_token_display(&self) {
        debug!("tokens cleared");
    }

    fn announce_winners(&self, winners: &[AgentId]) {
        let names: Vec<String> = winners.iter().map(|agent| self.name(*agent)).collect();
        info!(winners = %names.join(", "), "game over");
    }
}
