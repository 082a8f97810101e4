//! Test-only helpers for building small games and observing what they display.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::rules::FeatureRules;
use crate::core::types::{AgentId, Item, Slot};
use crate::io::config::{GameConfig, PlayersConfig, TimingConfig};
use crate::io::display::Display;
use crate::shared::Shared;
use crate::sync::lock;

/// Config with `human` + `computer` players, a fixed seed and near-zero delays.
pub fn quick_config(human: usize, computer: usize) -> GameConfig {
    GameConfig {
        seed: Some(7),
        players: PlayersConfig {
            human,
            computer,
            names: Vec::new(),
        },
        timing: TimingConfig {
            turn_timeout_millis: 10_000,
            turn_timeout_warning_millis: 5,
            point_freeze_millis: 0,
            penalty_freeze_millis: 0,
            tick_millis: 2,
            computer_delay_millis: 1,
            end_game_pause_millis: 1,
        },
        ..GameConfig::default()
    }
}

pub fn shared_game(human: usize, computer: usize) -> Arc<Shared> {
    recording_game(human, computer).0
}

pub fn recording_game(human: usize, computer: usize) -> (Arc<Shared>, Arc<RecordingDisplay>) {
    recording_game_with(quick_config(human, computer))
}

pub fn recording_game_with(config: GameConfig) -> (Arc<Shared>, Arc<RecordingDisplay>) {
    let display = Arc::new(RecordingDisplay::default());
    let rules = FeatureRules::new(config.features, config.feature_values).expect("valid test rules");
    let shared = Shared::new(config, Arc::new(rules), Arc::clone(&display) as Arc<dyn Display>)
        .expect("valid test config");
    (Arc::new(shared), display)
}

/// Place `(slot, item id)` pairs on the board and open it.
pub fn open_board(shared: &Shared, placements: &[(Slot, u32)]) {
    let mut board = shared.board();
    for &(slot, id) in placements {
        board.table.place(Item(id), slot).expect("place test item");
    }
    board.open = true;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Score { agent: AgentId, score: u32 },
    Freeze { agent: AgentId, remaining: Duration },
    Countdown { remaining: Duration, urgent: bool },
    ClearTokens,
    Winners(Vec<AgentId>),
}

/// Display that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    events: Mutex<Vec<DisplayEvent>>,
}

impl RecordingDisplay {
    pub fn events(&self) -> Vec<DisplayEvent> {
        lock(&self.events).clone()
    }

    fn record(&self, event: DisplayEvent) {
        lock(&self.events).push(event);
    }
}

impl Display for RecordingDisplay {
    fn set_score(&self, agent: AgentId, score: u32) {
        self.record(DisplayEvent::Score { agent, score });
    }

    fn set_freeze(&self, agent: AgentId, remaining: Duration) {
        self.record(DisplayEvent::Freeze { agent, remaining });
    }

    fn set_countdown(&self, remaining: Duration, urgent: bool) {
        self.record(DisplayEvent::Countdown { remaining, urgent });
    }

    fn clear_token_display(&self) {
        self.record(DisplayEvent::ClearTokens);
    }

    fn announce_winners(&self, winners: &[AgentId]) {
        self.record(DisplayEvent::Winners(winners.to_vec()));
    }
}
