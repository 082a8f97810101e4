//! Game configuration stored as TOML (default `triad.toml`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Game configuration (TOML).
///
/// Missing fields default to the classic 12-slot, 81-item game with two
/// computer players.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    /// Number of board slots.
    pub table_size: usize,

    /// Attributes per item.
    pub features: u32,

    /// Distinct values per attribute.
    pub feature_values: u32,

    /// Use only the first `deck_size` items. Defaults to every encodable item.
    pub deck_size: Option<usize>,

    /// Log one available match on the board after every fill (debug level).
    pub hints: bool,

    /// Seed for the arbiter's and drivers' RNGs. Random when unset.
    pub seed: Option<u64>,

    pub players: PlayersConfig,

    pub timing: TimingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlayersConfig {
    /// Players driven by external selection events (ids `0..human`).
    pub human: usize,
    /// Players driven by an autonomous random driver (ids after the humans).
    pub computer: usize,
    /// Display names by player id. Missing entries fall back to `player-<id>`.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimingConfig {
    /// Round length before the board is cleared and reshuffled.
    pub turn_timeout_millis: u64,
    /// Remaining time below which the countdown is reported as urgent.
    pub turn_timeout_warning_millis: u64,
    pub point_freeze_millis: u64,
    pub penalty_freeze_millis: u64,
    /// Arbiter wake-up interval while a round is running.
    pub tick_millis: u64,
    /// Pause between bursts of computer selections.
    pub computer_delay_millis: u64,
    /// Pause before the game ends because no match is left.
    pub end_game_pause_millis: u64,
}

impl Default for PlayersConfig {
    fn default() -> Self {
        Self {
            human: 0,
            computer: 2,
            names: Vec::new(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            turn_timeout_millis: 60_000,
            turn_timeout_warning_millis: 5_000,
            point_freeze_millis: 1_000,
            penalty_freeze_millis: 3_000,
            tick_millis: 10,
            computer_delay_millis: 100,
            end_game_pause_millis: 50,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_size: 12,
            features: 4,
            feature_values: 3,
            deck_size: None,
            hints: false,
            seed: None,
            players: PlayersConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        if self.table_size < 3 {
            return Err(anyhow!("table_size must be >= 3"));
        }
        if self.features == 0 {
            return Err(anyhow!("features must be > 0"));
        }
        if self.feature_values < 3 {
            return Err(anyhow!("feature_values must be >= 3"));
        }
        let capacity = self.deck_capacity()?;
        if let Some(deck_size) = self.deck_size
            && deck_size > capacity
        {
            return Err(anyhow!(
                "deck_size {deck_size} exceeds the {capacity} items encodable with {} features of {} values",
                self.features,
                self.feature_values
            ));
        }
        if self.player_count() == 0 {
            return Err(anyhow!("at least one player is required"));
        }
        if self.timing.turn_timeout_millis == 0 {
            return Err(anyhow!("timing.turn_timeout_millis must be > 0"));
        }
        if self.timing.tick_millis == 0 {
            return Err(anyhow!("timing.tick_millis must be > 0"));
        }
        Ok(())
    }

    pub fn player_count(&self) -> usize {
        self.players.human + self.players.computer
    }

    pub fn is_human(&self, agent: usize) -> bool {
        agent < self.players.human
    }

    pub fn player_name(&self, agent: usize) -> String {
        self.players
            .names
            .get(agent)
            .cloned()
            .unwrap_or_else(|| format!("player-{agent}"))
    }

    /// Number of items the deck actually holds.
    pub fn deck_len(&self) -> Result<usize> {
        let capacity = self.deck_capacity()?;
        Ok(self.deck_size.unwrap_or(capacity).min(capacity))
    }

    fn deck_capacity(&self) -> Result<usize> {
        (self.feature_values as usize)
            .checked_pow(self.features)
            .filter(|capacity| *capacity <= u32::MAX as usize)
            .ok_or_else(|| anyhow!("features/feature_values describe too many items"))
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_millis(self.timing.turn_timeout_millis)
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.timing.turn_timeout_warning_millis)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.timing.point_freeze_millis)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.timing.penalty_freeze_millis)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.timing.tick_millis)
    }

    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.timing.computer_delay_millis)
    }

    pub fn end_game_pause(&self) -> Duration {
        Duration::from_millis(self.timing.end_game_pause_millis)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GameConfig::default()`.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    if !path.exists() {
        let cfg = GameConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GameConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &GameConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.deck_len().expect("deck"), 81);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("triad.toml");
        let cfg = GameConfig {
            deck_size: Some(27),
            seed: Some(7),
            ..GameConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("triad.toml");
        fs::write(&path, "hints = true\n[timing]\ntick_millis = 5\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(cfg.hints);
        assert_eq!(cfg.timing.tick_millis, 5);
        assert_eq!(cfg.timing.turn_timeout_millis, 60_000);
        assert_eq!(cfg.players.computer, 2);
    }

    #[test]
    fn validate_rejects_oversized_deck_and_empty_game() {
        let oversized = GameConfig {
            deck_size: Some(82),
            ..GameConfig::default()
        };
        let err = oversized.validate().unwrap_err();
        assert!(err.to_string().contains("deck_size 82"));

        let nobody = GameConfig {
            players: PlayersConfig {
                human: 0,
                computer: 0,
                names: Vec::new(),
            },
            ..GameConfig::default()
        };
        assert!(nobody.validate().is_err());
    }

    #[test]
    fn player_names_fall_back_to_ids() {
        let cfg = GameConfig {
            players: PlayersConfig {
                human: 1,
                computer: 1,
                names: vec!["ada".to_string()],
            },
            ..GameConfig::default()
        };
        assert_eq!(cfg.player_name(0), "ada");
        assert_eq!(cfg.player_name(1), "player-1");
        assert!(cfg.is_human(0));
        assert!(!cfg.is_human(1));
    }
}
