//! CLI tests for `triad init-config` and `triad play`.
//!
//! Spawns the triad binary and checks exit codes and the files it writes.

use std::fs;
use std::process::Command;

use triad::exit_codes;
use triad::io::config::{GameConfig, load_config, write_config};
use triad::io::summary::read_summary;

#[test]
fn init_config_writes_defaults_and_refuses_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("game.toml");

    let status = Command::new(env!("CARGO_BIN_EXE_triad"))
        .arg("init-config")
        .arg(&path)
        .status()
        .expect("triad init-config");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), GameConfig::default());

    let status = Command::new(env!("CARGO_BIN_EXE_triad"))
        .arg("init-config")
        .arg(&path)
        .status()
        .expect("triad init-config");
    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn play_rejects_invalid_config() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("bad.toml");
    fs::write(&path, "table_size = 1\n").expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_triad"))
        .args(["play", "--config"])
        .arg(&path)
        .output()
        .expect("triad play");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("table_size"));
}

#[test]
fn play_writes_summary_for_a_finished_game() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_path = temp.path().join("game.toml");
    let summary_path = temp.path().join("summary.json");
    let mut config = GameConfig {
        deck_size: Some(2),
        seed: Some(3),
        ..GameConfig::default()
    };
    config.players.computer = 2;
    write_config(&config_path, &config).expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_triad"))
        .args(["play", "--config"])
        .arg(&config_path)
        .arg("--summary")
        .arg(&summary_path)
        .output()
        .expect("triad play");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("winners: "));

    let summary = read_summary(&summary_path).expect("summary");
    assert_eq!(summary.scores, vec![0, 0]);
    assert_eq!(summary.winners, vec![0, 1]);
}
