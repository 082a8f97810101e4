//! Real-time triple-matching game.
//!
//! `triad play` runs a game with the configured human and computer players.
//! Human selections are read from stdin as `<player> <slot>` lines.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use triad::agent::GameHandle;
use triad::exit_codes;
use triad::game::Game;
use triad::io::config::{GameConfig, load_config, write_config};
use triad::io::input::route_selections;
use triad::io::summary::write_summary;
use triad::logging;

const DEFAULT_CONFIG: &str = "triad.toml";

#[derive(Parser)]
#[command(
    name = "triad",
    version,
    about = "Real-time multi-player triple-matching game"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one game until no match is left or input asks to quit.
    Play {
        /// Game config (TOML). Defaults are used if the file is missing.
        #[arg(short, long, default_value = DEFAULT_CONFIG)]
        config: PathBuf,
        /// Write a JSON summary of the finished game here.
        #[arg(long)]
        summary: Option<PathBuf>,
    },
    /// Write a config file with every default spelled out.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play { config, summary } => cmd_play(&config, summary.as_deref()),
        Command::InitConfig { force, path } => cmd_init_config(&path, force),
    }
}

fn cmd_play(config_path: &Path, summary: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let humans = config.players.human;
    let computers = config.players.computer;
    let names: Vec<String> = (0..config.player_count())
        .map(|agent| config.player_name(agent))
        .collect();

    let mut game = Game::from_config(config)?;
    game.start()?;
    if humans > 0 {
        // Detached: a blocking stdin read must not keep the game from ending.
        spawn_input(game.handle(), humans, computers == 0)?;
    }
    let outcome = game.join()?;

    let winners: Vec<&str> = outcome
        .winners
        .iter()
        .filter_map(|agent| names.get(*agent).map(String::as_str))
        .collect();
    println!("winners: {}", winners.join(", "));
    for (agent, score) in outcome.scores.iter().enumerate() {
        println!("  {}: {}", names.get(agent).map_or("?", String::as_str), score);
    }

    if let Some(path) = summary {
        write_summary(path, &outcome)?;
    }
    Ok(())
}

fn spawn_input(handle: GameHandle, humans: usize, end_on_eof: bool) -> Result<()> {
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || {
            match route_selections(io::stdin().lock(), &handle, humans) {
                Ok(accepted) => info!(accepted, "input closed"),
                Err(err) => warn!(err = %format!("{err:#}"), "input failed"),
            }
            if end_on_eof {
                handle.terminate();
            }
        })
        .context("spawn input thread")?;
    Ok(())
}

fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &GameConfig::default())
}
