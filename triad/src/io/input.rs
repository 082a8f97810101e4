//! Line-oriented selection input for human players.
//!
//! Each line is `<player> <slot>`; `quit` (or `q`) ends the game. Blank lines
//! and lines starting with `#` are ignored.

use std::io::BufRead;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, warn};

use crate::agent::GameHandle;
use crate::core::types::{AgentId, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputLine {
    Select { agent: AgentId, slot: Slot },
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> Result<InputLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(InputLine::Blank);
    }
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
        return Ok(InputLine::Quit);
    }
    let mut parts = line.split_whitespace();
    let (Some(agent), Some(slot), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(anyhow!("expected `<player> <slot>`, got {line:?}"));
    };
    let agent = agent
        .parse()
        .with_context(|| format!("parse player id {agent:?}"))?;
    let slot = slot
        .parse()
        .with_context(|| format!("parse slot {slot:?}"))?;
    Ok(InputLine::Select { agent, slot })
}

/// Forward selections from `reader` to human players until EOF, `quit` or game end.
///
/// Malformed lines and selections for non-human players are logged and skipped.
/// Returns the number of selections the game accepted.
pub fn route_selections<R: BufRead>(reader: R, handle: &GameHandle, humans: usize) -> Result<usize> {
    let mut accepted = 0;
    for line in reader.lines() {
        if handle.is_terminated() {
            break;
        }
        let line = line.context("read selection input")?;
        match parse_line(&line) {
            Ok(InputLine::Blank) => {}
            Ok(InputLine::Quit) => {
                handle.terminate();
                break;
            }
            Ok(InputLine::Select { agent, slot }) if agent < humans => {
                if handle.select(agent, slot) {
                    accepted += 1;
                } else {
                    debug!(player = agent, slot, "selection ignored");
                }
            }
            Ok(InputLine::Select { agent, .. }) => {
                warn!(player = agent, "player is not human; selection ignored");
            }
            Err(err) => warn!(err = %format!("{err:#}"), "bad input line"),
        }
    }
    Ok(accepted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{open_board, shared_game};
    use std::io::Cursor;
    use std::sync::Arc;

    #[test]
    fn parse_accepts_selection_quit_and_blank() {
        assert_eq!(
            parse_line(" 1  7 ").expect("parse"),
            InputLine::Select { agent: 1, slot: 7 }
        );
        assert_eq!(parse_line("QUIT").expect("parse"), InputLine::Quit);
        assert_eq!(parse_line("# comment").expect("parse"), InputLine::Blank);
        assert_eq!(parse_line("").expect("parse"), InputLine::Blank);
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(parse_line("1").is_err());
        assert!(parse_line("1 2 3").is_err());
        assert!(parse_line("a 2").is_err());
        assert!(parse_line("1 -2").is_err());
    }

    #[test]
    fn route_forwards_human_selections_and_quits() {
        let shared = shared_game(1, 1);
        open_board(&shared, &[(0, 0), (1, 1)]);
        let handle = GameHandle::new(Arc::clone(&shared));
        let input = Cursor::new("0 0\nbogus\n1 1\n0 5\n0 1\nquit\n0 0\n");

        let accepted = route_selections(input, &handle, 1).expect("route");

        assert_eq!(accepted, 2);
        assert_eq!(shared.seats[0].pending_selections(), 2);
        assert_eq!(shared.seats[1].pending_selections(), 0);
        assert!(shared.is_terminated());
    }
}
