//! JSON summary of a finished game.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::game::GameOutcome;

/// Serialize `outcome` to pretty-printed JSON with trailing newline.
pub fn write_summary(path: &Path, outcome: &GameOutcome) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create summary dir {}", parent.display()))?;
    }
    let mut payload = serde_json::to_string_pretty(outcome).context("serialize summary")?;
    payload.push('\n');
    fs::write(path, payload).with_context(|| format!("write {}", path.display()))
}

pub fn read_summary(path: &Path) -> Result<GameOutcome> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_lists_scores_and_winners() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("out").join("summary.json");
        let outcome = GameOutcome {
            scores: vec![2, 0, 2],
            winners: vec![0, 2],
            rounds: 3,
            matches: 4,
        };
        write_summary(&path, &outcome).expect("write");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.ends_with('\n'));
        assert!(raw.contains("\"winners\""));
        assert_eq!(read_summary(&path).expect("read"), outcome);
    }
}
