//! Shared deterministic types for the game core.
//!
//! These types define stable contracts between the board, the agents and the
//! arbiter. They carry no synchronization and no I/O.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed board position in `[0, table_size)`.
pub type Slot = usize;

/// Zero-based player index.
pub type AgentId = usize;

/// Unique element of the deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(pub u32);

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A triple of items proposed as a match, tagged with the submitting agent.
///
/// Snapshotted when the third token is placed and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub agent: AgentId,
    pub items: [Item; 3],
}

impl Candidate {
    pub fn new(agent: AgentId, items: [Item; 3]) -> Self {
        Self { agent, items }
    }

    /// True if this candidate references any of `items`.
    pub fn references_any(&self, items: &[Item]) -> bool {
        self.items.iter().any(|item| items.contains(item))
    }
}

/// Outcome delivered by the arbiter for a processed candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Point,
    Penalty,
}

/// Agent state machine phase.
///
/// `Awaiting` is entered by the agent itself right before it submits a
/// candidate; every other transition out of it is driven by the arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Playing,
    Awaiting,
    Point,
    Penalty,
}

impl From<Verdict> for Phase {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Point => Phase::Point,
            Verdict::Penalty => Phase::Penalty,
        }
    }
}

/// How the arbiter disposed of one queued candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Judgement {
    /// Valid match: items retired, submitter awarded a point.
    Valid,
    /// Not a match: submitter penalized, board untouched.
    Invalid,
    /// At least one item had already left the board; no verdict delivered.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_references_any_item() {
        let candidate = Candidate::new(0, [Item(1), Item(2), Item(3)]);
        assert!(candidate.references_any(&[Item(9), Item(3)]));
        assert!(!candidate.references_any(&[Item(4), Item(5), Item(6)]));
    }

    #[test]
    fn verdict_maps_to_phase() {
        assert_eq!(Phase::from(Verdict::Point), Phase::Point);
        assert_eq!(Phase::from(Verdict::Penalty), Phase::Penalty);
    }
}
