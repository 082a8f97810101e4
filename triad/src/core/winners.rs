//! Winner selection at the end of a game.

use crate::core::types::AgentId;

/// Agents tied at the maximum score, ascending by id.
///
/// With no agents there are no winners; when nobody scored, everybody ties.
pub fn winners(scores: &[u32]) -> Vec<AgentId> {
    let Some(best) = scores.iter().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .enumerate()
        .filter(|(_, score)| *score == best)
        .map(|(agent, _)| agent)
        .collect()
}
