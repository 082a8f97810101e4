//! Board invariants checked by tests and debug assertions.

use std::collections::BTreeMap;

use crate::core::table::{MAX_TOKENS, Table};

/// Check structural invariants of a table:
/// - Every occupied slot's item maps back to that slot (and vice versa)
/// - No agent holds more than [`MAX_TOKENS`] tokens
/// - Tokens only sit on occupied slots
pub fn check_table(table: &Table) -> Vec<String> {
    let mut errors = Vec::new();

    for (slot, cell) in table.cells().iter().enumerate() {
        if let Some(item) = cell
            && table.positions().get(item) != Some(&slot)
        {
            errors.push(format!("slot {slot}: {item} does not map back to it"));
        }
    }
    for (item, slot) in table.positions() {
        if table.cells().get(*slot).copied().flatten() != Some(*item) {
            errors.push(format!("{item}: recorded at slot {slot} but not there"));
        }
    }

    let mut counts = BTreeMap::new();
    for (slot, holders) in table.token_sets().iter().enumerate() {
        if !holders.is_empty() && table.item_at(slot).is_none() {
            errors.push(format!("slot {slot}: tokens on an empty slot"));
        }
        for agent in holders {
            *counts.entry(*agent).or_insert(0usize) += 1;
        }
    }
    for (agent, count) in counts {
        if count > MAX_TOKENS {
            errors.push(format!(
                "agent {agent}: holds {count} tokens (max {MAX_TOKENS})"
            ));
        }
    }

    errors
}
