//! Board storage: slot↔item bijection plus per-slot token sets.
//!
//! The table knows nothing about rounds, agents' phases or threads. Callers
//! hold it behind the board lock and are responsible for serializing access.

use std::collections::{BTreeSet, HashMap};

use crate::core::types::{AgentId, Item, Slot};

/// Maximum number of tokens a single agent may hold.
pub const MAX_TOKENS: usize = 3;

#[derive(Debug, Clone)]
pub struct Table {
    slots: Vec<Option<Item>>,
    positions: HashMap<Item, Slot>,
    tokens: Vec<BTreeSet<AgentId>>,
}

impl Table {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
            positions: HashMap::new(),
            tokens: vec![BTreeSet::new(); size],
        }
    }

    pub fn item_at(&self, slot: Slot) -> Option<Item> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn slot_of(&self, item: Item) -> Option<Slot> {
        self.positions.get(&item).copied()
    }

    /// Put `item` on an empty `slot`.
    ///
    /// Fails if the slot is out of range or occupied, or the item is already on the table.
    pub fn place(&mut self, item: Item, slot: Slot) -> Result<(), String> {
        let Some(cell) = self.slots.get_mut(slot) else {
            return Err(format!("slot {slot} out of range"));
        };
        if let Some(existing) = cell {
            return Err(format!("slot {slot} already holds {existing}"));
        }
        if let Some(other) = self.positions.get(&item) {
            return Err(format!("{item} already placed at slot {other}"));
        }
        *cell = Some(item);
        self.positions.insert(item, slot);
        Ok(())
    }

    /// Take the item off `slot`, dropping every token that sat on it.
    ///
    /// Returns the removed item and the agents whose tokens were cleared.
    pub fn remove(&mut self, slot: Slot) -> Option<(Item, Vec<AgentId>)> {
        let item = self.slots.get_mut(slot)?.take()?;
        self.positions.remove(&item);
        let displaced = self.clear_slot_tokens(slot);
        Some((item, displaced))
    }

    /// Place a token for `agent` on `slot`.
    ///
    /// Returns false (and changes nothing) when the slot is empty, the token
    /// already exists or the agent is at [`MAX_TOKENS`].
    pub fn place_token(&mut self, agent: AgentId, slot: Slot) -> bool {
        if self.item_at(slot).is_none() || self.token_count(agent) >= MAX_TOKENS {
            return false;
        }
        self.tokens[slot].insert(agent)
    }

    /// Remove `agent`'s token from `slot`. Returns false if there was none.
    pub fn remove_token(&mut self, agent: AgentId, slot: Slot) -> bool {
        self.tokens
            .get_mut(slot)
            .is_some_and(|holders| holders.remove(&agent))
    }

    pub fn has_token(&self, agent: AgentId, slot: Slot) -> bool {
        self.tokens
            .get(slot)
            .is_some_and(|holders| holders.contains(&agent))
    }

    /// Slots holding a token of `agent`, ascending.
    pub fn tokens_of(&self, agent: AgentId) -> Vec<Slot> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, holders)| holders.contains(&agent))
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn token_count(&self, agent: AgentId) -> usize {
        self.tokens
            .iter()
            .filter(|holders| holders.contains(&agent))
            .count()
    }

    /// Drop every token on `slot`, returning the agents that held one.
    pub fn clear_slot_tokens(&mut self, slot: Slot) -> Vec<AgentId> {
        match self.tokens.get_mut(slot) {
            Some(holders) => std::mem::take(holders).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Drop every token on every slot.
    pub fn clear_all_tokens(&mut self) {
        for holders in &mut self.tokens {
            holders.clear();
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.positions.len()
    }

    /// Items currently face-up, in slot order.
    pub fn items(&self) -> Vec<Item> {
        self.slots.iter().flatten().copied().collect()
    }

    /// One `slot:item` entry per slot, `-` for empty slots.
    pub fn layout(&self) -> String {
        self.slots
            .iter()
            .enumerate()
            .map(|(slot, cell)| match cell {
                Some(item) => format!("{slot}:{item}"),
                None => format!("{slot}:-"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn cells(&self) -> &[Option<Item>] {
        &self.slots
    }

    pub(crate) fn positions(&self) -> &HashMap<Item, Slot> {
        &self.positions
    }

    pub(crate) fn token_sets(&self) -> &[BTreeSet<AgentId>] {
        &self.tokens
    }
}
