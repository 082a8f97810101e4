//! Match validity rules.
//!
//! The arbiter only depends on the [`Rules`] trait. [`FeatureRules`] is the
//! stock implementation: each item encodes `features` attributes as base
//! `values` digits, and three items match when every attribute is either the
//! same on all three or different on all three.

use crate::core::types::Item;

/// Pure match predicate consulted by the arbiter.
pub trait Rules: Send + Sync {
    fn is_match(&self, a: Item, b: Item, c: Item) -> bool;

    /// Up to `limit` matching triples among `items`, in index order.
    fn find_matches(&self, items: &[Item], limit: usize) -> Vec<[Item; 3]> {
        let mut found = Vec::new();
        if limit == 0 {
            return found;
        }
        for i in 0..items.len() {
            for j in i + 1..items.len() {
                for k in j + 1..items.len() {
                    if self.is_match(items[i], items[j], items[k]) {
                        found.push([items[i], items[j], items[k]]);
                        if found.len() == limit {
                            return found;
                        }
                    }
                }
            }
        }
        found
    }

    fn has_any_match(&self, items: &[Item]) -> bool {
        !self.find_matches(items, 1).is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureRules {
    features: u32,
    values: u32,
}

impl FeatureRules {
    /// Rules for items encoding `features` attributes of `values` values each.
    ///
    /// Fails unless there is at least one feature with three or more values;
    /// fewer values leave no all-different triple.
    pub fn new(features: u32, values: u32) -> Result<Self, String> {
        if features == 0 {
            return Err("features must be > 0".to_string());
        }
        if values < 3 {
            return Err(format!("feature values must be >= 3, got {values}"));
        }
        Ok(Self { features, values })
    }
}

impl Default for FeatureRules {
    fn default() -> Self {
        Self {
            features: 4,
            values: 3,
        }
    }
}

impl Rules for FeatureRules {
    fn is_match(&self, a: Item, b: Item, c: Item) -> bool {
        if a == b || b == c || a == c {
            return false;
        }
        let (mut a, mut b, mut c) = (a.0, b.0, c.0);
        for _ in 0..self.features {
            let (x, y, z) = (a % self.values, b % self.values, c % self.values);
            let all_same = x == y && y == z;
            let all_different = x != y && y != z && x != z;
            if !(all_same || all_different) {
                return false;
            }
            a /= self.values;
            b /= self.values;
            c /= self.values;
        }
        true
    }
}
