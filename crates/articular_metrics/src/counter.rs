//! Named counters for dispatch events

use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct Counter {
    counters: BTreeMap<String, u64>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, name: &str, value: u64) {
        match self.counters.get_mut(name) {
            Some(count) => *count += value,
            None => {
                self.counters.insert(name.to_string(), value);
            }
        }
    }

    pub fn set(&mut self, name: &str, value: u64) {
        self.counters.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Every counter, ordered by name.
    pub fn summary(&self) -> Vec<(String, u64)> {
        self.counters
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect()
    }

    pub fn reset_all(&mut self) {
        self.counters.clear();
    }
}
