//! Storage for coqtop output, keyed by the full invocation.

use std::collections::HashMap;

use super::{CoqOutput, CoqtopCommand};

/// A key-value store for captured coqtop output.
pub trait OutputStore {
    /// Look up the output of an earlier identical run.
    fn get(&self, key: &CoqtopCommand) -> Option<CoqOutput>;

    /// Remember the output of a run.
    fn insert(&mut self, key: CoqtopCommand, output: CoqOutput);

    /// Forget one entry. Returns true if it was present.
    fn invalidate(&mut self, key: &CoqtopCommand) -> bool;

    /// Forget everything.
    fn clear(&mut self);
}

/// In-memory store; lives as long as the collector that owns it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<CoqtopCommand, CoqOutput>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OutputStore for MemoryStore {
    fn get(&self, key: &CoqtopCommand) -> Option<CoqOutput> {
        self.entries.get(key).cloned()
    }

    fn insert(&mut self, key: CoqtopCommand, output: CoqOutput) {
        self.entries.insert(key, output);
    }

    fn invalidate(&mut self, key: &CoqtopCommand) -> bool {
        self.entries.remove(key).is_some()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A store that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl OutputStore for NoStore {
    fn get(&self, _key: &CoqtopCommand) -> Option<CoqOutput> {
        None
    }

    fn insert(&mut self, _key: CoqtopCommand, _output: CoqOutput) {}

    fn invalidate(&mut self, _key: &CoqtopCommand) -> bool {
        false
    }

    fn clear(&mut self) {}
}
